mod capability;
mod channel;
mod channel_type;
mod coarse_channel;
mod entity;
mod error;
mod fine_channel;
mod fixture;
mod resolution;
mod switching_channel;
mod wheel;

pub use capability::*;
pub use channel::*;
pub use channel_type::*;
pub use coarse_channel::*;
pub use entity::*;
pub use error::*;
pub use fine_channel::*;
pub use fixture::*;
pub use resolution::*;
pub use switching_channel::*;
pub use wheel::*;
