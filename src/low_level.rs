//! Fixture records as they appear in the JSON fixture format, before any
//! derived properties are computed.

mod channel;
mod fixture;

pub use channel::*;
pub use fixture::*;
