mod error;
mod fixture;
mod problems;

pub use self::{error::*, fixture::*, problems::*};
