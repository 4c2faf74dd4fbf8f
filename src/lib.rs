#![warn(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

// not re-exported as the raw records are somewhat niche.
// If the user needs them, they have to be qualified
pub mod low_level;

// these modules are re-exported as they form the main part of the API
mod high_level;
pub mod parse;

pub use high_level::*;
pub use parse::*;
