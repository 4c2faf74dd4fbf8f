use std::{io, path::Path};

use thiserror::Error;

/// An unrecoverable error when loading a fixture.
#[derive(Error, Debug)]
pub enum FixtureParseError {
    #[error("invalid fixture JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("could not open file '{0}': {1}")]
    OpenError(Box<Path>, io::Error),
}
