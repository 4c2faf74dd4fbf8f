use crate::{EntityError, Resolution};

/// Errors when deriving channel properties.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error(
        "resolution {resolution} must be an integer between 1 and the channel's \
        maximum resolution {max_resolution}"
    )]
    InvalidResolution {
        resolution: i64,
        max_resolution: Resolution,
    },
    #[error("could not parse capability field '{field}': {source}")]
    Entity { field: String, source: EntityError },
    #[error("could not resolve channel field '{field}': {source}")]
    DmxValue { field: String, source: EntityError },
    #[error("capability range starting at {found} should start at {expected}")]
    CapabilityRangeGap { expected: u64, found: u32 },
    #[error("capability ranges end at {end} instead of covering up to {bound}")]
    CapabilityRangeCoverage { end: u64, bound: u32 },
}
