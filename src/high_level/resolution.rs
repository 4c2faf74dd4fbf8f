use std::{num::ParseIntError, str::FromStr};

use duplicate::duplicate_item;
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Number of bytes used to represent a DMX value, from 1 (8 bit) to 4 (32 bit).
///
/// A channel with `n` fine channel aliases has a maximum resolution of `n + 1`.
/// Values are treated as big-endian numbers, the coarse channel transmitting
/// the most significant byte.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
    derive_more::Display,
)]
#[display(fmt = "{}bit", "self.bits()")]
pub struct Resolution(u8);

impl Resolution {
    pub const BIT8: Self = Self(1);
    pub const BIT16: Self = Self(2);
    pub const BIT24: Self = Self(3);
    pub const BIT32: Self = Self(4);

    pub fn bytes(self) -> u8 {
        self.0
    }

    pub fn bits(self) -> u8 {
        self.0 * 8
    }

    /// Highest raw value representable with this resolution, i.e. `256^bytes - 1`.
    pub fn max_value(self) -> u32 {
        u32::MAX >> (32 - u32::from(self.bits()))
    }

    /// All resolutions from 8 bit up to and including `self`.
    pub fn up_to(self) -> impl Iterator<Item = Resolution> {
        (1..=self.0).map(Resolution)
    }

    /// Zero-based position of this resolution in per-resolution tables.
    pub(crate) fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

#[allow(clippy::unnecessary_cast)]
#[duplicate_item(integer; [u8]; [u16]; [u32]; [usize]; [i32]; [i64])]
impl TryFrom<integer> for Resolution {
    type Error = ResolutionError;

    fn try_from(value: integer) -> Result<Self, Self::Error> {
        if (1..=4).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ResolutionError::OutOfRange(value as i64))
        }
    }
}

impl FromStr for Resolution {
    type Err = ResolutionError;

    /// Parses "8bit", "16bit", "24bit" or "32bit".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits: u8 = s
            .strip_suffix("bit")
            .ok_or_else(|| ResolutionError::Invalid(s.to_owned()))?
            .parse()?;
        if bits % 8 != 0 {
            return Err(ResolutionError::Invalid(s.to_owned()));
        }
        (bits / 8).try_into()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("resolution {0} is outside of the supported 1 to 4 bytes")]
    OutOfRange(i64),
    #[error("invalid resolution '{0}', expected one of 8bit, 16bit, 24bit or 32bit")]
    Invalid(String),
    #[error("parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),
}

/// Scale a raw DMX value from one resolution to another.
///
/// Upscaling appends zero low-order bytes (`value * 256^(to - from)`),
/// downscaling truncates low-order bytes (`value / 256^(from - to)`). Only the
/// upscaling direction is reversible.
///
/// `value` must be representable in `from`.
pub fn scale_dmx_value(value: u32, from: Resolution, to: Resolution) -> u32 {
    if to >= from {
        value << (8 * u32::from(to.0 - from.0))
    } else {
        value >> (8 * u32::from(from.0 - to.0))
    }
}

/// Inclusive range of raw DMX values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display(fmt = "{}…{}", start, end)]
pub struct DmxRange {
    start: u32,
    end: u32,
}

impl DmxRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// The range `[0, resolution.max_value()]`.
    pub fn full(resolution: Resolution) -> Self {
        Self::new(0, resolution.max_value())
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.start..=self.end).contains(&value)
    }

    /// Scale the range to another resolution.
    ///
    /// The start is scaled like a single value. When upscaling, the end gets
    /// its appended low-order bytes filled with `0xFF`, so ranges that are
    /// contiguous in `from` stay contiguous in `to`.
    pub fn scaled(&self, from: Resolution, to: Resolution) -> Self {
        let start = scale_dmx_value(self.start, from, to);
        let mut end = scale_dmx_value(self.end, from, to);
        if to > from {
            end |= u32::MAX >> (32 - 8 * u32::from(to.0 - from.0));
        }
        Self { start, end }
    }
}

impl From<[u32; 2]> for DmxRange {
    fn from([start, end]: [u32; 2]) -> Self {
        Self::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_construction() {
        assert_eq!(Resolution::try_from(1u8).unwrap(), Resolution::BIT8);
        assert_eq!(Resolution::try_from(4usize).unwrap(), Resolution::BIT32);
        assert!(matches!(
            Resolution::try_from(0u8),
            Err(ResolutionError::OutOfRange(0))
        ));
        assert!(matches!(
            Resolution::try_from(-1i32),
            Err(ResolutionError::OutOfRange(-1))
        ));
        assert!(Resolution::try_from(5u32).is_err());
    }

    #[test]
    fn resolution_strings() {
        assert_eq!("8bit".parse::<Resolution>().unwrap(), Resolution::BIT8);
        assert_eq!("24bit".parse::<Resolution>().unwrap(), Resolution::BIT24);
        assert_eq!(Resolution::BIT16.to_string(), "16bit");
        assert!("12bit".parse::<Resolution>().is_err());
        assert!("40bit".parse::<Resolution>().is_err());
        assert!("16".parse::<Resolution>().is_err());
    }

    #[test]
    fn max_values() {
        assert_eq!(Resolution::BIT8.max_value(), 255);
        assert_eq!(Resolution::BIT16.max_value(), 65535);
        assert_eq!(Resolution::BIT24.max_value(), 16_777_215);
        assert_eq!(Resolution::BIT32.max_value(), u32::MAX);
    }

    #[test]
    fn upscaling_multiplies() {
        for value in [0, 1, 42, 128, 255] {
            for to in Resolution::BIT32.up_to() {
                let expected = value * 256u32.pow(u32::from(to.bytes() - 1));
                assert_eq!(scale_dmx_value(value, Resolution::BIT8, to), expected);
            }
        }
        assert_eq!(
            scale_dmx_value(42423, Resolution::BIT16, Resolution::BIT32),
            42423 * 65536
        );
    }

    #[test]
    fn downscaling_truncates() {
        assert_eq!(
            scale_dmx_value(3419130827, Resolution::BIT32, Resolution::BIT24),
            13355979
        );
        assert_eq!(
            scale_dmx_value(3419130827, Resolution::BIT32, Resolution::BIT16),
            52171
        );
        assert_eq!(
            scale_dmx_value(3419130827, Resolution::BIT32, Resolution::BIT8),
            203
        );
        assert_eq!(scale_dmx_value(65535, Resolution::BIT16, Resolution::BIT8), 255);
    }

    #[test]
    fn upscaling_is_inverted_by_downscaling() {
        for from in Resolution::BIT32.up_to() {
            for to in Resolution::BIT32.up_to().filter(|to| *to > from) {
                for value in [0, 1, 17, from.max_value() / 3, from.max_value()] {
                    let up = scale_dmx_value(value, from, to);
                    assert_eq!(scale_dmx_value(up, to, from), value);
                }
            }
        }
    }

    #[test]
    fn range_scaling_stays_contiguous() {
        let lower = DmxRange::new(0, 127);
        let upper = DmxRange::new(128, 255);
        let lower16 = lower.scaled(Resolution::BIT8, Resolution::BIT16);
        let upper16 = upper.scaled(Resolution::BIT8, Resolution::BIT16);
        assert_eq!(lower16, DmxRange::new(0, 32767));
        assert_eq!(upper16, DmxRange::new(32768, 65535));
        assert_eq!(
            upper16.scaled(Resolution::BIT16, Resolution::BIT8),
            upper
        );
        assert_eq!(
            DmxRange::full(Resolution::BIT8).scaled(Resolution::BIT8, Resolution::BIT32),
            DmxRange::full(Resolution::BIT32)
        );
    }
}
