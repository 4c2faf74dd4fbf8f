use getset::Getters;
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::low_level::WheelRecord;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub enum WheelSlotType {
    Open,
    Closed,
    Color,
    Gobo,
    Prism,
    Iris,
    Frost,
    AnimationGoboStart,
    AnimationGoboEnd,
}

/// What a wheel mostly carries, derived from its slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum WheelType {
    Open,
    Closed,
    Color,
    Gobo,
    Prism,
    Iris,
    Frost,
    AnimationGobo,
}

impl From<WheelSlotType> for WheelType {
    fn from(value: WheelSlotType) -> Self {
        match value {
            WheelSlotType::Open => WheelType::Open,
            WheelSlotType::Closed => WheelType::Closed,
            WheelSlotType::Color => WheelType::Color,
            WheelSlotType::Gobo => WheelType::Gobo,
            WheelSlotType::Prism => WheelType::Prism,
            WheelSlotType::Iris => WheelType::Iris,
            WheelSlotType::Frost => WheelType::Frost,
            WheelSlotType::AnimationGoboStart | WheelSlotType::AnimationGoboEnd => {
                WheelType::AnimationGobo
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Wheel {
    name: String,
    slots: Vec<WheelSlotType>,
}

impl Wheel {
    pub fn new<T: Into<String>>(name: T, slots: Vec<WheelSlotType>) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    pub(crate) fn from_record(name: &str, record: &WheelRecord) -> Self {
        Self::new(name, record.slots.iter().map(|s| s.t).collect())
    }

    /// The most frequent slot type, not counting Open and Closed slots. Ties
    /// go to the type that occurs first. Wheels with only Open or Closed slots
    /// take the type of their first slot, empty wheels have no type.
    pub fn wheel_type(&self) -> Option<WheelType> {
        let mut counts: Vec<(WheelType, usize)> = Vec::new();
        for t in self
            .slots
            .iter()
            .filter(|t| !matches!(t, WheelSlotType::Open | WheelSlotType::Closed))
            .map(|t| WheelType::from(*t))
        {
            match counts.iter_mut().find(|(counted, _)| *counted == t) {
                Some((_, count)) => *count += 1,
                None => counts.push((t, 1)),
            }
        }

        // max_by_key returns the last maximum, so walk in reverse to prefer the first
        counts
            .iter()
            .rev()
            .max_by_key(|(_, count)| *count)
            .map(|(t, _)| *t)
            .or_else(|| self.slots.first().map(|t| WheelType::from(*t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use WheelSlotType::*;

    #[test]
    fn wheel_types() {
        assert_eq!(
            Wheel::new("Colors", vec![Open, Color, Color, Gobo]).wheel_type(),
            Some(WheelType::Color)
        );
        assert_eq!(
            Wheel::new("Gobos", vec![Open, Gobo, Color, Gobo, Color]).wheel_type(),
            Some(WheelType::Gobo)
        );
        assert_eq!(
            Wheel::new("Animation", vec![AnimationGoboStart, AnimationGoboEnd, Gobo])
                .wheel_type(),
            Some(WheelType::AnimationGobo)
        );
        assert_eq!(
            Wheel::new("Shutter", vec![Closed, Open]).wheel_type(),
            Some(WheelType::Closed)
        );
        assert_eq!(Wheel::new("Empty", vec![]).wheel_type(), None);
    }
}
