use std::{fmt, str::FromStr};

use serde_json::Value;
use serde_with::{DeserializeFromStr, SerializeDisplay};

use super::resolution::Resolution;

/// Unit of an [`Entity`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::EnumString,
    strum::Display,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub enum Unit {
    #[default]
    #[strum(serialize = "")]
    None,
    #[strum(serialize = "%")]
    Percent,
    #[strum(serialize = "Hz")]
    Hertz,
    #[strum(serialize = "bpm")]
    BeatsPerMinute,
    #[strum(serialize = "rpm")]
    RoundsPerMinute,
    #[strum(serialize = "s")]
    Seconds,
    #[strum(serialize = "ms")]
    Milliseconds,
    #[strum(serialize = "deg")]
    Degrees,
    #[strum(serialize = "K")]
    Kelvin,
    #[strum(serialize = "lm")]
    Lumens,
    #[strum(serialize = "m")]
    Meters,
    #[strum(serialize = "m^3/min")]
    CubicMetersPerMinute,
}

/// A parsed physical or percentage value expression like `50%`, `3.2s` or
/// `fast`.
///
/// Keywords are stored together with the conventional percentage they stand
/// for, so `fast` has the number 100 and the unit [`Unit::Percent`].
#[derive(Debug, Clone, PartialEq, Default, SerializeDisplay, DeserializeFromStr)]
pub struct Entity {
    number: f64,
    unit: Unit,
    keyword: Option<&'static str>,
}

/// Keywords and the percentage they stand for.
const KEYWORDS: &[(&str, f64)] = &[
    ("fast reverse", -100.),
    ("fast CCW", -100.),
    ("warm", -100.),
    ("CTO", -100.),
    ("left", -100.),
    ("top", -100.),
    ("slow reverse", -1.),
    ("slow CCW", -1.),
    ("stop", 0.),
    ("off", 0.),
    ("instant", 0.),
    ("default", 0.),
    ("center", 0.),
    ("closed", 0.),
    ("out", 0.),
    ("slow", 1.),
    ("slow CW", 1.),
    ("short", 1.),
    ("dark", 1.),
    ("low", 1.),
    ("weak", 1.),
    ("small", 1.),
    ("near", 1.),
    ("narrow", 1.),
    ("fast", 100.),
    ("fast CW", 100.),
    ("long", 100.),
    ("bright", 100.),
    ("high", 100.),
    ("strong", 100.),
    ("big", 100.),
    ("far", 100.),
    ("wide", 100.),
    ("cold", 100.),
    ("CTB", 100.),
    ("right", 100.),
    ("bottom", 100.),
    ("open", 100.),
    ("in", 100.),
];

impl Entity {
    pub fn new(number: f64, unit: Unit) -> Self {
        Self {
            number,
            unit,
            keyword: None,
        }
    }

    /// A plain number without unit.
    pub fn from_number(number: f64) -> Self {
        Self::new(number, Unit::None)
    }

    /// Parse a JSON value that is either a plain number or an entity string.
    pub fn from_json(value: &Value) -> Result<Self, EntityError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Self::from_number)
                .ok_or_else(|| EntityError::InvalidJson(value.to_string())),
            Value::String(s) => s.parse(),
            other => Err(EntityError::InvalidJson(other.to_string())),
        }
    }

    pub fn number(&self) -> f64 {
        self.number
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn keyword(&self) -> Option<&'static str> {
        self.keyword
    }

    /// The number converted to the base unit of its dimension, so `500ms`
    /// and `0.5s` yield the same base number.
    pub fn base_number(&self) -> f64 {
        match self.unit {
            Unit::Milliseconds => self.number / 1000.,
            _ => self.number,
        }
    }

    /// The percentage as fraction of 1, if this entity is a percentage.
    pub fn fraction(&self) -> Option<f64> {
        (self.unit == Unit::Percent).then_some(self.number / 100.)
    }
}

impl FromStr for Entity {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((keyword, percentage)) = KEYWORDS.iter().find(|(k, _)| *k == s) {
            return Ok(Self {
                number: *percentage,
                unit: Unit::Percent,
                keyword: Some(*keyword),
            });
        }

        let number_end = s
            .char_indices()
            .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(number_end);
        let digits = number.strip_prefix('-').unwrap_or(number);
        if digits.starts_with('.') || digits.ends_with('.') {
            return Err(EntityError::Unrecognized(s.to_owned()));
        }

        let number: f64 = number
            .parse()
            .map_err(|_| EntityError::Unrecognized(s.to_owned()))?;
        let unit: Unit = unit.parse().map_err(|_| EntityError::UnknownUnit {
            expression: s.to_owned(),
            unit: unit.to_owned(),
        })?;

        Ok(Self::new(number, unit))
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword {
            Some(keyword) => write!(f, "{keyword}"),
            None => write!(f, "{}{}", self.number, self.unit),
        }
    }
}

/// Resolve a percentage expression like `"50%"` into a raw DMX value of the
/// given resolution, i.e. `floor(percentage / 100 * max_value)`.
pub fn resolve_percentage(expression: &str, resolution: Resolution) -> Result<u32, EntityError> {
    let entity: Entity = expression.parse()?;
    let fraction = entity
        .fraction()
        .ok_or_else(|| EntityError::NotAPercentage(expression.to_owned()))?;
    let max = resolution.max_value();
    // float to int casts saturate, out of range percentages end up at 0 or max
    let value = (fraction * f64::from(max)).floor() as u32;
    Ok(value.min(max))
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    #[error("'{0}' is neither a number with unit nor a known keyword")]
    Unrecognized(String),
    #[error("unknown unit '{unit}' in '{expression}'")]
    UnknownUnit { expression: String, unit: String },
    #[error("'{0}' is not a percentage")]
    NotAPercentage(String),
    #[error("expected a number or an entity string, got {0}")]
    InvalidJson(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_with_units() -> Result<(), EntityError> {
        assert_eq!("50%".parse::<Entity>()?, Entity::new(50., Unit::Percent));
        assert_eq!("3.2s".parse::<Entity>()?, Entity::new(3.2, Unit::Seconds));
        assert_eq!("-10deg".parse::<Entity>()?, Entity::new(-10., Unit::Degrees));
        assert_eq!("120bpm".parse::<Entity>()?, Entity::new(120., Unit::BeatsPerMinute));
        assert_eq!("3200K".parse::<Entity>()?, Entity::new(3200., Unit::Kelvin));
        assert_eq!(
            "10m^3/min".parse::<Entity>()?,
            Entity::new(10., Unit::CubicMetersPerMinute)
        );
        assert_eq!("7".parse::<Entity>()?, Entity::from_number(7.));
        Ok(())
    }

    #[test]
    fn keywords() -> Result<(), EntityError> {
        let fast: Entity = "fast".parse()?;
        assert_eq!(fast.number(), 100.);
        assert_eq!(fast.unit(), Unit::Percent);
        assert_eq!(fast.keyword(), Some("fast"));
        assert_eq!(fast.to_string(), "fast");

        assert_eq!("slow CCW".parse::<Entity>()?.number(), -1.);
        assert_eq!("stop".parse::<Entity>()?.number(), 0.);
        // keywords don't equal the percentage they stand for
        assert_ne!("fast".parse::<Entity>()?, "100%".parse::<Entity>()?);
        Ok(())
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            "fastest".parse::<Entity>(),
            Err(EntityError::Unrecognized(..))
        ));
        assert!(matches!(
            "".parse::<Entity>(),
            Err(EntityError::Unrecognized(..))
        ));
        assert!(matches!(
            "50 %".parse::<Entity>(),
            Err(EntityError::UnknownUnit { unit, .. }) if unit == " %"
        ));
        assert!(matches!(
            "3parsecs".parse::<Entity>(),
            Err(EntityError::UnknownUnit { .. })
        ));
        for dangling_dot in [".5s", "5.s", "-.5%"] {
            assert!(
                matches!(dangling_dot.parse::<Entity>(), Err(EntityError::Unrecognized(..))),
                "{dangling_dot}"
            );
        }
    }

    #[test]
    fn from_json() -> Result<(), EntityError> {
        assert_eq!(Entity::from_json(&json!(1.5))?, Entity::from_number(1.5));
        assert_eq!(Entity::from_json(&json!("20Hz"))?, Entity::new(20., Unit::Hertz));
        assert!(matches!(
            Entity::from_json(&json!(true)),
            Err(EntityError::InvalidJson(..))
        ));
        Ok(())
    }

    #[test]
    fn base_numbers() -> Result<(), EntityError> {
        assert_eq!(
            "500ms".parse::<Entity>()?.base_number(),
            "0.5s".parse::<Entity>()?.base_number()
        );
        Ok(())
    }

    #[test]
    fn percentages() -> Result<(), EntityError> {
        assert_eq!(resolve_percentage("50%", Resolution::BIT16)?, 32767);
        assert_eq!(resolve_percentage("50%", Resolution::BIT8)?, 127);
        assert_eq!(resolve_percentage("100%", Resolution::BIT24)?, 16_777_215);
        assert_eq!(resolve_percentage("0%", Resolution::BIT8)?, 0);
        assert_eq!(resolve_percentage("150%", Resolution::BIT8)?, 255);
        assert!(matches!(
            resolve_percentage("3s", Resolution::BIT8),
            Err(EntityError::NotAPercentage(..))
        ));
        Ok(())
    }
}
