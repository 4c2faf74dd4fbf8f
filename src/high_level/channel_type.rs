use serde_with::{DeserializeFromStr, SerializeDisplay};

use super::{
    capability::{Capability, CapabilityType, ShutterEffect},
    wheel::WheelType,
};

use CapabilityType::*;

/// Semantic type of a channel, derived from its capabilities.
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
pub enum ChannelType {
    #[strum(to_string = "Single Color")]
    SingleColor,
    #[strum(to_string = "Multi-Color")]
    MultiColor,
    Pan,
    Tilt,
    Focus,
    Zoom,
    Iris,
    Gobo,
    Prism,
    #[strum(to_string = "Color Temperature")]
    ColorTemperature,
    Effect,
    Strobe,
    Shutter,
    Fog,
    Speed,
    Maintenance,
    Intensity,
    NoFunction,
    Unknown,
}

/// A channel has the `channel_type` if any capability has one of the
/// `required` types and the `predicate` (if any) holds for all capabilities.
pub struct ChannelTypeConstraint {
    pub channel_type: ChannelType,
    pub required: &'static [CapabilityType],
    pub predicate: Option<fn(&[Capability]) -> bool>,
}

impl ChannelTypeConstraint {
    const fn any_of(channel_type: ChannelType, required: &'static [CapabilityType]) -> Self {
        Self {
            channel_type,
            required,
            predicate: None,
        }
    }

    const fn with_predicate(
        channel_type: ChannelType,
        required: &'static [CapabilityType],
        predicate: fn(&[Capability]) -> bool,
    ) -> Self {
        Self {
            channel_type,
            required,
            predicate: Some(predicate),
        }
    }

    pub fn matches(&self, capabilities: &[Capability]) -> bool {
        capabilities
            .iter()
            .any(|c| self.required.contains(&c.capability_type()))
            && self.predicate.map_or(true, |predicate| predicate(capabilities))
    }
}

/// Classification rules. The first matching entry wins, so the order matters:
/// a WheelSlot channel on a gobo wheel is a Gobo channel even though Effect
/// also lists WheelSlot.
pub const CHANNEL_TYPE_CONSTRAINTS: &[ChannelTypeConstraint] = &[
    ChannelTypeConstraint::any_of(ChannelType::SingleColor, &[ColorIntensity]),
    ChannelTypeConstraint::with_predicate(
        ChannelType::MultiColor,
        &[ColorPreset, WheelSlot],
        first_wheels_are_color_wheels,
    ),
    ChannelTypeConstraint::any_of(ChannelType::Pan, &[Pan, PanContinuous]),
    ChannelTypeConstraint::any_of(ChannelType::Tilt, &[Tilt, TiltContinuous]),
    ChannelTypeConstraint::any_of(ChannelType::Focus, &[Focus]),
    ChannelTypeConstraint::any_of(ChannelType::Zoom, &[Zoom]),
    ChannelTypeConstraint::any_of(ChannelType::Iris, &[Iris, IrisEffect]),
    ChannelTypeConstraint::with_predicate(
        ChannelType::Gobo,
        &[WheelSlot, WheelShake],
        all_wheels_are_gobo_wheels,
    ),
    ChannelTypeConstraint::any_of(ChannelType::Prism, &[Prism]),
    ChannelTypeConstraint::any_of(ChannelType::ColorTemperature, &[ColorTemperature]),
    ChannelTypeConstraint::any_of(
        ChannelType::Effect,
        &[
            Effect,
            EffectParameter,
            Frost,
            FrostEffect,
            SoundSensitivity,
            WheelSlot,
        ],
    ),
    ChannelTypeConstraint::with_predicate(
        ChannelType::Strobe,
        &[ShutterStrobe],
        has_strobing_shutter_effect,
    ),
    ChannelTypeConstraint::any_of(
        ChannelType::Shutter,
        &[
            ShutterStrobe,
            BladeInsertion,
            BladeRotation,
            BladeSystemRotation,
        ],
    ),
    ChannelTypeConstraint::any_of(ChannelType::Fog, &[Fog, FogOutput, FogType]),
    ChannelTypeConstraint::any_of(
        ChannelType::Speed,
        &[
            StrobeSpeed,
            StrobeDuration,
            PanTiltSpeed,
            EffectSpeed,
            EffectDuration,
            BeamAngle,
            BeamPosition,
            PrismRotation,
            Rotation,
            Speed,
            Time,
            WheelSlotRotation,
            WheelRotation,
            WheelShake,
        ],
    ),
    ChannelTypeConstraint::any_of(ChannelType::Maintenance, &[Maintenance]),
    ChannelTypeConstraint::any_of(ChannelType::Intensity, &[Intensity, Generic]),
    ChannelTypeConstraint::any_of(ChannelType::NoFunction, &[NoFunction]),
];

/// Classify a channel by its capabilities, falling back to
/// [`ChannelType::Unknown`].
pub fn classify(capabilities: &[Capability]) -> ChannelType {
    CHANNEL_TYPE_CONSTRAINTS
        .iter()
        .find(|constraint| constraint.matches(capabilities))
        .map_or(ChannelType::Unknown, |constraint| constraint.channel_type)
}

fn first_wheels_are_color_wheels(capabilities: &[Capability]) -> bool {
    capabilities
        .iter()
        .filter(|c| c.capability_type() == WheelSlot)
        .all(|c| {
            c.wheels()
                .first()
                .is_some_and(|w| w.wheel_type() == Some(WheelType::Color))
        })
}

fn all_wheels_are_gobo_wheels(capabilities: &[Capability]) -> bool {
    capabilities
        .iter()
        .flat_map(|c| c.wheels().iter())
        .all(|w| w.wheel_type() == Some(WheelType::Gobo))
}

fn has_strobing_shutter_effect(capabilities: &[Capability]) -> bool {
    capabilities.iter().any(|c| {
        c.capability_type() == ShutterStrobe
            && !matches!(
                c.shutter_effect(),
                Some(ShutterEffect::Open | ShutterEffect::Closed)
            )
    })
}
