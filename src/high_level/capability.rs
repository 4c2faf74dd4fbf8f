use getset::Getters;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::IntoEnumIterator;

use crate::low_level::CapabilityRecord;

use super::{
    entity::Entity,
    error::ChannelError,
    fixture::FixtureInfo,
    resolution::{DmxRange, Resolution},
    wheel::Wheel,
};

/// The effect a capability has on the fixture.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub enum CapabilityType {
    NoFunction,
    ShutterStrobe,
    StrobeSpeed,
    StrobeDuration,
    Intensity,
    ColorIntensity,
    ColorPreset,
    ColorTemperature,
    Pan,
    PanContinuous,
    Tilt,
    TiltContinuous,
    PanTiltSpeed,
    WheelSlot,
    WheelShake,
    WheelSlotRotation,
    WheelRotation,
    Effect,
    EffectSpeed,
    EffectDuration,
    EffectParameter,
    SoundSensitivity,
    BeamAngle,
    BeamPosition,
    Focus,
    Zoom,
    Iris,
    IrisEffect,
    Frost,
    FrostEffect,
    Prism,
    PrismRotation,
    BladeInsertion,
    BladeRotation,
    BladeSystemRotation,
    Fog,
    FogOutput,
    FogType,
    Rotation,
    Speed,
    Time,
    Maintenance,
    Generic,
}

impl CapabilityType {
    /// Capability types that reference wheels.
    pub fn uses_wheels(&self) -> bool {
        matches!(
            self,
            CapabilityType::WheelSlot
                | CapabilityType::WheelShake
                | CapabilityType::WheelSlotRotation
                | CapabilityType::WheelRotation
        )
    }
}

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
pub enum ShutterEffect {
    Open,
    Closed,
    Strobe,
    Pulse,
    RampUp,
    RampDown,
    RampUpDown,
    Lightning,
    Spikes,
    Burst,
}

/// Capability parameters that may either be given once (`speed`) or as a
/// start/end pair (`speedStart`, `speedEnd`) spanning the DMX range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum StartEndProperty {
    Speed,
    Duration,
    Time,
    Brightness,
    SlotNumber,
    Angle,
    HorizontalAngle,
    VerticalAngle,
    ColorTemperature,
    SoundSensitivity,
    ShakeAngle,
    ShakeSpeed,
    Distance,
    OpenPercent,
    FrostIntensity,
    Insertion,
    FogOutput,
    Parameter,
}

/// Start and end value of a [`StartEndProperty`], equal if it was given once.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct StartEnd {
    property: StartEndProperty,
    start: Entity,
    end: Entity,
}

impl StartEnd {
    pub fn is_step(&self) -> bool {
        self.start == self.end
    }
}

/// Fields that never take part in deciding whether two capabilities have the
/// same effect.
const DESCRIPTIVE_FIELDS: &[&str] = &["menuClick"];

/// A named effect bound to a DMX sub-range of a channel.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Capability {
    /// Range in the channel's declared `dmxValueResolution`.
    #[getset(get = "pub")]
    dmx_range: DmxRange,
    resolution: Resolution,
    max_resolution: Resolution,
    t: CapabilityType,
    shutter_effect: Option<ShutterEffect>,
    color: Option<String>,
    /// Referenced wheels, including those the fixture doesn't define.
    #[getset(get = "pub")]
    wheel_names: Vec<String>,
    #[getset(get = "pub")]
    wheels: Vec<Wheel>,
    #[getset(get = "pub")]
    start_end: Vec<StartEnd>,
    #[getset(get = "pub")]
    switch_channels: IndexMap<String, String>,
    /// Remaining type-specific fields, e.g. `effectName` or `colors`.
    #[getset(get = "pub")]
    parameters: Map<String, Value>,
    comment: Option<String>,
    help_wanted: Option<String>,
}

impl Capability {
    /// Build a capability from its record.
    ///
    /// `resolution` is the resolution the record's DMX range is declared in,
    /// `max_resolution` the one of the owning channel. Missing ranges span the
    /// whole channel. Wheels are looked up by name in `fixture`, defaulting to
    /// the channel name; unknown wheels are skipped.
    pub fn new(
        record: &CapabilityRecord,
        resolution: Resolution,
        max_resolution: Resolution,
        channel_name: &str,
        fixture: &FixtureInfo,
    ) -> Result<Self, ChannelError> {
        let dmx_range = record
            .dmx_range
            .map(DmxRange::from)
            .unwrap_or_else(|| DmxRange::full(resolution));

        let wheel_names: Vec<String> = match (&record.wheel, record.t.uses_wheels()) {
            (Some(reference), _) => reference.names().to_vec(),
            (None, true) => vec![channel_name.to_owned()],
            (None, false) => vec![],
        };
        let wheels = wheel_names
            .iter()
            .filter_map(|name| fixture.wheel(name).cloned())
            .collect();

        let mut parameters = record.parameters.clone();
        let mut start_end = Vec::new();
        for property in StartEndProperty::iter() {
            let key = property.to_string();
            let single = parameters.remove(&key);
            let start = parameters.remove(&format!("{key}Start"));
            let end = parameters.remove(&format!("{key}End"));
            let (start, end) = match (single, start, end) {
                (Some(single), _, _) => {
                    let entity = parse_entity(&single, &key)?;
                    (entity.clone(), entity)
                }
                (None, Some(start), Some(end)) => (
                    parse_entity(&start, &format!("{key}Start"))?,
                    parse_entity(&end, &format!("{key}End"))?,
                ),
                _ => continue,
            };
            start_end.push(StartEnd {
                property,
                start,
                end,
            });
        }
        for field in DESCRIPTIVE_FIELDS {
            parameters.remove(*field);
        }

        Ok(Self {
            dmx_range,
            resolution,
            max_resolution,
            t: record.t,
            shutter_effect: record.shutter_effect,
            color: record.color.clone(),
            wheel_names,
            wheels,
            start_end,
            switch_channels: record.switch_channels.clone(),
            parameters,
            comment: record.comment.clone(),
            help_wanted: record.help_wanted.clone(),
        })
    }

    pub fn capability_type(&self) -> CapabilityType {
        self.t
    }

    pub fn shutter_effect(&self) -> Option<ShutterEffect> {
        self.shutter_effect
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Set when the fixture record flags missing or uncertain information.
    pub fn help_wanted(&self) -> Option<&str> {
        self.help_wanted.as_deref()
    }

    /// The resolution [`Capability::dmx_range`] is expressed in.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// DMX range scaled to `resolution`, which must not exceed the channel's
    /// maximum resolution.
    pub fn dmx_range_with_resolution(&self, resolution: u8) -> Result<DmxRange, ChannelError> {
        let desired = Resolution::try_from(resolution)
            .ok()
            .filter(|r| *r <= self.max_resolution)
            .ok_or(ChannelError::InvalidResolution {
                resolution: i64::from(resolution),
                max_resolution: self.max_resolution,
            })?;
        Ok(self.dmx_range.scaled(self.resolution, desired))
    }

    /// Whether the capability has the same effect over its whole range, i.e.
    /// all start/end values are equal. Capabilities without start/end values
    /// are steps.
    pub fn is_step(&self) -> bool {
        self.start_end.iter().all(StartEnd::is_step)
    }

    /// Whether the effect decreases while the DMX value increases, i.e. every
    /// start/end pair that changes at all goes from higher to lower. Steps are
    /// never inverted.
    pub fn is_inverted(&self) -> bool {
        let mut proportional = self.start_end.iter().filter(|se| !se.is_step()).peekable();
        proportional.peek().is_some()
            && proportional.all(|se| se.start.base_number() > se.end.base_number())
    }

    /// Whether fading from the end of this capability into the start of `next`
    /// is meaningful because both control the same physical parameter.
    ///
    /// That is the case for directly adjacent ranges of the same type with the
    /// same static parameters, switch mapping, wheels and start/end properties,
    /// where each property continues in the same unit.
    pub fn can_crossfade_to(&self, next: &Capability) -> bool {
        let adjacent = u64::from(self.dmx_range.end()) + 1 == u64::from(next.dmx_range.start());
        if !adjacent
            || self.t != next.t
            || self.shutter_effect != next.shutter_effect
            || self.color != next.color
            || self.wheel_names != next.wheel_names
            || self.switch_channels != next.switch_channels
            || self.parameters != next.parameters
        {
            return false;
        }

        !self.start_end.is_empty()
            && self.start_end.len() == next.start_end.len()
            && self
                .start_end
                .iter()
                .zip(next.start_end.iter())
                .all(|(this, next)| this.property == next.property && this.end.unit() == next.start.unit())
    }
}

fn parse_entity(value: &Value, field: &str) -> Result<Entity, ChannelError> {
    Entity::from_json(value).map_err(|source| ChannelError::Entity {
        field: field.to_owned(),
        source,
    })
}
