use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{CapabilityType, Precedence, Resolution, ShutterEffect};

/// A channel definition, keyed by channel key in `availableChannels`.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fine_channel_aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dmx_value_resolution: Option<DmxValueResolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DmxValueRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_value: Option<DmxValueRecord>,
    #[serde(default)]
    pub constant: bool,
    #[serde(default)]
    pub precedence: Precedence,
    /// Shorthand for a single capability spanning the whole channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<CapabilityRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<CapabilityRecord>,
}

impl ChannelRecord {
    /// The capability records, whether declared with `capability` or
    /// `capabilities`.
    pub fn capability_records(&self) -> &[CapabilityRecord] {
        match &self.capability {
            Some(capability) => std::slice::from_ref(capability),
            None => &self.capabilities,
        }
    }
}

/// Resolutions allowed for `dmxValueResolution`. 32 bit values can't be
/// declared, even though channels with three fine channels reach 32 bit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub enum DmxValueResolution {
    #[strum(to_string = "8bit")]
    Bit8,
    #[strum(to_string = "16bit")]
    Bit16,
    #[strum(to_string = "24bit")]
    Bit24,
}

impl From<DmxValueResolution> for Resolution {
    fn from(value: DmxValueResolution) -> Self {
        match value {
            DmxValueResolution::Bit8 => Resolution::BIT8,
            DmxValueResolution::Bit16 => Resolution::BIT16,
            DmxValueResolution::Bit24 => Resolution::BIT24,
        }
    }
}

/// A raw DMX value (`defaultValue`, `highlightValue`), either an integer in the
/// channel's `dmxValueResolution` or a percentage string like `"50%"`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum DmxValueRecord {
    Dmx(u32),
    Expression(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dmx_range: Option<[u32; 2]>,
    #[serde(rename = "type")]
    pub t: CapabilityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_wanted: Option<String>,
    /// Maps switching channel alias to the key of the channel it switches to.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub switch_channels: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutter_effect: Option<ShutterEffect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheel: Option<WheelReference>,
    /// All type-specific fields not modelled above, e.g. `speedStart`,
    /// `angle` or `effectName`.
    #[serde(flatten)]
    pub parameters: Map<String, Value>,
}

impl CapabilityRecord {
    pub fn new(t: CapabilityType) -> Self {
        Self {
            dmx_range: None,
            t,
            comment: None,
            help_wanted: None,
            switch_channels: IndexMap::new(),
            shutter_effect: None,
            color: None,
            wheel: None,
            parameters: Map::new(),
        }
    }
}

/// Wheel name(s) referenced by a wheel capability.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum WheelReference {
    One(String),
    Many(Vec<String>),
}

impl WheelReference {
    pub fn names(&self) -> &[String] {
        match self {
            WheelReference::One(name) => std::slice::from_ref(name),
            WheelReference::Many(names) => names,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize_channel() -> Result<(), serde_json::Error> {
        let record: ChannelRecord = serde_json::from_value(json!({
            "fineChannelAliases": ["Dimmer fine"],
            "dmxValueResolution": "16bit",
            "defaultValue": "50%",
            "highlightValue": 1000,
            "precedence": "HTP",
            "capability": {
                "type": "Intensity",
                "brightnessStart": "0%",
                "brightnessEnd": "100%"
            }
        }))?;
        assert_eq!(record.name, None);
        assert_eq!(record.fine_channel_aliases, vec!["Dimmer fine"]);
        assert_eq!(record.dmx_value_resolution, Some(DmxValueResolution::Bit16));
        assert_eq!(
            record.default_value,
            Some(DmxValueRecord::Expression("50%".into()))
        );
        assert_eq!(record.highlight_value, Some(DmxValueRecord::Dmx(1000)));
        assert_eq!(record.precedence, Precedence::Htp);
        assert!(!record.constant);

        let capabilities = record.capability_records();
        assert_eq!(capabilities.len(), 1);
        assert_eq!(capabilities[0].t, CapabilityType::Intensity);
        assert_eq!(capabilities[0].parameters.get("brightnessEnd"), Some(&json!("100%")));
        Ok(())
    }

    #[test]
    fn deserialize_capabilities() -> Result<(), serde_json::Error> {
        let record: ChannelRecord = serde_json::from_value(json!({
            "capabilities": [
                {
                    "dmxRange": [0, 127],
                    "type": "WheelSlot",
                    "wheel": "Gobo Wheel",
                    "slotNumber": 1,
                    "switchChannels": { "Wheel Control": "Gobo Rotation" }
                },
                {
                    "dmxRange": [128, 255],
                    "type": "ShutterStrobe",
                    "shutterEffect": "Strobe",
                    "helpWanted": "Is this strobe random?"
                }
            ]
        }))?;
        let capabilities = record.capability_records();
        assert_eq!(capabilities.len(), 2);
        assert_eq!(capabilities[0].dmx_range, Some([0, 127]));
        assert_eq!(
            capabilities[0].wheel.as_ref().map(|w| w.names().to_vec()),
            Some(vec!["Gobo Wheel".to_owned()])
        );
        assert_eq!(
            capabilities[0].switch_channels.get("Wheel Control").map(String::as_str),
            Some("Gobo Rotation")
        );
        assert_eq!(capabilities[1].shutter_effect, Some(ShutterEffect::Strobe));
        assert!(capabilities[1].help_wanted.is_some());
        assert!(capabilities[1].parameters.is_empty());
        Ok(())
    }

    #[test]
    fn invalid_value_resolution() {
        let record = serde_json::from_value::<ChannelRecord>(json!({
            "dmxValueResolution": "32bit",
            "capability": { "type": "NoFunction" }
        }));
        assert!(record.is_err());
    }
}
