use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::WheelSlotType;

use super::ChannelRecord;

/// The parts of a fixture document this crate reads. Other fields (meta,
/// links, physical, …) are ignored.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FixtureRecord {
    pub name: String,
    #[serde(default)]
    pub wheels: IndexMap<String, WheelRecord>,
    /// Kept as a list so that repeated keys survive deserialization.
    #[serde_as(as = "Vec<(_, _)>")]
    #[serde(default)]
    pub available_channels: Vec<(String, ChannelRecord)>,
    #[serde(default)]
    pub modes: Vec<ModeRecord>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct WheelRecord {
    #[serde(default)]
    pub slots: Vec<WheelSlotRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WheelSlotRecord {
    #[serde(rename = "type")]
    pub t: WheelSlotType,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModeRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Channel keys in DMX order; `null` marks an unused address.
    #[serde(default)]
    pub channels: Vec<Option<String>>,
}
