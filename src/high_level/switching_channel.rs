use indexmap::IndexMap;

use super::{
    coarse_channel::CoarseChannel, error::ChannelError, fixture::FixtureInfo,
    resolution::DmxRange,
};

/// A virtual channel whose meaning depends on the value of its trigger
/// channel. Each capability of the trigger selects one of the target channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchingChannel<'a> {
    key: &'a str,
    trigger_channel: &'a CoarseChannel,
}

impl<'a> SwitchingChannel<'a> {
    pub(crate) fn new(key: &'a str, trigger_channel: &'a CoarseChannel) -> Self {
        Self {
            key,
            trigger_channel,
        }
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Same as the key.
    pub fn name(&self) -> &'a str {
        self.key
    }

    pub fn fixture(&self) -> &'a FixtureInfo {
        self.trigger_channel.fixture()
    }

    pub fn trigger_channel(&self) -> &'a CoarseChannel {
        self.trigger_channel
    }

    /// The channel key each trigger capability selects, in capability order.
    /// Capabilities that don't mention this alias select nothing.
    fn targets(&self) -> impl Iterator<Item = Option<&'a str>> + 'a {
        let key = self.key;
        self.trigger_channel
            .capability_records()
            .iter()
            .map(move |c| c.switch_channels.get(key).map(String::as_str))
    }

    /// Keys of all channels this channel can switch to, without duplicates.
    pub fn switch_to_channel_keys(&self) -> Vec<&'a str> {
        let mut keys: Vec<&'a str> = Vec::new();
        for key in self.targets().flatten() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// DMX ranges of the trigger channel, at its maximum resolution, that
    /// select each target channel.
    pub fn trigger_ranges(&self) -> Result<IndexMap<&'a str, Vec<DmxRange>>, ChannelError> {
        let max_resolution = self.trigger_channel.max_resolution().bytes();
        let capabilities = self.trigger_channel.capabilities()?;
        let mut ranges: IndexMap<&'a str, Vec<DmxRange>> = IndexMap::new();
        for (target, capability) in self.targets().zip(capabilities) {
            if let Some(target) = target {
                ranges
                    .entry(target)
                    .or_default()
                    .push(capability.dmx_range_with_resolution(max_resolution)?);
            }
        }
        Ok(ranges)
    }

    /// The channel key selected when the trigger channel is at `value`, given
    /// in the trigger's maximum resolution.
    pub fn channel_key_for_value(&self, value: u32) -> Result<Option<&'a str>, ChannelError> {
        Ok(self
            .trigger_ranges()?
            .into_iter()
            .find(|(_, ranges)| ranges.iter().any(|r| r.contains(value)))
            .map(|(key, _)| key))
    }

    /// The channel key selected by the trigger channel's default value.
    pub fn default_channel_key(&self) -> Result<Option<&'a str>, ChannelError> {
        self.channel_key_for_value(self.trigger_channel.default_value()?)
    }

    /// Whether the trigger channel flags missing information. Use
    /// [`crate::Fixture::is_channel_help_wanted`] to include the target channels.
    pub fn is_help_wanted(&self) -> bool {
        self.trigger_channel.is_help_wanted()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn wheel_select() -> CoarseChannel {
        CoarseChannel::new(
            "Wheel Select",
            serde_json::from_value(json!({
                "defaultValue": 150,
                "capabilities": [
                    { "dmxRange": [0, 99], "type": "Effect", "effectName": "Colors", "switchChannels": { "Wheel": "Color Wheel", "Wheel Speed": "Speed" } },
                    { "dmxRange": [100, 199], "type": "Effect", "effectName": "Gobos", "switchChannels": { "Wheel": "Gobo Wheel", "Wheel Speed": "Speed" } },
                    { "dmxRange": [200, 255], "type": "Effect", "effectName": "Colors again", "switchChannels": { "Wheel": "Color Wheel", "Wheel Speed": "Speed" } }
                ]
            }))
            .unwrap(),
        )
    }

    #[test]
    fn targets() {
        let trigger = wheel_select();
        let switching = trigger.switching_channels();
        assert_eq!(switching.len(), 2);

        let wheel = switching[0];
        assert_eq!(wheel.key(), "Wheel");
        assert_eq!(wheel.name(), "Wheel");
        assert_eq!(wheel.trigger_channel().key(), "Wheel Select");
        assert_eq!(wheel.switch_to_channel_keys(), ["Color Wheel", "Gobo Wheel"]);
        assert_eq!(switching[1].switch_to_channel_keys(), ["Speed"]);
    }

    #[test]
    fn ranges_and_values() -> Result<(), ChannelError> {
        let trigger = wheel_select();
        let wheel = trigger.switching_channels()[0];

        let ranges = wheel.trigger_ranges()?;
        assert_eq!(
            ranges.get("Color Wheel"),
            Some(&vec![DmxRange::new(0, 99), DmxRange::new(200, 255)])
        );
        assert_eq!(ranges.get("Gobo Wheel"), Some(&vec![DmxRange::new(100, 199)]));

        assert_eq!(wheel.channel_key_for_value(0)?, Some("Color Wheel"));
        assert_eq!(wheel.channel_key_for_value(199)?, Some("Gobo Wheel"));
        assert_eq!(wheel.channel_key_for_value(255)?, Some("Color Wheel"));
        assert_eq!(wheel.channel_key_for_value(256)?, None);
        assert_eq!(wheel.default_channel_key()?, Some("Gobo Wheel"));
        assert!(!wheel.is_help_wanted());
        Ok(())
    }
}
