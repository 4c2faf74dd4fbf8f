use std::sync::Arc;

use getset::Getters;
use indexmap::IndexMap;

use crate::low_level::{ChannelRecord, ModeRecord};

use super::{
    channel::Channel, coarse_channel::CoarseChannel, fine_channel::FineChannel,
    switching_channel::SwitchingChannel, wheel::Wheel,
};

/// The parts of a fixture its channels need to know about.
#[derive(Debug, Default, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct FixtureInfo {
    name: String,
    wheels: Vec<Wheel>,
}

impl FixtureInfo {
    pub fn new<T: Into<String>>(name: T, wheels: Vec<Wheel>) -> Self {
        Self {
            name: name.into(),
            wheels,
        }
    }

    pub fn wheel(&self, name: &str) -> Option<&Wheel> {
        self.wheels.iter().find(|w| w.name() == name)
    }
}

/// How switching channels placed in a mode are treated when looking for the
/// position of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum SwitchingChannelBehavior {
    /// Only direct matches count.
    None,
    /// A switching channel stands for every channel it can switch to.
    #[default]
    All,
    /// A switching channel stands for the channel selected by its trigger's
    /// default value.
    Default,
}

/// Anything that places channel keys at DMX offsets.
pub trait ChannelIndexLookup {
    /// Zero-based offset of `key`, if the channel is used.
    fn channel_index(&self, key: &str, behavior: SwitchingChannelBehavior) -> Option<usize>;
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Mode {
    #[getset(get = "pub")]
    name: String,
    short_name: Option<String>,
    /// `None` marks an unused DMX address.
    #[getset(get = "pub")]
    channel_keys: Vec<Option<String>>,
}

impl Mode {
    pub fn new<T: Into<String>>(name: T, short_name: Option<String>, channel_keys: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            short_name,
            channel_keys,
        }
    }

    /// The short name, defaulting to the name.
    pub fn short_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

impl From<ModeRecord> for Mode {
    fn from(record: ModeRecord) -> Self {
        Self::new(record.name, record.short_name, record.channels)
    }
}

/// A fixture with its channels and modes.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    info: Arc<FixtureInfo>,
    coarse_channels: IndexMap<String, CoarseChannel>,
    modes: Vec<Mode>,
}

impl Fixture {
    /// Channels with a key that's already taken are ignored.
    pub fn new(
        info: FixtureInfo,
        channels: impl IntoIterator<Item = (String, ChannelRecord)>,
        modes: Vec<Mode>,
    ) -> Self {
        let info = Arc::new(info);
        let mut coarse_channels = IndexMap::new();
        for (key, definition) in channels {
            coarse_channels.entry(key).or_insert_with_key(|key| {
                CoarseChannel::with_fixture(key.clone(), definition, Arc::clone(&info))
            });
        }
        Self {
            info,
            coarse_channels,
            modes,
        }
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn info(&self) -> &FixtureInfo {
        &self.info
    }

    pub fn wheels(&self) -> &[Wheel] {
        self.info.wheels()
    }

    pub fn wheel(&self, name: &str) -> Option<&Wheel> {
        self.info.wheel(name)
    }

    /// Channels of `availableChannels`, in declaration order.
    pub fn coarse_channels(&self) -> impl Iterator<Item = &CoarseChannel> {
        self.coarse_channels.values()
    }

    pub fn coarse_channel(&self, key: &str) -> Option<&CoarseChannel> {
        self.coarse_channels.get(key)
    }

    pub fn fine_channels(&self) -> Vec<FineChannel<'_>> {
        self.coarse_channels()
            .flat_map(CoarseChannel::fine_channels)
            .collect()
    }

    pub fn switching_channels(&self) -> Vec<SwitchingChannel<'_>> {
        self.coarse_channels()
            .flat_map(CoarseChannel::switching_channels)
            .collect()
    }

    /// All channels: coarse channels, then fine channels, then switching
    /// channels. For duplicate keys only the first channel is reachable via
    /// [`Fixture::channel`].
    pub fn all_channels(&self) -> Vec<Channel<'_>> {
        self.coarse_channels()
            .map(Channel::Coarse)
            .chain(self.fine_channels().into_iter().map(Channel::Fine))
            .chain(self.switching_channels().into_iter().map(Channel::Switching))
            .collect()
    }

    pub fn all_channel_keys(&self) -> Vec<&str> {
        self.all_channels().iter().map(Channel::key).collect()
    }

    /// Look up a coarse, fine or switching channel by key.
    pub fn channel(&self, key: &str) -> Option<Channel<'_>> {
        if let Some(coarse) = self.coarse_channel(key) {
            return Some(Channel::Coarse(coarse));
        }
        if let Some(fine) = self.fine_channels().into_iter().find(|c| c.key() == key) {
            return Some(Channel::Fine(fine));
        }
        self.switching_channels()
            .into_iter()
            .find(|c| c.key() == key)
            .map(Channel::Switching)
    }

    /// Whether the channel or, for switching channels, any channel it can
    /// switch to flags missing information.
    pub fn is_channel_help_wanted(&self, key: &str) -> bool {
        match self.channel(key) {
            Some(Channel::Switching(switching)) => {
                switching.is_help_wanted()
                    || switching.switch_to_channel_keys().iter().any(|target| {
                        self.channel(target)
                            .is_some_and(|c| c.coarse_channel().is_help_wanted())
                    })
            }
            Some(channel) => channel.coarse_channel().is_help_wanted(),
            None => false,
        }
    }

    pub fn modes(&self) -> impl Iterator<Item = ModeRef<'_>> {
        self.modes.iter().map(move |mode| ModeRef {
            mode,
            fixture: self,
        })
    }

    pub fn mode(&self, name: &str) -> Option<ModeRef<'_>> {
        self.modes().find(|m| m.mode.name == name)
    }
}

/// A mode together with the fixture that defines its channels.
#[derive(Debug, Clone, Copy)]
pub struct ModeRef<'a> {
    mode: &'a Mode,
    fixture: &'a Fixture,
}

impl<'a> ModeRef<'a> {
    pub fn mode(&self) -> &'a Mode {
        self.mode
    }

    pub fn fixture(&self) -> &'a Fixture {
        self.fixture
    }

    pub fn name(&self) -> &'a str {
        &self.mode.name
    }

    /// Channels in DMX order. Unused addresses and unknown keys are `None`.
    pub fn channels(&self) -> Vec<Option<Channel<'a>>> {
        self.mode
            .channel_keys
            .iter()
            .map(|key| key.as_deref().and_then(|key| self.fixture.channel(key)))
            .collect()
    }
}

impl ChannelIndexLookup for ModeRef<'_> {
    fn channel_index(&self, key: &str, behavior: SwitchingChannelBehavior) -> Option<usize> {
        self.mode.channel_keys.iter().position(|placed| {
            let Some(placed) = placed else {
                return false;
            };
            if placed == key {
                return true;
            }
            let Some(Channel::Switching(switching)) = self.fixture.channel(placed) else {
                return false;
            };
            match behavior {
                SwitchingChannelBehavior::None => false,
                SwitchingChannelBehavior::All => switching.switch_to_channel_keys().contains(&key),
                SwitchingChannelBehavior::Default => {
                    switching.default_channel_key().ok().flatten() == Some(key)
                }
            }
        })
    }
}
