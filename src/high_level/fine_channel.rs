use super::{
    capability::Capability, channel::Channel, channel_type::ChannelType,
    coarse_channel::CoarseChannel, error::ChannelError, fixture::FixtureInfo,
    resolution::Resolution,
};

/// One less significant byte of a [`CoarseChannel`]'s value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FineChannel<'a> {
    key: &'a str,
    coarse_channel: &'a CoarseChannel,
    resolution: Resolution,
}

impl<'a> FineChannel<'a> {
    /// `resolution` is the resolution reached when using the coarse channel
    /// and all fine channels up to this one, so at least 16 bit.
    pub(crate) fn new(key: &'a str, coarse_channel: &'a CoarseChannel, resolution: Resolution) -> Self {
        Self {
            key,
            coarse_channel,
            resolution,
        }
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    /// `"<coarse name> fine"` for the first fine channel, `"<coarse name> fine^n"`
    /// for the n-th one after that.
    pub fn name(&self) -> String {
        match self.resolution.bytes() {
            2 => format!("{} fine", self.coarse_channel.name()),
            bytes => format!("{} fine^{}", self.coarse_channel.name(), bytes - 1),
        }
    }

    pub fn fixture(&self) -> &'a FixtureInfo {
        self.coarse_channel.fixture()
    }

    pub fn coarse_channel(&self) -> &'a CoarseChannel {
        self.coarse_channel
    }

    /// The channel carrying the next more significant byte.
    pub fn coarser_channel(&self) -> Channel<'a> {
        if self.resolution == Resolution::BIT16 {
            return Channel::Coarse(self.coarse_channel);
        }
        let previous = self.resolution.index().saturating_sub(2);
        match self.coarse_channel.fine_channel_aliases().get(previous) {
            Some(alias) => Channel::Fine(FineChannel::new(
                alias,
                self.coarse_channel,
                Resolution::try_from(self.resolution.bytes() - 1).unwrap_or(Resolution::BIT16),
            )),
            None => Channel::Coarse(self.coarse_channel),
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn channel_type(&self) -> Result<ChannelType, ChannelError> {
        self.coarse_channel.channel_type()
    }

    pub fn capabilities(&self) -> Result<&'a [Capability], ChannelError> {
        self.coarse_channel.capabilities()
    }

    /// The byte this channel transmits when the coarse channel is at its
    /// default value.
    pub fn default_value(&self) -> Result<u32, ChannelError> {
        Ok(self
            .coarse_channel
            .default_value_with_resolution(self.resolution.bytes())?
            % 256)
    }
}
