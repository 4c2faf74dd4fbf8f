use std::borrow::Cow;

use super::{
    channel_type::ChannelType, coarse_channel::CoarseChannel, error::ChannelError,
    fine_channel::FineChannel, fixture::FixtureInfo, switching_channel::SwitchingChannel,
};

/// What every kind of channel has in common.
pub trait AbstractChannel {
    /// Unique within the fixture.
    fn key(&self) -> &str;

    /// Human readable name, falling back to the key.
    fn name(&self) -> Cow<'_, str>;

    fn fixture(&self) -> &FixtureInfo;
}

impl AbstractChannel for CoarseChannel {
    fn key(&self) -> &str {
        CoarseChannel::key(self)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(CoarseChannel::name(self))
    }

    fn fixture(&self) -> &FixtureInfo {
        CoarseChannel::fixture(self)
    }
}

impl AbstractChannel for FineChannel<'_> {
    fn key(&self) -> &str {
        FineChannel::key(self)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(FineChannel::name(self))
    }

    fn fixture(&self) -> &FixtureInfo {
        FineChannel::fixture(self)
    }
}

impl AbstractChannel for SwitchingChannel<'_> {
    fn key(&self) -> &str {
        SwitchingChannel::key(self)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(SwitchingChannel::name(self))
    }

    fn fixture(&self) -> &FixtureInfo {
        SwitchingChannel::fixture(self)
    }
}

/// Any channel of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::From)]
pub enum Channel<'a> {
    Coarse(&'a CoarseChannel),
    Fine(FineChannel<'a>),
    Switching(SwitchingChannel<'a>),
}

impl<'a> Channel<'a> {
    pub fn key(&self) -> &'a str {
        match *self {
            Channel::Coarse(c) => c.key(),
            Channel::Fine(c) => c.key(),
            Channel::Switching(c) => c.key(),
        }
    }

    pub fn name(&self) -> Cow<'a, str> {
        match *self {
            Channel::Coarse(c) => Cow::Borrowed(c.name()),
            Channel::Fine(c) => Cow::Owned(c.name()),
            Channel::Switching(c) => Cow::Borrowed(c.name()),
        }
    }

    pub fn fixture(&self) -> &'a FixtureInfo {
        self.coarse_channel().fixture()
    }

    /// The coarse channel this channel belongs to. For switching channels,
    /// that's the trigger channel.
    pub fn coarse_channel(&self) -> &'a CoarseChannel {
        match *self {
            Channel::Coarse(c) => c,
            Channel::Fine(c) => c.coarse_channel(),
            Channel::Switching(c) => c.trigger_channel(),
        }
    }

    /// The type of the channel itself. Switching channels have no type of
    /// their own.
    pub fn channel_type(&self) -> Result<Option<ChannelType>, ChannelError> {
        match self {
            Channel::Coarse(c) => c.channel_type().map(Some),
            Channel::Fine(c) => c.channel_type().map(Some),
            Channel::Switching(_) => Ok(None),
        }
    }
}

impl AbstractChannel for Channel<'_> {
    fn key(&self) -> &str {
        Channel::key(self)
    }

    fn name(&self) -> Cow<'_, str> {
        Channel::name(self)
    }

    fn fixture(&self) -> &FixtureInfo {
        Channel::fixture(self)
    }
}
