use std::sync::Arc;

use derivative::Derivative;
use once_cell::sync::OnceCell;
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::low_level::{CapabilityRecord, ChannelRecord, DmxValueRecord};

use super::{
    capability::{Capability, CapabilityType},
    channel_type::{classify, ChannelType},
    entity::resolve_percentage,
    error::ChannelError,
    fine_channel::FineChannel,
    fixture::{ChannelIndexLookup, FixtureInfo, SwitchingChannelBehavior},
    resolution::{scale_dmx_value, Resolution},
    switching_channel::SwitchingChannel,
};

/// Conflict resolution when several sources write the same channel.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::EnumString,
    strum::Display,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub enum Precedence {
    /// Latest Takes Precedence
    #[default]
    #[strum(to_string = "LTP")]
    Ltp,
    /// Highest Takes Precedence
    #[strum(to_string = "HTP")]
    Htp,
}

/// Derived properties, each computed on first access.
#[derive(Debug, Default, Clone)]
struct ChannelCache {
    capabilities: OnceCell<Vec<Capability>>,
    channel_type: OnceCell<ChannelType>,
    switching_channel_aliases: OnceCell<Vec<String>>,
    /// Indexed by [`Resolution::index`]
    default_values: OnceCell<Vec<u32>>,
    /// Indexed by [`Resolution::index`]
    highlight_values: OnceCell<Vec<u32>>,
}

/// A channel as defined in `availableChannels`, the most significant byte of
/// its value.
#[derive(Derivative, Clone)]
#[derivative(Debug, PartialEq)]
pub struct CoarseChannel {
    key: String,
    definition: ChannelRecord,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    fixture: Arc<FixtureInfo>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    cache: ChannelCache,
}

impl CoarseChannel {
    /// Create a channel that doesn't belong to any fixture. Wheel capabilities
    /// of such a channel reference no wheels.
    pub fn new<T: Into<String>>(key: T, definition: ChannelRecord) -> Self {
        Self::with_fixture(key, definition, Arc::default())
    }

    pub fn with_fixture<T: Into<String>>(
        key: T,
        definition: ChannelRecord,
        fixture: Arc<FixtureInfo>,
    ) -> Self {
        Self {
            key: key.into(),
            definition,
            fixture,
            cache: ChannelCache::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The declared name, defaulting to the key.
    pub fn name(&self) -> &str {
        self.definition.name.as_deref().unwrap_or(&self.key)
    }

    pub fn fixture(&self) -> &FixtureInfo {
        &self.fixture
    }

    pub fn definition(&self) -> &ChannelRecord {
        &self.definition
    }

    /// Replace the channel definition, dropping everything derived from the
    /// previous one.
    pub fn set_definition(&mut self, definition: ChannelRecord) {
        self.definition = definition;
        self.cache = ChannelCache::default();
    }

    pub fn fine_channel_aliases(&self) -> &[String] {
        &self.definition.fine_channel_aliases
    }

    /// Fine channels from coarsest to finest. Aliases beyond 32 bit are left out.
    pub fn fine_channels(&self) -> Vec<FineChannel<'_>> {
        self.fine_channel_aliases()
            .iter()
            .enumerate()
            .filter_map(|(i, alias)| {
                let resolution = Resolution::try_from(i + 2).ok()?;
                Some(FineChannel::new(alias, self, resolution))
            })
            .collect()
    }

    /// `1 + number of fine channel aliases`, at most 32 bit.
    pub fn max_resolution(&self) -> Resolution {
        Resolution::try_from(1 + self.fine_channel_aliases().len()).unwrap_or(Resolution::BIT32)
    }

    /// Highest raw DMX value of this channel including all fine channels.
    pub fn max_dmx_bound(&self) -> u32 {
        self.max_resolution().max_value()
    }

    /// Validate that `resolution` is between 1 and [`CoarseChannel::max_resolution`].
    pub fn ensure_proper_resolution(&self, resolution: u8) -> Result<Resolution, ChannelError> {
        Resolution::try_from(resolution)
            .ok()
            .filter(|r| *r <= self.max_resolution())
            .ok_or(ChannelError::InvalidResolution {
                resolution: i64::from(resolution),
                max_resolution: self.max_resolution(),
            })
    }

    /// Resolution that DMX values in the definition (capability ranges,
    /// default and highlight value) are given in. Defaults to the maximum
    /// resolution.
    pub fn dmx_value_resolution(&self) -> Resolution {
        self.definition
            .dmx_value_resolution
            .map(Resolution::from)
            .unwrap_or_else(|| self.max_resolution())
    }

    pub fn capability_records(&self) -> &[CapabilityRecord] {
        self.definition.capability_records()
    }

    /// Capabilities in DMX range order. Fails if a capability contains an
    /// unparsable value expression.
    pub fn capabilities(&self) -> Result<&[Capability], ChannelError> {
        self.cache
            .capabilities
            .get_or_try_init(|| {
                tracing::debug!(channel = %self.key, "building capabilities");
                let resolution = self.dmx_value_resolution();
                let max_resolution = self.max_resolution();
                self.capability_records()
                    .iter()
                    .map(|record| {
                        Capability::new(
                            record,
                            resolution,
                            max_resolution,
                            self.name(),
                            &self.fixture,
                        )
                    })
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn channel_type(&self) -> Result<ChannelType, ChannelError> {
        self.cache
            .channel_type
            .get_or_try_init(|| {
                let channel_type = classify(self.capabilities()?);
                tracing::debug!(channel = %self.key, %channel_type, "classified channel");
                Ok(channel_type)
            })
            .copied()
    }

    /// The color of a "Single Color" channel.
    pub fn color(&self) -> Result<Option<&str>, ChannelError> {
        if self.channel_type()? != ChannelType::SingleColor {
            return Ok(None);
        }
        Ok(self
            .capabilities()?
            .iter()
            .find(|c| c.capability_type() == CapabilityType::ColorIntensity)
            .and_then(Capability::color))
    }

    pub fn has_default_value(&self) -> bool {
        self.definition.default_value.is_some()
    }

    /// Default value at the maximum resolution, 0 if not declared.
    pub fn default_value(&self) -> Result<u32, ChannelError> {
        self.default_value_with_resolution(self.max_resolution().bytes())
    }

    pub fn default_value_with_resolution(&self, resolution: u8) -> Result<u32, ChannelError> {
        let resolution = self.ensure_proper_resolution(resolution)?;
        let values = self.cache.default_values.get_or_try_init(|| {
            self.values_per_resolution(self.definition.default_value.as_ref(), 0, "defaultValue")
        })?;
        self.value_at(values, resolution)
    }

    pub fn has_highlight_value(&self) -> bool {
        self.definition.highlight_value.is_some()
    }

    /// Highlight value at the maximum resolution, the highest value in
    /// [`CoarseChannel::dmx_value_resolution`] if not declared.
    pub fn highlight_value(&self) -> Result<u32, ChannelError> {
        self.highlight_value_with_resolution(self.max_resolution().bytes())
    }

    pub fn highlight_value_with_resolution(&self, resolution: u8) -> Result<u32, ChannelError> {
        let resolution = self.ensure_proper_resolution(resolution)?;
        let values = self.cache.highlight_values.get_or_try_init(|| {
            self.values_per_resolution(
                self.definition.highlight_value.as_ref(),
                self.dmx_value_resolution().max_value(),
                "highlightValue",
            )
        })?;
        self.value_at(values, resolution)
    }

    /// Resolve a raw value given in the dmx value resolution and scale it to
    /// every resolution up to the maximum one.
    fn values_per_resolution(
        &self,
        raw: Option<&DmxValueRecord>,
        fallback: u32,
        field: &str,
    ) -> Result<Vec<u32>, ChannelError> {
        let declared = self.dmx_value_resolution();
        let value = match raw {
            None => fallback,
            Some(DmxValueRecord::Dmx(value)) => *value,
            Some(DmxValueRecord::Expression(expression)) => {
                resolve_percentage(expression, declared).map_err(|source| {
                    ChannelError::DmxValue {
                        field: field.to_owned(),
                        source,
                    }
                })?
            }
        };
        Ok(self
            .max_resolution()
            .up_to()
            .map(|r| scale_dmx_value(value, declared, r))
            .collect())
    }

    fn value_at(&self, values: &[u32], resolution: Resolution) -> Result<u32, ChannelError> {
        values
            .get(resolution.index())
            .copied()
            .ok_or(ChannelError::InvalidResolution {
                resolution: i64::from(resolution.bytes()),
                max_resolution: self.max_resolution(),
            })
    }

    /// Whether the channel's physical effect decreases with increasing DMX
    /// value. Requires at least one proportional (non-step) capability and all
    /// of them to be inverted.
    pub fn is_inverted(&self) -> Result<bool, ChannelError> {
        let mut proportional = self
            .capabilities()?
            .iter()
            .filter(|c| !c.is_step())
            .peekable();
        Ok(proportional.peek().is_some() && proportional.all(Capability::is_inverted))
    }

    pub fn is_constant(&self) -> bool {
        self.definition.constant
    }

    /// Whether fading between DMX values of this channel is meaningful.
    ///
    /// Single capability channels can fade unless they are constant or have no
    /// function. Otherwise all neighboring capabilities need to be
    /// crossfadable and at least one capability must not be a step.
    pub fn can_crossfade(&self) -> Result<bool, ChannelError> {
        let capabilities = self.capabilities()?;
        if capabilities.len() == 1 {
            return Ok(!self.is_constant() && self.channel_type()? != ChannelType::NoFunction);
        }

        let neighbors_crossfade = capabilities.windows(2).all(|pair| match pair {
            [current, next] => current.can_crossfade_to(next),
            _ => false,
        });
        Ok(neighbors_crossfade && capabilities.iter().any(|c| !c.is_step()))
    }

    pub fn precedence(&self) -> Precedence {
        self.definition.precedence
    }

    /// Whether any capability flags missing or uncertain information.
    pub fn is_help_wanted(&self) -> bool {
        self.capability_records()
            .iter()
            .any(|c| c.help_wanted.is_some())
    }

    /// Aliases of the switching channels this channel controls, taken from the
    /// first capability. All capabilities are assumed to declare the same
    /// aliases.
    pub fn switching_channel_aliases(&self) -> &[String] {
        self.cache.switching_channel_aliases.get_or_init(|| {
            self.capability_records()
                .first()
                .map(|c| c.switch_channels.keys().cloned().collect())
                .unwrap_or_default()
        })
    }

    pub fn switching_channels(&self) -> Vec<SwitchingChannel<'_>> {
        self.switching_channel_aliases()
            .iter()
            .map(|alias| SwitchingChannel::new(alias, self))
            .collect()
    }

    /// Keys of all channels reachable through this channel's switching
    /// channels, without duplicates.
    pub fn switch_to_channel_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for key in self
            .switching_channels()
            .iter()
            .flat_map(SwitchingChannel::switch_to_channel_keys)
        {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Number of bytes of this channel (coarse plus fine channels) that are
    /// placed in `mode`. 0 if the channel isn't used there.
    pub fn resolution_in_mode(
        &self,
        mode: &impl ChannelIndexLookup,
        behavior: SwitchingChannelBehavior,
    ) -> u8 {
        let fine_channels = self.fine_channels();
        let used = std::iter::once(self.key())
            .chain(fine_channels.iter().map(FineChannel::key))
            .filter(|key| mode.channel_index(key, behavior).is_some())
            .count();
        u8::try_from(used).unwrap_or(u8::MAX)
    }

    /// Check that the capability ranges are contiguous and cover all values of
    /// the dmx value resolution.
    pub fn check_capability_ranges(&self) -> Result<(), ChannelError> {
        let mut expected: u64 = 0;
        for capability in self.capabilities()? {
            let range = capability.dmx_range();
            if u64::from(range.start()) != expected || range.end() < range.start() {
                return Err(ChannelError::CapabilityRangeGap {
                    expected,
                    found: range.start(),
                });
            }
            expected = u64::from(range.end()) + 1;
        }

        let bound = self.dmx_value_resolution().max_value();
        if expected != u64::from(bound) + 1 {
            return Err(ChannelError::CapabilityRangeCoverage {
                end: expected.saturating_sub(1),
                bound,
            });
        }
        Ok(())
    }
}
