use tracing::debug;

use super::{AxisKind, ChannelCalibration, ChannelDisplayProperties, CoreError, Result};

/// How records for newly appended channels are initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelInit {
    Defaults,
    CopyOf(usize),
}

/// Per-channel calibration and display records plus the single live display slot.
///
/// The live slot is what a renderer reads and edits. It belongs to
/// `live_channel`; the stored record of that channel is stale until
/// [`ChannelStore::store`] commits the live state back into it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStore {
    calibrations: Vec<ChannelCalibration>,
    display: Vec<ChannelDisplayProperties>,
    defaults: ChannelDisplayProperties,
    live: ChannelDisplayProperties,
    live_channel: Option<usize>,
}

impl ChannelStore {
    pub fn new(channels: usize, defaults: ChannelDisplayProperties) -> Self {
        Self {
            calibrations: vec![ChannelCalibration::default(); channels],
            display: vec![defaults.clone(); channels],
            live: defaults.clone(),
            defaults,
            live_channel: None,
        }
    }

    pub fn len(&self) -> usize {
        self.calibrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calibrations.is_empty()
    }

    pub fn live_channel(&self) -> Option<usize> {
        self.live_channel
    }

    pub fn live(&self) -> &ChannelDisplayProperties {
        &self.live
    }

    pub fn live_mut(&mut self) -> &mut ChannelDisplayProperties {
        &mut self.live
    }

    pub fn calibration(&self, channel: usize) -> Result<&ChannelCalibration> {
        self.check(channel)?;
        Ok(&self.calibrations[channel])
    }

    pub fn calibration_mut(&mut self, channel: usize) -> Result<&mut ChannelCalibration> {
        self.check(channel)?;
        Ok(&mut self.calibrations[channel])
    }

    pub fn set_calibration(&mut self, channel: usize, value: &ChannelCalibration) -> Result<()> {
        self.check(channel)?;
        self.calibrations[channel] = value.clone();
        Ok(())
    }

    /// Current display properties of `channel`. For the live channel this is
    /// the live state, which may be newer than its stored record.
    pub fn display_properties(&self, channel: usize) -> Result<ChannelDisplayProperties> {
        self.check(channel)?;
        if self.live_channel == Some(channel) {
            return Ok(self.live.clone());
        }
        Ok(self.display[channel].clone())
    }

    /// Stored record of `channel`, ignoring any uncommitted live edits.
    pub fn stored_display_properties(&self, channel: usize) -> Result<&ChannelDisplayProperties> {
        self.check(channel)?;
        Ok(&self.display[channel])
    }

    pub fn set_display_properties(
        &mut self,
        channel: usize,
        value: &ChannelDisplayProperties,
    ) -> Result<()> {
        self.check(channel)?;
        self.display[channel] = value.clone();
        if self.live_channel == Some(channel) {
            self.live = value.clone();
        }
        Ok(())
    }

    /// Commits the live state into the stored record of `channel`.
    ///
    /// A channel that is not live has no pending state, so this is a no-op for it.
    pub fn store(&mut self, channel: usize) -> Result<()> {
        self.check(channel)?;
        if self.live_channel == Some(channel) {
            self.display[channel] = self.live.clone();
        } else {
            debug!(channel, "store skipped, channel is not live");
        }
        Ok(())
    }

    /// Makes `channel` live by loading its stored record into the live slot.
    pub fn restore(&mut self, channel: usize) -> Result<()> {
        self.check(channel)?;
        self.live = self.display[channel].clone();
        self.live_channel = Some(channel);
        Ok(())
    }

    /// Commits the outgoing live channel, then makes `channel` live.
    pub fn switch_to(&mut self, channel: usize) -> Result<()> {
        self.check(channel)?;
        if let Some(previous) = self.live_channel {
            self.store(previous)?;
        }
        self.restore(channel)
    }

    /// Appends records up to `channels`. Existing records are left untouched.
    pub fn expand(&mut self, channels: usize, init: ChannelInit) -> Result<()> {
        let current = self.len();
        if channels < current {
            return Err(CoreError::InvalidExpansion {
                axis: AxisKind::Channel,
                current,
                requested: channels,
            });
        }
        let (calibration, display) = match init {
            ChannelInit::Defaults => (ChannelCalibration::default(), self.defaults.clone()),
            ChannelInit::CopyOf(source) => (
                self.calibration(source)?.clone(),
                self.display_properties(source)?,
            ),
        };
        self.calibrations.resize(channels, calibration);
        self.display.resize(channels, display);
        Ok(())
    }

    /// Exchanges the records of two channels. The live channel index does not move.
    pub fn swap(&mut self, first: usize, second: usize) -> Result<()> {
        self.check(first)?;
        self.check(second)?;
        if let Some(live) = self.live_channel {
            self.store(live)?;
        }
        self.calibrations.swap(first, second);
        self.display.swap(first, second);
        if let Some(live) = self.live_channel {
            self.restore(live)?;
        }
        Ok(())
    }

    fn check(&self, channel: usize) -> Result<()> {
        if channel >= self.len() {
            return Err(CoreError::OutOfRange {
                axis: AxisKind::Channel,
                index: channel,
                size: self.len(),
            });
        }
        Ok(())
    }
}
