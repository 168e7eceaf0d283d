use tracing::debug;

use super::{
    AxisKind, BusyLock, ChannelCalibration, ChannelDisplayProperties, ChannelInit, ChannelStore,
    ColorTable, CoreError, Dimensions, PixelBuffer, PixelStore, PixelType, Position, Result,
    SpatialCalibration,
};

/// Capability of a host image to be viewed as an [`Image5D`].
pub trait Is5D {
    fn as_image5d(&self) -> Option<&Image5D>;

    fn as_image5d_mut(&mut self) -> Option<&mut Image5D>;

    fn is_5d(&self) -> bool {
        self.as_image5d().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    /// No position selected yet; no channel is live.
    Idle,
    Active(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BlankFill {
    #[default]
    Black,
    White,
    Value(f64),
}

/// Which channel settings [`Image5D::transfer_channel_settings`] copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    pub colors: bool,
    pub labels: bool,
    pub calibrations: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            colors: true,
            labels: true,
            calibrations: true,
        }
    }
}

/// A five-dimensional image: pixel planes, per-channel metadata and the
/// current position.
#[derive(Debug, Clone)]
pub struct Image5D {
    title: String,
    pixels: PixelStore,
    channels: ChannelStore,
    state: PositionState,
    lock: BusyLock,
    spatial: SpatialCalibration,
}

impl Image5D {
    /// Wraps an existing stack of planes, ordered channel fastest.
    pub fn from_stack(
        title: impl Into<String>,
        width: usize,
        height: usize,
        planes: Vec<PixelBuffer>,
        channels: usize,
        slices: usize,
        frames: usize,
    ) -> Result<Self> {
        let plane_count = channels
            .checked_mul(slices)
            .and_then(|count| count.checked_mul(frames));
        if plane_count != Some(planes.len()) {
            return Err(CoreError::DimensionMismatch {
                channels,
                slices,
                frames,
                plane_count: planes.len(),
            });
        }
        let dims = Dimensions::new(width, height, channels, slices, frames)?;
        let pixel_type = planes[0].pixel_type();
        let pixels = PixelStore::new(dims, pixel_type, planes)?;
        Ok(Self::assemble(title.into(), pixels))
    }

    pub fn blank(
        title: impl Into<String>,
        pixel_type: PixelType,
        dims: Dimensions,
        fill: BlankFill,
    ) -> Self {
        let value = match fill {
            BlankFill::Black => 0.0,
            BlankFill::White => pixel_type.white_value(),
            BlankFill::Value(value) => value,
        };
        Self::assemble(title.into(), PixelStore::filled(dims, pixel_type, value))
    }

    fn assemble(title: String, pixels: PixelStore) -> Self {
        let defaults = ChannelDisplayProperties::for_pixel_type(pixels.pixel_type());
        let channels = ChannelStore::new(pixels.dimensions().channels, defaults);
        Self {
            title,
            pixels,
            channels,
            state: PositionState::Idle,
            lock: BusyLock::default(),
            spatial: SpatialCalibration::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn dimensions(&self) -> Dimensions {
        self.pixels.dimensions()
    }

    pub fn dimension_size(&self, axis: AxisKind) -> usize {
        self.dimensions().size(axis)
    }

    pub fn n_channels(&self) -> usize {
        self.dimensions().channels
    }

    pub fn n_slices(&self) -> usize {
        self.dimensions().slices
    }

    pub fn n_frames(&self) -> usize {
        self.dimensions().frames
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixels.pixel_type()
    }

    pub fn spatial_calibration(&self) -> &SpatialCalibration {
        &self.spatial
    }

    pub fn set_spatial_calibration(&mut self, calibration: SpatialCalibration) {
        self.spatial = calibration;
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    pub fn current_position(&self) -> Option<Position> {
        match self.state {
            PositionState::Idle => None,
            PositionState::Active(position) => Some(position),
        }
    }

    pub fn current_channel(&self) -> Option<usize> {
        self.current_position().map(|position| position.channel)
    }

    /// Moves to `position`. A channel change commits the outgoing channel's
    /// live display state and loads the incoming one. Nothing changes on error.
    pub fn set_position(&mut self, position: Position) -> Result<()> {
        self.dimensions().validate(&position)?;
        if self.current_channel() != Some(position.channel) {
            self.channels.switch_to(position.channel)?;
            debug!(
                title = %self.title,
                channel = position.channel,
                "switched live channel"
            );
        }
        self.state = PositionState::Active(position);
        Ok(())
    }

    /// Changes only the channel of the current position (origin when idle).
    pub fn set_channel(&mut self, channel: usize) -> Result<()> {
        let position = self.current_position().unwrap_or_default();
        self.set_position(position.with(AxisKind::Channel, channel))
    }

    /// Grows `axis` to `new_size`, appending zeroed planes or copies of the
    /// plane at the current position.
    pub fn expand_dimension(
        &mut self,
        axis: AxisKind,
        new_size: usize,
        copy_current: bool,
    ) -> Result<()> {
        if !axis.is_expandable() {
            return Err(CoreError::NotExpandable(axis));
        }
        let current = self.dimension_size(axis);
        if new_size < current {
            return Err(CoreError::InvalidExpansion {
                axis,
                current,
                requested: new_size,
            });
        }
        if new_size == current {
            return Ok(());
        }

        let template = if copy_current {
            Some(self.current_pixels()?.clone())
        } else {
            None
        };
        if let Some(live) = self.channels.live_channel() {
            self.channels.store(live)?;
        }
        for at in current..new_size {
            let dims = self.dimensions();
            let count = dims.with_size(axis, at + 1).plane_count() - dims.plane_count();
            let buffers = (0..count)
                .map(|_| {
                    template
                        .clone()
                        .unwrap_or_else(|| self.pixels.create_empty())
                })
                .collect::<Vec<_>>();
            self.pixels.insert_slices(axis, at, buffers)?;
        }
        if axis == AxisKind::Channel {
            self.channels.expand(new_size, ChannelInit::Defaults)?;
        }
        debug!(title = %self.title, %axis, new_size, copy_current, "expanded dimension");
        Ok(())
    }

    pub fn create_empty_pixels(&self) -> PixelBuffer {
        self.pixels.create_empty()
    }

    pub fn pixels(&self, position: &Position) -> Result<&PixelBuffer> {
        self.pixels.pixels(position)
    }

    pub fn plane(&self, channel: usize, slice: usize, frame: usize) -> Result<&PixelBuffer> {
        self.pixels.plane(channel, slice, frame)
    }

    /// Plane at the current position, or at the origin when idle.
    pub fn current_pixels(&self) -> Result<&PixelBuffer> {
        let position = self.current_position().unwrap_or_default();
        self.pixels.pixels(&position)
    }

    pub fn set_pixels(&mut self, position: &Position, buffer: PixelBuffer) -> Result<()> {
        self.pixels.set_pixels(position, buffer)
    }

    pub fn pixel(&self, position: &Position) -> Result<f64> {
        self.pixels.pixel(position)
    }

    pub fn set_pixel(&mut self, position: &Position, value: f64) -> Result<()> {
        self.pixels.set_pixel(position, value)
    }

    /// Calibrated value of the sample at `position`.
    pub fn calibrated_value(&self, position: &Position) -> Result<f64> {
        let raw = self.pixel(position)?;
        Ok(self.channels.calibration(position.channel)?.apply(raw))
    }

    /// Copies of all planes in flat stack order.
    pub fn to_stack(&self) -> Vec<PixelBuffer> {
        self.pixels.planes().to_vec()
    }

    pub fn pixel_store(&self) -> &PixelStore {
        &self.pixels
    }

    pub fn channel_calibration(&self, channel: usize) -> Result<&ChannelCalibration> {
        self.channels.calibration(channel)
    }

    pub fn channel_calibration_mut(&mut self, channel: usize) -> Result<&mut ChannelCalibration> {
        self.channels.calibration_mut(channel)
    }

    pub fn set_channel_calibration(
        &mut self,
        channel: usize,
        calibration: &ChannelCalibration,
    ) -> Result<()> {
        self.channels.set_calibration(channel, calibration)
    }

    pub fn channel_display_properties(&self, channel: usize) -> Result<ChannelDisplayProperties> {
        self.channels.display_properties(channel)
    }

    pub fn set_channel_display_properties(
        &mut self,
        channel: usize,
        properties: &ChannelDisplayProperties,
    ) -> Result<()> {
        self.channels.set_display_properties(channel, properties)
    }

    pub fn set_channel_color_table(&mut self, channel: usize, table: ColorTable) -> Result<()> {
        let mut properties = self.channels.display_properties(channel)?;
        properties.color_table = table;
        self.channels.set_display_properties(channel, &properties)
    }

    pub fn set_channel_labels<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<()> {
        for (channel, label) in labels.iter().take(self.n_channels()).enumerate() {
            self.channels
                .calibration_mut(channel)?
                .set_label(label.as_ref());
        }
        Ok(())
    }

    pub fn store_channel_properties(&mut self, channel: usize) -> Result<()> {
        self.channels.store(channel)
    }

    /// Reloads the stored record of `channel` into the live slot. For any
    /// channel other than the current one this is a channel switch, so the
    /// live channel stays the current channel.
    pub fn restore_channel_properties(&mut self, channel: usize) -> Result<()> {
        if self.current_channel() == Some(channel) {
            self.channels.restore(channel)
        } else {
            self.set_channel(channel)
        }
    }

    pub fn store_current_channel_properties(&mut self) -> Result<()> {
        match self.current_channel() {
            Some(channel) => self.channels.store(channel),
            None => Ok(()),
        }
    }

    pub fn restore_current_channel_properties(&mut self) -> Result<()> {
        match self.current_channel() {
            Some(channel) => self.channels.restore(channel),
            None => Ok(()),
        }
    }

    /// Display state a renderer draws the current channel with.
    pub fn live_display(&self) -> &ChannelDisplayProperties {
        self.channels.live()
    }

    /// Mutable live display state. Edits reach the current channel's stored
    /// record on the next store or channel switch.
    pub fn live_display_mut(&mut self) -> &mut ChannelDisplayProperties {
        self.channels.live_mut()
    }

    /// Fits the display window of `channel` to the extent of its pixel data.
    pub fn reset_display_range(&mut self, channel: usize) -> Result<()> {
        let Some((min, max)) = self.pixels.channel_min_max(channel)? else {
            return Ok(());
        };
        let mut properties = self.channels.display_properties(channel)?;
        properties.set_display_range(min, max);
        self.channels.set_display_properties(channel, &properties)
    }

    /// Gives every channel whose `has_color_table` entry is false a hue ramp
    /// spread evenly around the color wheel.
    pub fn assign_default_color_tables(&mut self, has_color_table: &[bool]) -> Result<()> {
        let n_channels = self.n_channels();
        for channel in 0..n_channels {
            if has_color_table.get(channel).copied().unwrap_or(false) {
                continue;
            }
            let hue = channel as f32 / n_channels as f32;
            self.set_channel_color_table(channel, ColorTable::from_hue(hue))?;
        }
        Ok(())
    }

    /// Swaps pixel planes and metadata of two channels.
    pub fn swap_channels(&mut self, first: usize, second: usize) -> Result<()> {
        self.channels.swap(first, second)?;
        self.pixels.swap_channels(first, second)
    }

    /// Copies color tables, labels and calibration functions of the first
    /// `min(n, m)` channels of `source`. Runs under the image lock.
    pub fn transfer_channel_settings(
        &mut self,
        source: &Image5D,
        options: TransferOptions,
    ) -> Result<()> {
        self.batch("transfer channel settings", |dest| {
            let shared = source.n_channels().min(dest.n_channels());
            for channel in 0..shared {
                if options.colors {
                    let table = source.channel_display_properties(channel)?.color_table;
                    dest.set_channel_color_table(channel, table)?;
                }
                let origin = source.channel_calibration(channel)?;
                let target = dest.channel_calibration_mut(channel)?;
                if options.labels {
                    target.set_label(origin.label());
                }
                if options.calibrations {
                    target.set_function_from(origin);
                }
            }
            Ok(())
        })
    }

    /// Independent copy with a new title. The lock is not carried over.
    pub fn duplicate(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lock: BusyLock::default(),
            ..self.clone()
        }
    }

    pub fn try_lock(&mut self, owner: &str) -> bool {
        self.lock.try_lock(owner)
    }

    pub fn unlock(&mut self, owner: &str) -> bool {
        self.lock.unlock(owner)
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Runs `operation` holding the lock for `owner`; fails fast if it is held.
    pub fn batch<R>(
        &mut self,
        owner: &str,
        operation: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        if !self.lock.try_lock(owner) {
            return Err(CoreError::ResourceBusy {
                title: self.title.clone(),
                owner: self.lock.owner().unwrap_or_default().to_string(),
            });
        }
        let result = operation(self);
        self.lock.unlock(owner);
        result
    }
}

impl Is5D for Image5D {
    fn as_image5d(&self) -> Option<&Image5D> {
        Some(self)
    }

    fn as_image5d_mut(&mut self) -> Option<&mut Image5D> {
        Some(self)
    }
}
