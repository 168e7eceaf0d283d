//! Turns pixel planes into RGB images using each channel's display properties.

use image::RgbImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{ColorTable, CoreError, Image5D, Is5D, Position, Result};

#[cfg(test)]
mod tests;

/// What a snapshot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotMode {
    /// One channel through its color table, or gray if it is flagged so.
    Channel(usize),
    /// Additive blend of every channel flagged "displayed in overlay".
    Overlay,
}

/// Maps a sample to a lookup-table index through the display window.
pub fn window_index(value: f64, min: f64, max: f64) -> u8 {
    if max <= min {
        return if value >= max { 255 } else { 0 };
    }
    ((value - min) / (max - min) * 255.0).round().clamp(0.0, 255.0) as u8
}

fn channel_colors(
    image: &Image5D,
    channel: usize,
    slice: usize,
    frame: usize,
) -> Result<Vec<[u8; 3]>> {
    let display = image.channel_display_properties(channel)?;
    let plane = image.pixels(&Position::plane(channel, slice, frame))?;
    let gray;
    let table = if display.displayed_gray {
        gray = ColorTable::grayscale();
        &gray
    } else {
        &display.color_table
    };
    let colors = plane
        .to_f32_vec()
        .par_iter()
        .map(|value| {
            let index = window_index(f64::from(*value), display.min_value, display.max_value);
            table.lookup(index)
        })
        .collect();
    Ok(colors)
}

fn to_rgb_image(image: &Image5D, colors: Vec<[u8; 3]>) -> Result<RgbImage> {
    let dims = image.dimensions();
    let bytes = colors.into_iter().flatten().collect();
    RgbImage::from_raw(dims.width as u32, dims.height as u32, bytes).ok_or_else(|| {
        CoreError::InvalidMetadata("rendered plane does not match the image size".to_string())
    })
}

pub fn render_channel(
    image: &Image5D,
    channel: usize,
    slice: usize,
    frame: usize,
) -> Result<RgbImage> {
    let colors = channel_colors(image, channel, slice, frame)?;
    to_rgb_image(image, colors)
}

/// Sums the colored channels at `(slice, frame)` with saturation. An image
/// with no overlay channel renders black.
pub fn render_overlay(image: &Image5D, slice: usize, frame: usize) -> Result<RgbImage> {
    let mut sum = vec![[0u8; 3]; image.dimensions().plane_len()];
    for channel in 0..image.n_channels() {
        if !image.channel_display_properties(channel)?.displayed_in_overlay {
            continue;
        }
        let colors = channel_colors(image, channel, slice, frame)?;
        sum.par_iter_mut().zip(colors.par_iter()).for_each(|(acc, color)| {
            for (component, value) in acc.iter_mut().zip(color) {
                *component = component.saturating_add(*value);
            }
        });
    }
    to_rgb_image(image, sum)
}

pub fn render_snapshot(
    image: &Image5D,
    mode: SnapshotMode,
    slice: usize,
    frame: usize,
) -> Result<RgbImage> {
    match mode {
        SnapshotMode::Channel(channel) => render_channel(image, channel, slice, frame),
        SnapshotMode::Overlay => render_overlay(image, slice, frame),
    }
}

/// A rendered snapshot is a flat raster with no channel, slice or frame axes.
impl Is5D for RgbImage {
    fn as_image5d(&self) -> Option<&Image5D> {
        None
    }

    fn as_image5d_mut(&mut self) -> Option<&mut Image5D> {
        None
    }
}
