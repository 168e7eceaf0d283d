use std::fmt::Write as _;

use tracing::debug;

use crate::model::{Image5D, SpatialCalibration};

/// ImageJ release the written properties are compatible with.
pub const IMAGEJ_VERSION: &str = "1.54f";
pub const IMAGE5D_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The `key=value` property text stored in the TIFF image description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Description {
    pub imagej: Option<String>,
    pub image5d: Option<String>,
    pub images: Option<usize>,
    pub channels: Option<usize>,
    pub slices: Option<usize>,
    pub frames: Option<usize>,
    pub hyperstack: bool,
    pub unit: Option<String>,
    pub spacing: Option<f64>,
    pub frame_interval: Option<f64>,
}

impl Description {
    pub fn for_image(image: &Image5D) -> Self {
        let dims = image.dimensions();
        let spatial = image.spatial_calibration();
        let scaled = spatial.is_scaled();
        Self {
            imagej: Some(IMAGEJ_VERSION.to_string()),
            image5d: Some(IMAGE5D_VERSION.to_string()),
            images: Some(dims.plane_count()),
            channels: Some(dims.channels),
            slices: Some(dims.slices),
            frames: Some(dims.frames),
            hyperstack: true,
            unit: scaled.then(|| spatial.unit.clone()),
            spacing: (spatial.pixel_depth != 1.0).then_some(spatial.pixel_depth),
            frame_interval: (spatial.frame_interval != 0.0).then_some(spatial.frame_interval),
        }
    }

    pub fn is_image5d(&self) -> bool {
        self.image5d.is_some()
    }

    pub fn format(&self) -> String {
        let mut text = String::new();
        let mut line = |key: &str, value: &dyn std::fmt::Display| {
            let _ = writeln!(text, "{key}={value}");
        };
        if let Some(version) = &self.imagej {
            line("ImageJ", version);
        }
        if let Some(version) = &self.image5d {
            line("Image5D", version);
        }
        if let Some(images) = self.images {
            line("images", &images);
        }
        if let Some(channels) = self.channels {
            line("channels", &channels);
        }
        if let Some(slices) = self.slices {
            line("slices", &slices);
        }
        if let Some(frames) = self.frames {
            line("frames", &frames);
        }
        if self.hyperstack {
            line("hyperstack", &true);
        }
        if let Some(unit) = &self.unit {
            line("unit", unit);
        }
        if let Some(spacing) = self.spacing {
            line("spacing", &spacing);
        }
        if let Some(interval) = self.frame_interval {
            line("finterval", &interval);
        }
        text
    }

    /// Reads the known properties; unknown keys and unparsable values are ignored.
    pub fn parse(text: &str) -> Self {
        let mut description = Self::default();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "ImageJ" => description.imagej = Some(value.to_string()),
                "Image5D" => description.image5d = Some(value.to_string()),
                "images" => description.images = parse_value(key, value),
                "channels" => description.channels = parse_value(key, value),
                "slices" => description.slices = parse_value(key, value),
                "frames" => description.frames = parse_value(key, value),
                "hyperstack" => description.hyperstack = value == "true",
                "unit" => description.unit = Some(value.to_string()),
                "spacing" => description.spacing = parse_value(key, value),
                "finterval" => description.frame_interval = parse_value(key, value),
                _ => {}
            }
        }
        description
    }

    /// Channel, slice and frame counts, if they account for exactly `pages` planes.
    pub fn hyperstack_shape(&self, pages: usize) -> Option<(usize, usize, usize)> {
        let channels = self.channels.unwrap_or(1);
        let slices = self.slices.unwrap_or(1);
        let frames = self.frames.unwrap_or(1);
        let planes = channels.checked_mul(slices)?.checked_mul(frames)?;
        (planes == pages).then_some((channels, slices, frames))
    }

    pub fn spatial_calibration(&self) -> SpatialCalibration {
        let defaults = SpatialCalibration::default();
        SpatialCalibration {
            pixel_depth: self.spacing.unwrap_or(defaults.pixel_depth),
            frame_interval: self.frame_interval.unwrap_or(defaults.frame_interval),
            unit: self.unit.clone().unwrap_or(defaults.unit.clone()),
            ..defaults
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    let parsed = value.parse().ok();
    if parsed.is_none() {
        debug!(key, value, "ignoring unparsable description property");
    }
    parsed
}
