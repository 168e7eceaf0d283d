use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{CalibrationFunction, Image5D};

use super::{PresetError, Result};

/// Channel settings that can be saved from one image and applied to another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChannelPresetSet {
    pub name: Option<String>,
    #[serde(default)]
    pub channels: Vec<ChannelPreset>,
}

/// Settings for one zero-based channel. Absent fields leave the channel as is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChannelPreset {
    pub channel: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// End color of a black-to-color ramp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_range: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displayed_gray: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displayed_in_overlay: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationPreset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationPreset {
    pub function: CalibrationFunction,
    #[serde(default)]
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub zero_clip: bool,
}

impl ChannelPresetSet {
    /// Captures every channel of `image`, live edits included.
    pub fn from_image(image: &Image5D) -> Result<Self> {
        let mut channels = Vec::with_capacity(image.n_channels());
        for channel in 0..image.n_channels() {
            let display = image.channel_display_properties(channel)?;
            let calibration = image.channel_calibration(channel)?;
            channels.push(ChannelPreset {
                channel,
                label: Some(calibration.label().to_string()),
                color: Some(display.color_table.end_color()),
                display_range: Some([display.min_value, display.max_value]),
                threshold: display
                    .has_threshold()
                    .then_some([display.min_threshold, display.max_threshold]),
                displayed_gray: Some(display.displayed_gray),
                displayed_in_overlay: Some(display.displayed_in_overlay),
                calibration: calibration.is_calibrated().then(|| CalibrationPreset {
                    function: calibration.function(),
                    coefficients: calibration.coefficients().to_vec(),
                    unit: calibration.value_unit().to_string(),
                    zero_clip: calibration.is_zero_clip(),
                }),
            });
        }
        Ok(Self {
            name: Some(image.title().to_string()),
            channels,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(PresetError::Parse(
                "preset set must include at least one channel".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for preset in &self.channels {
            if !seen.insert(preset.channel) {
                return Err(PresetError::Parse(format!(
                    "channel {} appears more than once",
                    preset.channel
                )));
            }
            if let Some([min, max]) = preset.display_range {
                if min > max {
                    return Err(PresetError::Parse(format!(
                        "channel {} display range {min}..{max} is inverted",
                        preset.channel
                    )));
                }
            }
            if let Some(calibration) = &preset.calibration {
                let needed = calibration.function.coefficient_count();
                if calibration.coefficients.len() < needed {
                    return Err(PresetError::Parse(format!(
                        "channel {} calibration needs {needed} coefficients, found {}",
                        preset.channel,
                        calibration.coefficients.len()
                    )));
                }
            }
        }
        Ok(())
    }
}
