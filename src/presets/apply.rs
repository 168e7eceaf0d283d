use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{AxisKind, ColorTable, CoreError, Image5D};

use super::{ChannelPresetSet, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetReport {
    pub preset_name: Option<String>,
    pub channels: Vec<usize>,
}

/// Applies `presets` to `image` as one batch under the image lock. A preset
/// naming a channel the image lacks fails the whole batch before any change.
pub fn apply_presets(image: &mut Image5D, presets: &ChannelPresetSet) -> Result<PresetReport> {
    presets.validate()?;
    let n_channels = image.n_channels();
    if let Some(preset) = presets.channels.iter().find(|p| p.channel >= n_channels) {
        return Err(CoreError::OutOfRange {
            axis: AxisKind::Channel,
            index: preset.channel,
            size: n_channels,
        }
        .into());
    }

    let channels = image.batch("apply channel presets", |image| {
        let mut applied = Vec::with_capacity(presets.channels.len());
        for preset in &presets.channels {
            let channel = preset.channel;
            let mut display = image.channel_display_properties(channel)?;
            if let Some(color) = preset.color {
                display.color_table = ColorTable::from_color(color);
            }
            if let Some([min, max]) = preset.display_range {
                display.set_display_range(min, max);
            }
            if let Some([min, max]) = preset.threshold {
                display.min_threshold = min;
                display.max_threshold = max;
            }
            if let Some(gray) = preset.displayed_gray {
                display.displayed_gray = gray;
            }
            if let Some(overlay) = preset.displayed_in_overlay {
                display.displayed_in_overlay = overlay;
            }
            image.set_channel_display_properties(channel, &display)?;

            let calibration = image.channel_calibration_mut(channel)?;
            if let Some(label) = &preset.label {
                calibration.set_label(label.as_str());
            }
            if let Some(function) = &preset.calibration {
                calibration.set_function(
                    function.function,
                    &function.coefficients,
                    function.unit.as_str(),
                    function.zero_clip,
                );
            }
            debug!(channel, "applied channel preset");
            applied.push(channel);
        }
        Ok(applied)
    })?;

    Ok(PresetReport {
        preset_name: presets.name.clone(),
        channels,
    })
}
