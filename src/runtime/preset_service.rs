use std::path::Path;

use crate::model::Image5D;
use crate::presets::{ChannelPresetSet, PresetReport, apply_presets, load_presets, save_presets};

use super::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct PresetService;

impl PresetService {
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ChannelPresetSet> {
        Ok(load_presets(path)?)
    }

    pub fn export(&self, path: impl AsRef<Path>, image: &Image5D) -> Result<ChannelPresetSet> {
        let presets = ChannelPresetSet::from_image(image)?;
        save_presets(path, &presets)?;
        Ok(presets)
    }

    pub fn apply(&self, image: &mut Image5D, presets: &ChannelPresetSet) -> Result<PresetReport> {
        Ok(apply_presets(image, presets)?)
    }
}
