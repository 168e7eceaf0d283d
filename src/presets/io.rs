use std::fs;
use std::path::Path;

use super::{ChannelPresetSet, Result};

fn is_yaml(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(extension.as_str(), "yaml" | "yml")
}

pub fn load_presets(path: impl AsRef<Path>) -> Result<ChannelPresetSet> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let presets = if is_yaml(path) {
        serde_yaml::from_str::<ChannelPresetSet>(&raw)?
    } else {
        serde_json::from_str::<ChannelPresetSet>(&raw)?
    };
    presets.validate()?;
    Ok(presets)
}

pub fn save_presets(path: impl AsRef<Path>, presets: &ChannelPresetSet) -> Result<()> {
    let path = path.as_ref();
    let serialized = if is_yaml(path) {
        serde_yaml::to_string(presets)?
    } else {
        serde_json::to_string_pretty(presets)?
    };
    fs::write(path, serialized)?;
    Ok(())
}
