mod apply;
mod error;
mod io;
mod set;

#[cfg(test)]
mod tests;

pub use apply::{PresetReport, apply_presets};
pub use error::{PresetError, Result};
pub use io::{load_presets, save_presets};
pub use set::{CalibrationPreset, ChannelPreset, ChannelPresetSet};
