use serde::{Deserialize, Serialize};

use super::{CoreError, PixelType, Result};

pub const LUT_SIZE: usize = 256;

/// ImageJ's marker for "no threshold set".
pub const NO_THRESHOLD: f64 = -808_080.0;

/// A 256-entry RGB lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTable {
    red: Vec<u8>,
    green: Vec<u8>,
    blue: Vec<u8>,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::grayscale()
    }
}

impl ColorTable {
    pub fn from_rgb(red: Vec<u8>, green: Vec<u8>, blue: Vec<u8>) -> Result<Self> {
        for (name, table) in [("red", &red), ("green", &green), ("blue", &blue)] {
            if table.len() != LUT_SIZE {
                return Err(CoreError::InvalidMetadata(format!(
                    "{name} lookup table has {} entries, expected {LUT_SIZE}",
                    table.len()
                )));
            }
        }
        Ok(Self { red, green, blue })
    }

    pub fn grayscale() -> Self {
        Self::from_color([255, 255, 255])
    }

    /// Linear ramp from black to `color`.
    pub fn from_color(color: [u8; 3]) -> Self {
        let ramp = |component: u8| {
            (0..LUT_SIZE)
                .map(|index| ((index * usize::from(component)) / 255) as u8)
                .collect::<Vec<_>>()
        };
        Self {
            red: ramp(color[0]),
            green: ramp(color[1]),
            blue: ramp(color[2]),
        }
    }

    /// Ramp towards a fully saturated, fully bright hue in `[0, 1)`.
    pub fn from_hue(hue: f32) -> Self {
        Self::from_color(hue_to_rgb(hue))
    }

    pub fn red(&self) -> &[u8] {
        &self.red
    }

    pub fn green(&self) -> &[u8] {
        &self.green
    }

    pub fn blue(&self) -> &[u8] {
        &self.blue
    }

    pub fn lookup(&self, index: u8) -> [u8; 3] {
        let index = usize::from(index);
        [self.red[index], self.green[index], self.blue[index]]
    }

    /// Color at the top of the table.
    pub fn end_color(&self) -> [u8; 3] {
        self.lookup(u8::MAX)
    }

    pub fn is_grayscale(&self) -> bool {
        (0..LUT_SIZE).all(|index| {
            self.red[index] == index as u8
                && self.green[index] == index as u8
                && self.blue[index] == index as u8
        })
    }
}

fn hue_to_rgb(hue: f32) -> [u8; 3] {
    let h = (hue - hue.floor()) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let (r, g, b) = match sector as u32 {
        0 => (1.0, f, 0.0),
        1 => (1.0 - f, 1.0, 0.0),
        2 => (0.0, 1.0, f),
        3 => (0.0, 1.0 - f, 1.0),
        4 => (f, 0.0, 1.0),
        _ => (1.0, 0.0, 1.0 - f),
    };
    let scale = |value: f32| (value * 255.0 + 0.5) as u8;
    [scale(r), scale(g), scale(b)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LutUpdateMode {
    #[default]
    RedLut,
    BlackAndWhite,
    NoLutUpdate,
    OverUnder,
    Other(i32),
}

impl LutUpdateMode {
    pub fn code(self) -> i32 {
        match self {
            LutUpdateMode::RedLut => 0,
            LutUpdateMode::BlackAndWhite => 1,
            LutUpdateMode::NoLutUpdate => 2,
            LutUpdateMode::OverUnder => 3,
            LutUpdateMode::Other(code) => code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => LutUpdateMode::RedLut,
            1 => LutUpdateMode::BlackAndWhite,
            2 => LutUpdateMode::NoLutUpdate,
            3 => LutUpdateMode::OverUnder,
            other => LutUpdateMode::Other(other),
        }
    }
}

/// Rendering parameters of one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDisplayProperties {
    pub color_table: ColorTable,
    pub min_value: f64,
    pub max_value: f64,
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub lut_update_mode: LutUpdateMode,
    pub displayed_gray: bool,
    pub displayed_in_overlay: bool,
}

impl Default for ChannelDisplayProperties {
    fn default() -> Self {
        Self {
            color_table: ColorTable::grayscale(),
            min_value: 0.0,
            max_value: 255.0,
            min_threshold: NO_THRESHOLD,
            max_threshold: NO_THRESHOLD,
            lut_update_mode: LutUpdateMode::default(),
            displayed_gray: false,
            displayed_in_overlay: true,
        }
    }
}

impl ChannelDisplayProperties {
    /// Defaults with the display window matched to the sample type.
    pub fn for_pixel_type(pixel_type: PixelType) -> Self {
        let (min_value, max_value) = pixel_type.default_display_range();
        Self {
            min_value,
            max_value,
            ..Self::default()
        }
    }

    pub fn set_display_range(&mut self, min: f64, max: f64) {
        self.min_value = min;
        self.max_value = max;
    }

    pub fn has_threshold(&self) -> bool {
        self.min_threshold != NO_THRESHOLD
    }

    pub fn reset_threshold(&mut self) {
        self.min_threshold = NO_THRESHOLD;
        self.max_threshold = NO_THRESHOLD;
    }
}
