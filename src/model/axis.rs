use std::fmt;

use serde::{Deserialize, Serialize};

/// The five axes of an Image5D, in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    X,
    Y,
    Channel,
    Z,
    Time,
}

impl AxisKind {
    pub const ALL: [AxisKind; 5] = [
        AxisKind::X,
        AxisKind::Y,
        AxisKind::Channel,
        AxisKind::Z,
        AxisKind::Time,
    ];

    pub fn index(self) -> usize {
        match self {
            AxisKind::X => 0,
            AxisKind::Y => 1,
            AxisKind::Channel => 2,
            AxisKind::Z => 3,
            AxisKind::Time => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short label used by the spatial calibration (`x`, `y`, `ch`, `z`, `t`).
    pub fn label(self) -> &'static str {
        match self {
            AxisKind::X => "x",
            AxisKind::Y => "y",
            AxisKind::Channel => "ch",
            AxisKind::Z => "z",
            AxisKind::Time => "t",
        }
    }

    /// Only the non-spatial axes can grow after construction.
    pub fn is_expandable(self) -> bool {
        matches!(self, AxisKind::Channel | AxisKind::Z | AxisKind::Time)
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AxisKind::X => "x",
            AxisKind::Y => "y",
            AxisKind::Channel => "channel",
            AxisKind::Z => "slice",
            AxisKind::Time => "frame",
        };
        formatter.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    #[default]
    U8,
    U16,
    F32,
}

impl PixelType {
    pub fn bits(self) -> u32 {
        match self {
            PixelType::U8 => 8,
            PixelType::U16 => 16,
            PixelType::F32 => 32,
        }
    }

    /// Sample value used for "white" when filling a blank image.
    pub fn white_value(self) -> f64 {
        match self {
            PixelType::U8 => f64::from(u8::MAX),
            PixelType::U16 => f64::from(u16::MAX),
            PixelType::F32 => 1.0,
        }
    }

    /// Default display window for a fresh channel of this type.
    pub fn default_display_range(self) -> (f64, f64) {
        match self {
            PixelType::U8 => (0.0, 255.0),
            PixelType::U16 => (0.0, 65_535.0),
            PixelType::F32 => (0.0, 1.0),
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelType::U8 => "8-bit",
            PixelType::U16 => "16-bit",
            PixelType::F32 => "32-bit",
        };
        formatter.write_str(name)
    }
}
