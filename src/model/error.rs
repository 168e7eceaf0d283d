use thiserror::Error;

use super::{AxisKind, PixelType};

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("{axis} index {index} is out of range (size {size})")]
    OutOfRange {
        axis: AxisKind,
        index: usize,
        size: usize,
    },

    #[error("plane index {index} is out of range ({count} planes)")]
    PlaneOutOfRange { index: usize, count: usize },

    #[error(
        "pixel buffer mismatch: expected {expected_type} x {expected_len}, got {actual_type} x {actual_len}"
    )]
    TypeMismatch {
        expected_type: PixelType,
        expected_len: usize,
        actual_type: PixelType,
        actual_len: usize,
    },

    #[error(
        "dimension mismatch: {channels} channels x {slices} slices x {frames} frames != {plane_count} planes"
    )]
    DimensionMismatch {
        channels: usize,
        slices: usize,
        frames: usize,
        plane_count: usize,
    },

    #[error("invalid dimension size 0 for axis {axis}")]
    ZeroSizedDimension { axis: AxisKind },

    #[error("axis {0} cannot be expanded")]
    NotExpandable(AxisKind),

    #[error("cannot shrink axis {axis} from {current} to {requested}")]
    InvalidExpansion {
        axis: AxisKind,
        current: usize,
        requested: usize,
    },

    #[error("image \"{title}\" is busy ({owner})")]
    ResourceBusy { title: String, owner: String },

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
}
