use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("unsupported image layout for this format: {0}")]
    UnsupportedLayout(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode/encode failure: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF decode/encode failure: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("core image failure: {0}")]
    Core(#[from] CoreError),

    #[error("metadata failure: {0}")]
    Metadata(#[from] MetadataDecodeError),
}

/// A tagged metadata record or block that could not be decoded.
///
/// Record-level errors are recoverable: the record is skipped and loading goes on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetadataDecodeError {
    #[error("record {tag:#010x} is truncated: needs {expected} bytes, has {actual}")]
    Truncated {
        tag: u32,
        expected: usize,
        actual: usize,
    },

    #[error("record {tag:#010x} has {actual} bytes, expected {expected}")]
    LengthMismatch {
        tag: u32,
        expected: usize,
        actual: usize,
    },

    #[error("record {tag:#010x} names channel {channel}, image has {channels}")]
    ChannelOutOfRange {
        tag: u32,
        channel: i32,
        channels: usize,
    },

    #[error("record {tag:#010x} carries an invalid value: {reason}")]
    InvalidValue { tag: u32, reason: String },

    #[error("malformed metadata block: {0}")]
    MalformedBlock(String),
}
