use crate::formats::IoError;
use crate::model::CoreError;
use crate::presets::PresetError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("image service error: {0}")]
    Image(#[from] CoreError),

    #[error("I/O service error: {0}")]
    Io(#[from] IoError),

    #[error("preset service error: {0}")]
    Preset(#[from] PresetError),
}
