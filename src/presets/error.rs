use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PresetError>;

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("channel preset parse failure: {0}")]
    Parse(String),

    #[error("channel preset I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("channel preset serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("channel preset YAML serialization failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("applying channel presets failed: {0}")]
    Core(#[from] CoreError),
}
