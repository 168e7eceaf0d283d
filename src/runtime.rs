mod context;
mod error;
mod image_service;
mod io_service;
mod preset_service;

#[cfg(test)]
mod tests;

pub use context::AppContext;
pub use error::{AppError, Result};
pub use image_service::ImageService;
pub use io_service::IoService;
pub use preset_service::PresetService;
