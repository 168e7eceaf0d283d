use std::path::Path;

use image::RgbImage;

use crate::model::Image5D;

use super::raster::{read_raster, write_png};
use super::tiff::{read_image5d, write_image5d};
use super::util::extension;
use super::{IoError, Result};

/// Opens a TIFF (with or without Image5D metadata) or a PNG/JPEG image.
pub fn read_image(path: impl AsRef<Path>) -> Result<Image5D> {
    let path = path.as_ref();
    match extension(path)?.as_str() {
        "tif" | "tiff" => read_image5d(path),
        "png" | "jpg" | "jpeg" => read_raster(path),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

/// Saves all planes and channel metadata. Only TIFF can hold a five-dimensional image.
pub fn write_image(path: impl AsRef<Path>, image: &Image5D) -> Result<()> {
    let path = path.as_ref();
    match extension(path)?.as_str() {
        "tif" | "tiff" => write_image5d(path, image),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

pub fn save_snapshot_png(path: impl AsRef<Path>, snapshot: &RgbImage) -> Result<()> {
    write_png(path.as_ref(), snapshot)
}

pub fn supported_formats() -> &'static [&'static str] {
    &["tif", "tiff", "png", "jpg", "jpeg"]
}
