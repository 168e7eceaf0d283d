use std::path::Path;

use image::{DynamicImage, RgbImage};
use tracing::info;

use crate::model::{ColorTable, Image5D, PixelBuffer};

use super::tiff::title_from_path;
use super::{IoError, Result};

/// Loads a PNG or JPEG. Gray images become one channel; color images become
/// red, green and blue channels with matching color tables.
pub(crate) fn read_raster(path: &Path) -> Result<Image5D> {
    let title = title_from_path(path);
    let image = image::open(path)?;
    let (width, height) = (image.width() as usize, image.height() as usize);
    let mut image5d = match image {
        DynamicImage::ImageLuma8(buffer) => Image5D::from_stack(
            title,
            width,
            height,
            vec![PixelBuffer::U8(buffer.into_raw())],
            1,
            1,
            1,
        )?,
        DynamicImage::ImageLuma16(buffer) => Image5D::from_stack(
            title,
            width,
            height,
            vec![PixelBuffer::U16(buffer.into_raw())],
            1,
            1,
            1,
        )?,
        other => {
            let rgb = other.to_rgb8();
            let mut planes = vec![Vec::with_capacity(width * height); 3];
            for pixel in rgb.pixels() {
                for (plane, value) in planes.iter_mut().zip(pixel.0) {
                    plane.push(value);
                }
            }
            let mut image5d = Image5D::from_stack(
                title,
                width,
                height,
                planes.into_iter().map(PixelBuffer::U8).collect(),
                3,
                1,
                1,
            )?;
            for (channel, color) in [[255, 0, 0], [0, 255, 0], [0, 0, 255]].into_iter().enumerate() {
                image5d.set_channel_color_table(channel, ColorTable::from_color(color))?;
            }
            image5d.set_channel_labels(&["Red", "Green", "Blue"])?;
            image5d
        }
    };
    image5d.set_position(Default::default())?;
    Ok(image5d)
}

pub(crate) fn write_png(path: &Path, image: &RgbImage) -> Result<()> {
    match super::util::extension(path)?.as_str() {
        "png" => {}
        other => return Err(IoError::UnsupportedFormat(other.to_string())),
    }
    image.save(path)?;
    info!(path = %path.display(), "wrote snapshot");
    Ok(())
}
