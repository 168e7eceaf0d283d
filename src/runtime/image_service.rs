use tracing::info;

use crate::model::{AxisKind, BlankFill, Dimensions, Image5D, PixelType, Position};

use super::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageService;

impl ImageService {
    /// New image filled with `fill`, positioned at the origin. Multi-channel
    /// images get the default hue colors.
    pub fn create(
        &self,
        title: &str,
        pixel_type: PixelType,
        dims: [usize; 5],
        fill: BlankFill,
    ) -> Result<Image5D> {
        let [width, height, channels, slices, frames] = dims;
        let dims = Dimensions::new(width, height, channels, slices, frames)?;
        let mut image = Image5D::blank(title, pixel_type, dims, fill);
        if channels > 1 {
            image.assign_default_color_tables(&[])?;
        }
        image.set_position(Position::default())?;
        Ok(image)
    }

    /// Grows each listed axis to the requested size, new planes copying the
    /// current plane when `copy_current` is set.
    pub fn expand(
        &self,
        image: &mut Image5D,
        sizes: &[(AxisKind, usize)],
        copy_current: bool,
    ) -> Result<()> {
        for &(axis, size) in sizes {
            let before = image.dimension_size(axis);
            image.expand_dimension(axis, size, copy_current)?;
            info!(axis = %axis, before, after = size, "expanded image");
        }
        Ok(())
    }
}
