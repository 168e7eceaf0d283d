use std::path::Path;

use crate::formats::{read_image, save_snapshot_png, write_image};
use crate::model::Image5D;
use crate::render::{SnapshotMode, render_snapshot};

use super::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct IoService;

impl IoService {
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Image5D> {
        Ok(read_image(path)?)
    }

    pub fn write(&self, path: impl AsRef<Path>, image: &Image5D) -> Result<()> {
        write_image(path, image)?;
        Ok(())
    }

    pub fn snapshot(
        &self,
        path: impl AsRef<Path>,
        image: &Image5D,
        mode: SnapshotMode,
        slice: usize,
        frame: usize,
    ) -> Result<()> {
        let rendered = render_snapshot(image, mode, slice, frame)?;
        save_snapshot_png(path, &rendered)?;
        Ok(())
    }
}
