use rayon::prelude::*;

use super::{AxisKind, CoreError, Dimensions, PixelType, Position, Result};

/// Samples of one plane, row-major.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl PixelBuffer {
    pub fn zeroed(pixel_type: PixelType, len: usize) -> Self {
        match pixel_type {
            PixelType::U8 => PixelBuffer::U8(vec![0; len]),
            PixelType::U16 => PixelBuffer::U16(vec![0; len]),
            PixelType::F32 => PixelBuffer::F32(vec![0.0; len]),
        }
    }

    /// Buffer with every sample set to `value`, saturated to the sample type.
    pub fn filled(pixel_type: PixelType, len: usize, value: f64) -> Self {
        match pixel_type {
            PixelType::U8 => PixelBuffer::U8(vec![saturate_u8(value); len]),
            PixelType::U16 => PixelBuffer::U16(vec![saturate_u16(value); len]),
            PixelType::F32 => PixelBuffer::F32(vec![value as f32; len]),
        }
    }

    pub fn pixel_type(&self) -> PixelType {
        match self {
            PixelBuffer::U8(_) => PixelType::U8,
            PixelBuffer::U16(_) => PixelType::U16,
            PixelBuffer::F32(_) => PixelType::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PixelBuffer::U8(values) => values.len(),
            PixelBuffer::U16(values) => values.len(),
            PixelBuffer::F32(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            PixelBuffer::U8(values) => values.get(index).map(|v| f64::from(*v)),
            PixelBuffer::U16(values) => values.get(index).map(|v| f64::from(*v)),
            PixelBuffer::F32(values) => values.get(index).map(|v| f64::from(*v)),
        }
    }

    /// Writes one sample, saturating to the sample type. Returns false when out of bounds.
    pub fn set(&mut self, index: usize, value: f64) -> bool {
        match self {
            PixelBuffer::U8(values) => values
                .get_mut(index)
                .map(|slot| *slot = saturate_u8(value))
                .is_some(),
            PixelBuffer::U16(values) => values
                .get_mut(index)
                .map(|slot| *slot = saturate_u16(value))
                .is_some(),
            PixelBuffer::F32(values) => values
                .get_mut(index)
                .map(|slot| *slot = value as f32)
                .is_some(),
        }
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            PixelBuffer::U8(values) => values.iter().map(|v| f32::from(*v)).collect(),
            PixelBuffer::U16(values) => values.iter().map(|v| f32::from(*v)).collect(),
            PixelBuffer::F32(values) => values.clone(),
        }
    }

    /// Converts raw samples into a buffer of `pixel_type`, saturating integers.
    pub fn from_f32(pixel_type: PixelType, values: &[f32]) -> Self {
        match pixel_type {
            PixelType::U8 => {
                PixelBuffer::U8(values.iter().map(|v| saturate_u8(f64::from(*v))).collect())
            }
            PixelType::U16 => {
                PixelBuffer::U16(values.iter().map(|v| saturate_u16(f64::from(*v))).collect())
            }
            PixelType::F32 => PixelBuffer::F32(values.to_vec()),
        }
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut iter = (0..self.len()).filter_map(|index| self.get(index));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), value| {
            (min.min(value), max.max(value))
        }))
    }
}

fn saturate_u8(value: f64) -> u8 {
    value.round().clamp(0.0, f64::from(u8::MAX)) as u8
}

fn saturate_u16(value: f64) -> u16 {
    value.round().clamp(0.0, f64::from(u16::MAX)) as u16
}

/// Flat, channel-fastest sequence of planes.
///
/// Plane `c + z * channels + t * channels * slices` holds `(c, z, t)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelStore {
    dims: Dimensions,
    pixel_type: PixelType,
    planes: Vec<PixelBuffer>,
}

impl PixelStore {
    pub fn new(dims: Dimensions, pixel_type: PixelType, planes: Vec<PixelBuffer>) -> Result<Self> {
        if planes.len() != dims.plane_count() {
            return Err(CoreError::DimensionMismatch {
                channels: dims.channels,
                slices: dims.slices,
                frames: dims.frames,
                plane_count: planes.len(),
            });
        }
        let store = Self {
            dims,
            pixel_type,
            planes: Vec::new(),
        };
        for plane in &planes {
            store.check_buffer(plane)?;
        }
        Ok(Self { planes, ..store })
    }

    pub fn filled(dims: Dimensions, pixel_type: PixelType, value: f64) -> Self {
        let plane = PixelBuffer::filled(pixel_type, dims.plane_len(), value);
        Self {
            dims,
            pixel_type,
            planes: vec![plane; dims.plane_count()],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    pub fn create_empty(&self) -> PixelBuffer {
        PixelBuffer::zeroed(self.pixel_type, self.dims.plane_len())
    }

    pub fn check_buffer(&self, buffer: &PixelBuffer) -> Result<()> {
        let expected_len = self.dims.plane_len();
        if buffer.pixel_type() != self.pixel_type || buffer.len() != expected_len {
            return Err(CoreError::TypeMismatch {
                expected_type: self.pixel_type,
                expected_len,
                actual_type: buffer.pixel_type(),
                actual_len: buffer.len(),
            });
        }
        Ok(())
    }

    pub fn pixels(&self, position: &Position) -> Result<&PixelBuffer> {
        let index = self.dims.flat_index(position)?;
        Ok(&self.planes[index])
    }

    pub fn plane(&self, channel: usize, slice: usize, frame: usize) -> Result<&PixelBuffer> {
        let index = self.dims.plane_index(channel, slice, frame)?;
        Ok(&self.planes[index])
    }

    pub fn set_pixels(&mut self, position: &Position, buffer: PixelBuffer) -> Result<()> {
        let index = self.dims.flat_index(position)?;
        self.check_buffer(&buffer)?;
        self.planes[index] = buffer;
        Ok(())
    }

    pub fn pixel(&self, position: &Position) -> Result<f64> {
        let plane = self.pixels(position)?;
        let offset = position.x + position.y * self.dims.width;
        plane.get(offset).ok_or(CoreError::OutOfRange {
            axis: AxisKind::X,
            index: position.x,
            size: self.dims.width,
        })
    }

    pub fn set_pixel(&mut self, position: &Position, value: f64) -> Result<()> {
        let index = self.dims.flat_index(position)?;
        let offset = position.x + position.y * self.dims.width;
        if self.planes[index].set(offset, value) {
            Ok(())
        } else {
            Err(CoreError::OutOfRange {
                axis: AxisKind::X,
                index: position.x,
                size: self.dims.width,
            })
        }
    }

    pub fn planes(&self) -> &[PixelBuffer] {
        &self.planes
    }

    pub fn into_planes(self) -> Vec<PixelBuffer> {
        self.planes
    }

    /// Inserts one hyperplane at `at` along `axis`.
    ///
    /// `buffers` holds the new planes in flat order of the grown stack. The
    /// stack is rebuilt from the index formula, so every existing plane keeps
    /// its `(c, z, t)` (shifted by one along `axis` when at or past `at`).
    pub fn insert_slices(
        &mut self,
        axis: AxisKind,
        at: usize,
        buffers: Vec<PixelBuffer>,
    ) -> Result<()> {
        if !axis.is_expandable() {
            return Err(CoreError::NotExpandable(axis));
        }
        let old_size = self.dims.size(axis);
        if at > old_size {
            return Err(CoreError::OutOfRange {
                axis,
                index: at,
                size: old_size + 1,
            });
        }
        let grown = self.dims.with_size(axis, old_size + 1);
        let inserted = grown.plane_count() - self.dims.plane_count();
        let supplied = self.dims.plane_count() + buffers.len();
        let mismatch = || CoreError::DimensionMismatch {
            channels: grown.channels,
            slices: grown.slices,
            frames: grown.frames,
            plane_count: supplied,
        };
        if buffers.len() != inserted {
            return Err(mismatch());
        }
        for buffer in &buffers {
            self.check_buffer(buffer)?;
        }

        // Resolve every source before touching the planes so a failure leaves
        // the store intact.
        let mut fresh = buffers.into_iter();
        let mut sources = Vec::with_capacity(grown.plane_count());
        for position in grown.planes() {
            let index = position.get(axis);
            let source = if index == at {
                PlaneSource::Fresh(fresh.next().ok_or_else(mismatch)?)
            } else if index > at {
                PlaneSource::Old(self.dims.flat_index(&position.with(axis, index - 1))?)
            } else {
                PlaneSource::Old(self.dims.flat_index(&position)?)
            };
            sources.push(source);
        }

        let mut old_planes = std::mem::take(&mut self.planes);
        let planes = sources
            .into_iter()
            .map(|source| match source {
                PlaneSource::Fresh(buffer) => buffer,
                // Each old plane is referenced exactly once.
                PlaneSource::Old(flat) => {
                    std::mem::replace(&mut old_planes[flat], PixelBuffer::U8(Vec::new()))
                }
            })
            .collect();
        self.planes = planes;
        self.dims = grown;
        Ok(())
    }

    pub fn swap_channels(&mut self, first: usize, second: usize) -> Result<()> {
        self.dims.plane_index(first, 0, 0)?;
        self.dims.plane_index(second, 0, 0)?;
        for frame in 0..self.dims.frames {
            for slice in 0..self.dims.slices {
                let a = self.dims.plane_index(first, slice, frame)?;
                let b = self.dims.plane_index(second, slice, frame)?;
                self.planes.swap(a, b);
            }
        }
        Ok(())
    }

    /// Minimum and maximum sample over every plane of `channel`.
    pub fn channel_min_max(&self, channel: usize) -> Result<Option<(f64, f64)>> {
        self.dims.plane_index(channel, 0, 0)?;
        let channels = self.dims.channels;
        let range = self
            .planes
            .par_iter()
            .enumerate()
            .filter(|(index, _)| index % channels == channel)
            .filter_map(|(_, plane)| plane.min_max())
            .reduce_with(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)));
        Ok(range)
    }
}

enum PlaneSource {
    Old(usize),
    Fresh(PixelBuffer),
}
