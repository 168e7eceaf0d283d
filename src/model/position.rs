use serde::{Deserialize, Serialize};

use super::{AxisKind, CoreError, Result};

/// A zero-based point in the five-dimensional index space.
///
/// Every index in this crate's API is zero-based, including `channel`. The
/// 1-based channel numbers of the persisted records are converted at the
/// codec boundary and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
    pub channel: usize,
    pub slice: usize,
    pub frame: usize,
}

impl Position {
    pub fn new(x: usize, y: usize, channel: usize, slice: usize, frame: usize) -> Self {
        Self {
            x,
            y,
            channel,
            slice,
            frame,
        }
    }

    /// Position of the plane origin `(0, 0, c, z, t)`.
    pub fn plane(channel: usize, slice: usize, frame: usize) -> Self {
        Self::new(0, 0, channel, slice, frame)
    }

    pub fn from_array(indices: [usize; 5]) -> Self {
        Self::new(indices[0], indices[1], indices[2], indices[3], indices[4])
    }

    pub fn to_array(self) -> [usize; 5] {
        [self.x, self.y, self.channel, self.slice, self.frame]
    }

    pub fn get(&self, axis: AxisKind) -> usize {
        self.to_array()[axis.index()]
    }

    pub fn with(self, axis: AxisKind, value: usize) -> Self {
        let mut indices = self.to_array();
        indices[axis.index()] = value;
        Self::from_array(indices)
    }
}

/// Sizes of the five axes. All sizes are at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub slices: usize,
    pub frames: usize,
}

impl Dimensions {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        slices: usize,
        frames: usize,
    ) -> Result<Self> {
        let dims = Self {
            width,
            height,
            channels,
            slices,
            frames,
        };
        for axis in AxisKind::ALL {
            if dims.size(axis) == 0 {
                return Err(CoreError::ZeroSizedDimension { axis });
            }
        }
        Ok(dims)
    }

    pub fn size(&self, axis: AxisKind) -> usize {
        match axis {
            AxisKind::X => self.width,
            AxisKind::Y => self.height,
            AxisKind::Channel => self.channels,
            AxisKind::Z => self.slices,
            AxisKind::Time => self.frames,
        }
    }

    pub fn to_array(&self) -> [usize; 5] {
        AxisKind::ALL.map(|axis| self.size(axis))
    }

    pub(crate) fn with_size(mut self, axis: AxisKind, size: usize) -> Self {
        match axis {
            AxisKind::X => self.width = size,
            AxisKind::Y => self.height = size,
            AxisKind::Channel => self.channels = size,
            AxisKind::Z => self.slices = size,
            AxisKind::Time => self.frames = size,
        }
        self
    }

    /// Number of samples in one plane.
    pub fn plane_len(&self) -> usize {
        self.width * self.height
    }

    /// Number of planes in the flat stack.
    pub fn plane_count(&self) -> usize {
        self.channels * self.slices * self.frames
    }

    pub fn validate(&self, position: &Position) -> Result<()> {
        for axis in AxisKind::ALL {
            check_axis(axis, position.get(axis), self.size(axis))?;
        }
        Ok(())
    }

    /// Flat stack index of the plane holding `position`.
    pub fn flat_index(&self, position: &Position) -> Result<usize> {
        self.validate(position)?;
        Ok(self.plane_offset(position.channel, position.slice, position.frame))
    }

    /// Flat stack index for `(channel, slice, frame)`, ignoring x and y.
    pub fn plane_index(&self, channel: usize, slice: usize, frame: usize) -> Result<usize> {
        check_axis(AxisKind::Channel, channel, self.channels)?;
        check_axis(AxisKind::Z, slice, self.slices)?;
        check_axis(AxisKind::Time, frame, self.frames)?;
        Ok(self.plane_offset(channel, slice, frame))
    }

    /// Inverse of [`Dimensions::plane_index`]; x and y of the result are zero.
    pub fn position_of(&self, index: usize) -> Result<Position> {
        let count = self.plane_count();
        if index >= count {
            return Err(CoreError::PlaneOutOfRange { index, count });
        }
        let channel = index % self.channels;
        let slice = (index / self.channels) % self.slices;
        let frame = index / (self.channels * self.slices);
        Ok(Position::plane(channel, slice, frame))
    }

    /// All plane origins in flat stack order.
    pub fn planes(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.plane_count()).map(|index| {
            let channel = index % self.channels;
            let slice = (index / self.channels) % self.slices;
            let frame = index / (self.channels * self.slices);
            Position::plane(channel, slice, frame)
        })
    }

    fn plane_offset(&self, channel: usize, slice: usize, frame: usize) -> usize {
        channel + slice * self.channels + frame * self.channels * self.slices
    }
}

fn check_axis(axis: AxisKind, index: usize, size: usize) -> Result<()> {
    if index >= size {
        return Err(CoreError::OutOfRange { axis, index, size });
    }
    Ok(())
}
