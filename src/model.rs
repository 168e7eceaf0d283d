mod axis;
mod calibration;
mod channels;
mod display;
mod error;
mod image5d;
mod lock;
mod pixels;
mod position;


pub use axis::{AxisKind, PixelType};
pub use calibration::{CalibrationFunction, ChannelCalibration, SpatialCalibration};
pub use channels::{ChannelInit, ChannelStore};
pub use display::{
    ChannelDisplayProperties, ColorTable, LUT_SIZE, LutUpdateMode, NO_THRESHOLD,
};
pub use error::{CoreError, Result};
pub use image5d::{BlankFill, Image5D, Is5D, PositionState, TransferOptions};
pub use lock::BusyLock;
pub use pixels::{PixelBuffer, PixelStore};
pub use position::{Dimensions, Position};
