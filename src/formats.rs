mod api;
mod description;
mod error;
mod ij_block;
mod raster;
mod records;
mod tiff;
mod util;

#[cfg(test)]
mod tests;

pub use api::{read_image, save_snapshot_png, supported_formats, write_image};
pub use description::{Description, IMAGE5D_VERSION, IMAGEJ_VERSION};
pub use error::{IoError, MetadataDecodeError, Result};
pub use ij_block::{
    META_DATA_COUNTS_TAG, META_DATA_TAG, pack as pack_metadata_block,
    unpack as unpack_metadata_block,
};
pub use records::{
    ChannelRecord, MetadataSummary, RawRecord, TAG_CALIBRATION, TAG_COLOR_TABLE,
    TAG_CONTRAST_WINDOW, TAG_GRAY, TAG_LABEL, TAG_OVERLAY, TAG_THRESHOLD, apply_channel_metadata,
    decode_record, encode_channel_metadata, encode_record,
};
