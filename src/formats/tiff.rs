use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use byteorder::LittleEndian;
use tiff::decoder::ifd::Value;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, TiffKind, colortype};
use tiff::tags::Tag;
use tracing::{info, warn};

use crate::model::{Image5D, PixelBuffer, PixelType, Position};

use super::description::Description;
use super::ij_block::{self, META_DATA_COUNTS_TAG, META_DATA_TAG};
use super::records::{self, MetadataSummary};
use super::{IoError, Result};

/// Writes all planes in flat order, with the property description and the
/// channel records on the first page.
pub(crate) fn write_image5d(path: &Path, image: &Image5D) -> Result<()> {
    let dims = image.dimensions();
    let width = dims.width as u32;
    let height = dims.height as u32;
    let description = Description::for_image(image).format();
    let records = records::encode_channel_metadata(image)?;
    // TiffEncoder always writes little-endian ("II") files.
    let (counts, data) = ij_block::pack::<LittleEndian>(&records);

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;
    for (index, plane) in image.pixel_store().planes().iter().enumerate() {
        let first = index == 0;
        let page = PageTags {
            description: first.then_some(description.as_str()),
            counts: first.then_some(counts.as_slice()),
            data: first.then_some(data.as_slice()),
        };
        match plane {
            PixelBuffer::U8(values) => {
                let mut page_image = encoder.new_image::<colortype::Gray8>(width, height)?;
                page.write(page_image.encoder())?;
                page_image.write_data(values)?;
            }
            PixelBuffer::U16(values) => {
                let mut page_image = encoder.new_image::<colortype::Gray16>(width, height)?;
                page.write(page_image.encoder())?;
                page_image.write_data(values)?;
            }
            PixelBuffer::F32(values) => {
                let mut page_image = encoder.new_image::<colortype::Gray32Float>(width, height)?;
                page.write(page_image.encoder())?;
                page_image.write_data(values)?;
            }
        }
    }
    info!(
        path = %path.display(),
        planes = dims.plane_count(),
        records = records.len(),
        "wrote image5d tiff"
    );
    Ok(())
}

struct PageTags<'a> {
    description: Option<&'a str>,
    counts: Option<&'a [u32]>,
    data: Option<&'a [u8]>,
}

impl PageTags<'_> {
    fn write<W, K>(&self, directory: &mut tiff::encoder::DirectoryEncoder<'_, W, K>) -> Result<()>
    where
        W: std::io::Write + std::io::Seek,
        K: TiffKind,
    {
        if let Some(description) = self.description {
            directory.write_tag(Tag::ImageDescription, description)?;
        }
        if let (Some(counts), Some(data)) = (self.counts, self.data) {
            if counts.len() > 1 {
                directory.write_tag(Tag::Unknown(META_DATA_COUNTS_TAG), counts)?;
                directory.write_tag(Tag::Unknown(META_DATA_TAG), data)?;
            }
        }
        Ok(())
    }
}

/// Reads a multi-page grayscale TIFF as an [`Image5D`].
///
/// Files without hyperstack properties load as a single-channel z-stack.
/// Channels without a persisted color table get the default hue ramp.
pub(crate) fn read_image5d(path: &Path) -> Result<Image5D> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(file)?;
    let (width, height) = decoder.dimensions()?;

    let description = decoder
        .find_tag(Tag::ImageDescription)?
        .map(Value::into_string)
        .transpose()?
        .map(|text| Description::parse(&text))
        .unwrap_or_default();
    let counts = decoder
        .find_tag(Tag::Unknown(META_DATA_COUNTS_TAG))?
        .map(Value::into_u32_vec)
        .transpose()?;
    let data = decoder
        .find_tag(Tag::Unknown(META_DATA_TAG))?
        .and_then(byte_values);

    let mut pixel_type = None;
    let mut planes = Vec::new();
    loop {
        planes.push(decode_page(&mut decoder, &mut pixel_type, width, height)?);
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
        if decoder.dimensions()? != (width, height) {
            return Err(IoError::UnsupportedLayout(
                "TIFF pages must have identical dimensions".into(),
            ));
        }
    }

    let (channels, slices, frames) = description
        .hyperstack_shape(planes.len())
        .unwrap_or_else(|| {
            if description.channels.is_some() || description.frames.is_some() {
                warn!(
                    pages = planes.len(),
                    "hyperstack properties do not match the page count, loading as z-stack"
                );
            }
            (1, planes.len(), 1)
        });

    let mut image = Image5D::from_stack(
        title_from_path(path),
        width as usize,
        height as usize,
        planes,
        channels,
        slices,
        frames,
    )?;
    image.set_spatial_calibration(description.spatial_calibration());

    let summary = match (counts, data) {
        (Some(counts), Some(data)) => match ij_block::unpack(&counts, &data) {
            Ok(raw) => records::apply_channel_metadata(&mut image, &raw)?,
            Err(error) => {
                warn!(%error, "ignoring unreadable extra metadata block");
                MetadataSummary::default()
            }
        },
        _ => MetadataSummary::default(),
    };
    image.assign_default_color_tables(&summary.has_color_table)?;
    image.set_position(Position::default())?;
    info!(
        path = %path.display(),
        channels,
        slices,
        frames,
        applied = summary.applied,
        skipped = summary.skipped.len(),
        image5d = description.is_image5d(),
        "read tiff"
    );
    Ok(image)
}

pub(super) fn byte_values(value: Value) -> Option<Vec<u8>> {
    match value {
        Value::Byte(byte) => Some(vec![byte]),
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Byte(byte) => Some(byte),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

fn decode_page(
    decoder: &mut Decoder<File>,
    pixel_type: &mut Option<PixelType>,
    width: u32,
    height: u32,
) -> Result<PixelBuffer> {
    let buffer = match decoder.read_image()? {
        DecodingResult::U8(values) => PixelBuffer::U8(values),
        DecodingResult::U16(values) => PixelBuffer::U16(values),
        DecodingResult::F32(values) => PixelBuffer::F32(values),
        other => {
            return Err(IoError::UnsupportedLayout(format!(
                "unsupported TIFF sample type: {other:?}"
            )));
        }
    };
    if buffer.len() != width as usize * height as usize {
        return Err(IoError::UnsupportedLayout(
            "TIFF RGB/alpha pages are not supported".into(),
        ));
    }
    match pixel_type {
        Some(expected) if *expected != buffer.pixel_type() => {
            return Err(IoError::UnsupportedLayout(format!(
                "TIFF pages mix {expected} and {} samples",
                buffer.pixel_type()
            )));
        }
        _ => *pixel_type = Some(buffer.pixel_type()),
    }
    Ok(buffer)
}

/// File name without a `.tif` or `.tiff` suffix.
pub(crate) fn title_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = name.to_ascii_lowercase();
    for suffix in [".tiff", ".tif"] {
        if lower.ends_with(suffix) {
            return name[..name.len() - suffix.len()].to_string();
        }
    }
    name
}
