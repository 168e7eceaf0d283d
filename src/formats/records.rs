//! Tagged per-channel metadata records.
//!
//! Every record body starts with a big-endian `i32` sub-type and a 1-based
//! `i32` channel number, followed by a payload whose layout depends on the tag.
//! Channel numbers are converted to the crate's zero-based indices here and
//! nowhere else.

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, warn};

use crate::model::{
    CalibrationFunction, ColorTable, CoreError, Image5D, LUT_SIZE, LutUpdateMode,
};

use super::MetadataDecodeError;

/// `"LUT"`: 256 red, 256 green and 256 blue bytes.
pub const TAG_COLOR_TABLE: u32 = 0x004c_5554;
/// `"C&B"`: display minimum and maximum as `f64`.
pub const TAG_CONTRAST_WINDOW: u32 = 0x0043_2642;
/// `"THR"`: threshold minimum, maximum and LUT update mode.
pub const TAG_THRESHOLD: u32 = 0x0054_4852;
/// `"GRA"`: displayed-as-gray flag.
pub const TAG_GRAY: u32 = 0x0047_5241;
/// `"OVL"`: displayed-in-overlay flag.
pub const TAG_OVERLAY: u32 = 0x004f_564c;
/// `"LBL"`: channel label, the rest of the body.
pub const TAG_LABEL: u32 = 0x004c_424c;
/// `"CAL"`: calibration function.
pub const TAG_CALIBRATION: u32 = 0x0043_414c;

const SUBTYPE_BASIC: i32 = 1;
/// Calibration records whose unit string carries its own length. Readers
/// that only know sub-type 1 (unit = rest of the body), such as the Image5D
/// plugin for ImageJ/Fiji, skip these records and lose the calibration.
const SUBTYPE_PREFIXED_UNIT: i32 = 2;
const HEADER_LEN: usize = 8;

/// One record as carried by the container: tag plus body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub tag: u32,
    pub body: Vec<u8>,
}

/// Decoded record. `channel` is zero-based.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelRecord {
    ColorTable {
        channel: usize,
        table: ColorTable,
    },
    ContrastWindow {
        channel: usize,
        min: f64,
        max: f64,
    },
    Threshold {
        channel: usize,
        min: f64,
        max: f64,
        mode: LutUpdateMode,
    },
    DisplayedGray {
        channel: usize,
        value: bool,
    },
    DisplayedInOverlay {
        channel: usize,
        value: bool,
    },
    Label {
        channel: usize,
        label: String,
    },
    Calibration {
        channel: usize,
        function: CalibrationFunction,
        coefficients: Vec<f64>,
        zero_clip: bool,
        unit: String,
    },
}

impl ChannelRecord {
    pub fn channel(&self) -> usize {
        match self {
            ChannelRecord::ColorTable { channel, .. }
            | ChannelRecord::ContrastWindow { channel, .. }
            | ChannelRecord::Threshold { channel, .. }
            | ChannelRecord::DisplayedGray { channel, .. }
            | ChannelRecord::DisplayedInOverlay { channel, .. }
            | ChannelRecord::Label { channel, .. }
            | ChannelRecord::Calibration { channel, .. } => *channel,
        }
    }

    pub fn tag(&self) -> u32 {
        match self {
            ChannelRecord::ColorTable { .. } => TAG_COLOR_TABLE,
            ChannelRecord::ContrastWindow { .. } => TAG_CONTRAST_WINDOW,
            ChannelRecord::Threshold { .. } => TAG_THRESHOLD,
            ChannelRecord::DisplayedGray { .. } => TAG_GRAY,
            ChannelRecord::DisplayedInOverlay { .. } => TAG_OVERLAY,
            ChannelRecord::Label { .. } => TAG_LABEL,
            ChannelRecord::Calibration { .. } => TAG_CALIBRATION,
        }
    }
}

struct BodyWriter {
    bytes: Vec<u8>,
}

impl BodyWriter {
    fn new(subtype: i32, channel: usize) -> Self {
        let mut writer = Self { bytes: Vec::new() };
        writer.put_i32(subtype);
        writer.put_i32(channel as i32 + 1);
        writer
    }

    fn put_i32(&mut self, value: i32) {
        let mut buffer = [0u8; 4];
        BigEndian::write_i32(&mut buffer, value);
        self.bytes.extend_from_slice(&buffer);
    }

    fn put_f64(&mut self, value: f64) {
        let mut buffer = [0u8; 8];
        BigEndian::write_f64(&mut buffer, value);
        self.bytes.extend_from_slice(&buffer);
    }

    fn put_bool(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    fn put_bytes(&mut self, value: &[u8]) {
        self.bytes.extend_from_slice(value);
    }
}

pub fn encode_record(record: &ChannelRecord) -> RawRecord {
    let subtype = match record {
        ChannelRecord::Calibration { .. } => SUBTYPE_PREFIXED_UNIT,
        _ => SUBTYPE_BASIC,
    };
    let mut writer = BodyWriter::new(subtype, record.channel());
    match record {
        ChannelRecord::ColorTable { table, .. } => {
            writer.put_bytes(table.red());
            writer.put_bytes(table.green());
            writer.put_bytes(table.blue());
        }
        ChannelRecord::ContrastWindow { min, max, .. } => {
            writer.put_f64(*min);
            writer.put_f64(*max);
        }
        ChannelRecord::Threshold { min, max, mode, .. } => {
            writer.put_f64(*min);
            writer.put_f64(*max);
            writer.put_i32(mode.code());
        }
        ChannelRecord::DisplayedGray { value, .. }
        | ChannelRecord::DisplayedInOverlay { value, .. } => writer.put_bool(*value),
        ChannelRecord::Label { label, .. } => writer.put_bytes(label.as_bytes()),
        ChannelRecord::Calibration {
            function,
            coefficients,
            zero_clip,
            unit,
            ..
        } => {
            writer.put_i32(function.code());
            writer.put_i32(coefficients.len() as i32);
            for coefficient in coefficients {
                writer.put_f64(*coefficient);
            }
            writer.put_bool(*zero_clip);
            writer.put_i32(unit.len() as i32);
            writer.put_bytes(unit.as_bytes());
        }
    }
    RawRecord {
        tag: record.tag(),
        body: writer.bytes,
    }
}

struct BodyReader<'a> {
    tag: u32,
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> BodyReader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], MetadataDecodeError> {
        let end = self.offset + len;
        if end > self.bytes.len() {
            return Err(MetadataDecodeError::Truncated {
                tag: self.tag,
                expected: end,
                actual: self.bytes.len(),
            });
        }
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn i32(&mut self) -> Result<i32, MetadataDecodeError> {
        self.take(4).map(BigEndian::read_i32)
    }

    fn f64(&mut self) -> Result<f64, MetadataDecodeError> {
        self.take(8).map(BigEndian::read_f64)
    }

    fn bool(&mut self) -> Result<bool, MetadataDecodeError> {
        self.take(1).map(|bytes| bytes[0] != 0)
    }

    fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.offset..];
        self.offset = self.bytes.len();
        slice
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn expect_len(&self, payload: usize) -> Result<(), MetadataDecodeError> {
        let expected = HEADER_LEN + payload;
        if self.bytes.len() != expected {
            return Err(MetadataDecodeError::LengthMismatch {
                tag: self.tag,
                expected,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    fn finish(&self) -> Result<(), MetadataDecodeError> {
        if self.remaining() != 0 {
            return Err(MetadataDecodeError::LengthMismatch {
                tag: self.tag,
                expected: self.offset,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }
}

fn is_known_tag(tag: u32) -> bool {
    matches!(
        tag,
        TAG_COLOR_TABLE
            | TAG_CONTRAST_WINDOW
            | TAG_THRESHOLD
            | TAG_GRAY
            | TAG_OVERLAY
            | TAG_LABEL
            | TAG_CALIBRATION
    )
}

/// Decodes one record of an image with `channels` channels.
///
/// Unknown tags and sub-types yield `Ok(None)`.
pub fn decode_record(
    raw: &RawRecord,
    channels: usize,
) -> Result<Option<ChannelRecord>, MetadataDecodeError> {
    if !is_known_tag(raw.tag) {
        return Ok(None);
    }
    let mut reader = BodyReader {
        tag: raw.tag,
        bytes: &raw.body,
        offset: 0,
    };
    let subtype = reader.i32()?;
    let number = reader.i32()?;
    let known_subtype = subtype == SUBTYPE_BASIC
        || (raw.tag == TAG_CALIBRATION && subtype == SUBTYPE_PREFIXED_UNIT);
    if !known_subtype {
        debug!(tag = raw.tag, subtype, "skipping record with unknown sub-type");
        return Ok(None);
    }
    if number < 1 || number as usize > channels {
        return Err(MetadataDecodeError::ChannelOutOfRange {
            tag: raw.tag,
            channel: number,
            channels,
        });
    }
    let channel = number as usize - 1;

    let record = match raw.tag {
        TAG_COLOR_TABLE => {
            reader.expect_len(3 * LUT_SIZE)?;
            let red = reader.take(LUT_SIZE)?.to_vec();
            let green = reader.take(LUT_SIZE)?.to_vec();
            let blue = reader.take(LUT_SIZE)?.to_vec();
            let table = ColorTable::from_rgb(red, green, blue).map_err(|error| {
                MetadataDecodeError::InvalidValue {
                    tag: raw.tag,
                    reason: error.to_string(),
                }
            })?;
            ChannelRecord::ColorTable { channel, table }
        }
        TAG_CONTRAST_WINDOW => {
            reader.expect_len(16)?;
            ChannelRecord::ContrastWindow {
                channel,
                min: reader.f64()?,
                max: reader.f64()?,
            }
        }
        TAG_THRESHOLD => {
            reader.expect_len(20)?;
            ChannelRecord::Threshold {
                channel,
                min: reader.f64()?,
                max: reader.f64()?,
                mode: LutUpdateMode::from_code(reader.i32()?),
            }
        }
        TAG_GRAY => {
            reader.expect_len(1)?;
            ChannelRecord::DisplayedGray {
                channel,
                value: reader.bool()?,
            }
        }
        TAG_OVERLAY => {
            reader.expect_len(1)?;
            ChannelRecord::DisplayedInOverlay {
                channel,
                value: reader.bool()?,
            }
        }
        TAG_LABEL => ChannelRecord::Label {
            channel,
            label: String::from_utf8_lossy(reader.rest()).into_owned(),
        },
        _ => decode_calibration(&mut reader, subtype, channel)?,
    };
    Ok(Some(record))
}

fn decode_calibration(
    reader: &mut BodyReader<'_>,
    subtype: i32,
    channel: usize,
) -> Result<ChannelRecord, MetadataDecodeError> {
    let function = CalibrationFunction::from_code(reader.i32()?);
    let count = reader.i32()?;
    if count < 0 || count as usize > reader.remaining() / 8 {
        return Err(MetadataDecodeError::InvalidValue {
            tag: reader.tag,
            reason: format!("coefficient count {count} does not fit the record"),
        });
    }
    let coefficients = (0..count)
        .map(|_| reader.f64())
        .collect::<Result<Vec<_>, _>>()?;
    let zero_clip = reader.bool()?;
    let unit_bytes = if subtype == SUBTYPE_PREFIXED_UNIT {
        let len = reader.i32()?;
        if len < 0 {
            return Err(MetadataDecodeError::InvalidValue {
                tag: reader.tag,
                reason: format!("negative unit length {len}"),
            });
        }
        let bytes = reader.take(len as usize)?;
        reader.finish()?;
        bytes
    } else {
        reader.rest()
    };
    Ok(ChannelRecord::Calibration {
        channel,
        function,
        coefficients,
        zero_clip,
        unit: String::from_utf8_lossy(unit_bytes).into_owned(),
    })
}

/// Records describing every channel of `image`, including uncommitted live edits.
pub fn encode_channel_metadata(image: &Image5D) -> Result<Vec<RawRecord>, CoreError> {
    let mut records = Vec::new();
    for channel in 0..image.n_channels() {
        let display = image.channel_display_properties(channel)?;
        let calibration = image.channel_calibration(channel)?;
        let mut channel_records = vec![
            ChannelRecord::ColorTable {
                channel,
                table: display.color_table,
            },
            ChannelRecord::ContrastWindow {
                channel,
                min: display.min_value,
                max: display.max_value,
            },
            ChannelRecord::Threshold {
                channel,
                min: display.min_threshold,
                max: display.max_threshold,
                mode: display.lut_update_mode,
            },
            ChannelRecord::DisplayedGray {
                channel,
                value: display.displayed_gray,
            },
            ChannelRecord::DisplayedInOverlay {
                channel,
                value: display.displayed_in_overlay,
            },
        ];
        if !calibration.label().is_empty() {
            channel_records.push(ChannelRecord::Label {
                channel,
                label: calibration.label().to_string(),
            });
        }
        if calibration.is_calibrated() {
            channel_records.push(ChannelRecord::Calibration {
                channel,
                function: calibration.function(),
                coefficients: calibration.coefficients().to_vec(),
                zero_clip: calibration.is_zero_clip(),
                unit: calibration.value_unit().to_string(),
            });
        }
        records.extend(channel_records.iter().map(encode_record));
    }
    Ok(records)
}

/// Outcome of applying persisted records to an image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataSummary {
    pub applied: usize,
    pub unknown: usize,
    pub skipped: Vec<MetadataDecodeError>,
    pub has_color_table: Vec<bool>,
}

/// Decodes `records` and writes them into the channel records of `image`.
///
/// Malformed records are logged and skipped; the rest still apply.
pub fn apply_channel_metadata(
    image: &mut Image5D,
    records: &[RawRecord],
) -> Result<MetadataSummary, CoreError> {
    let channels = image.n_channels();
    let mut summary = MetadataSummary {
        has_color_table: vec![false; channels],
        ..MetadataSummary::default()
    };
    let mut calibrations = (0..channels)
        .map(|channel| image.channel_calibration(channel).cloned())
        .collect::<Result<Vec<_>, _>>()?;
    let mut display = (0..channels)
        .map(|channel| image.channel_display_properties(channel))
        .collect::<Result<Vec<_>, _>>()?;

    for (index, raw) in records.iter().enumerate() {
        let record = match decode_record(raw, channels) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(index, tag = raw.tag, "skipping unknown metadata record");
                summary.unknown += 1;
                continue;
            }
            Err(error) => {
                warn!(index, %error, "skipping malformed metadata record");
                summary.skipped.push(error);
                continue;
            }
        };
        let channel = record.channel();
        match record {
            ChannelRecord::ColorTable { table, .. } => {
                display[channel].color_table = table;
                summary.has_color_table[channel] = true;
            }
            ChannelRecord::ContrastWindow { min, max, .. } => {
                display[channel].set_display_range(min, max);
            }
            ChannelRecord::Threshold { min, max, mode, .. } => {
                display[channel].min_threshold = min;
                display[channel].max_threshold = max;
                display[channel].lut_update_mode = mode;
            }
            ChannelRecord::DisplayedGray { value, .. } => display[channel].displayed_gray = value,
            ChannelRecord::DisplayedInOverlay { value, .. } => {
                display[channel].displayed_in_overlay = value;
            }
            ChannelRecord::Label { label, .. } => calibrations[channel].set_label(label),
            ChannelRecord::Calibration {
                function,
                coefficients,
                zero_clip,
                unit,
                ..
            } => calibrations[channel].set_function(function, &coefficients, unit, zero_clip),
        }
        summary.applied += 1;
    }

    for channel in 0..channels {
        image.set_channel_calibration(channel, &calibrations[channel])?;
        image.set_channel_display_properties(channel, &display[channel])?;
    }
    Ok(summary)
}
