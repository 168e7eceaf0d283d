//! ImageJ "extra metadata" container stored in two private TIFF tags.
//!
//! The counts tag holds byte lengths: entry 0 is the header length, each
//! following entry the length of one record body. The data tag holds the
//! header followed by the bodies. The header is the magic `"IJIJ"` and one
//! `(type, count)` pair per record, in the byte order of the TIFF file that
//! carries it. Record bodies stay big-endian.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::MetadataDecodeError;
use super::records::RawRecord;

pub const META_DATA_COUNTS_TAG: u16 = 50838;
pub const META_DATA_TAG: u16 = 50839;

const MAGIC: u32 = 0x494a_494a;

/// Packs records into the `(counts, data)` pair written to the two tags, with
/// the header in byte order `B`.
pub fn pack<B: ByteOrder>(records: &[RawRecord]) -> (Vec<u32>, Vec<u8>) {
    let header_len = 4 + 8 * records.len();
    let body_len: usize = records.iter().map(|record| record.body.len()).sum();
    let mut data = vec![0u8; header_len];
    B::write_u32(&mut data[0..4], MAGIC);
    for (index, record) in records.iter().enumerate() {
        let offset = 4 + index * 8;
        B::write_u32(&mut data[offset..offset + 4], record.tag);
        B::write_u32(&mut data[offset + 4..offset + 8], 1);
    }
    data.reserve(body_len);
    let mut counts = Vec::with_capacity(records.len() + 1);
    counts.push(header_len as u32);
    for record in records {
        counts.push(record.body.len() as u32);
        data.extend_from_slice(&record.body);
    }
    (counts, data)
}

/// Splits the tag pair back into records. A header in either byte order is accepted.
pub fn unpack(counts: &[u32], data: &[u8]) -> Result<Vec<RawRecord>, MetadataDecodeError> {
    let Some((&header_len, body_lens)) = counts.split_first() else {
        return Err(MetadataDecodeError::MalformedBlock(
            "empty counts table".to_string(),
        ));
    };
    let header_len = header_len as usize;
    if header_len < 4 || header_len > data.len() || (header_len - 4) % 8 != 0 {
        return Err(MetadataDecodeError::MalformedBlock(format!(
            "header length {header_len} does not fit {} data bytes",
            data.len()
        )));
    }
    let header = &data[..header_len];
    let read_u32: fn(&[u8]) -> u32 = if BigEndian::read_u32(header) == MAGIC {
        BigEndian::read_u32
    } else if LittleEndian::read_u32(header) == MAGIC {
        LittleEndian::read_u32
    } else {
        return Err(MetadataDecodeError::MalformedBlock(
            "missing IJIJ magic".to_string(),
        ));
    };

    let mut lens = body_lens.iter().map(|len| *len as usize);
    let mut offset = header_len;
    let mut records = Vec::new();
    for pair in header[4..].chunks_exact(8) {
        let tag = read_u32(&pair[0..4]);
        let count = read_u32(&pair[4..8]);
        for _ in 0..count {
            let Some(len) = lens.next() else {
                return Err(MetadataDecodeError::MalformedBlock(format!(
                    "counts table ends before the bodies of type {tag:#010x}"
                )));
            };
            let end = offset + len;
            if end > data.len() {
                return Err(MetadataDecodeError::MalformedBlock(format!(
                    "body of type {tag:#010x} runs past the data ({end} > {})",
                    data.len()
                )));
            }
            records.push(RawRecord {
                tag,
                body: data[offset..end].to_vec(),
            });
            offset = end;
        }
    }
    Ok(records)
}
