use std::fs::File;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use image::{ImageBuffer, Rgb, RgbImage};
use tempfile::tempdir;
use tiff::decoder::Decoder;
use tiff::encoder::{TiffEncoder, colortype};
use tiff::tags::Tag;

use super::{
    ChannelRecord, Description, IoError, META_DATA_TAG, MetadataDecodeError, RawRecord,
    TAG_COLOR_TABLE, TAG_CONTRAST_WINDOW, apply_channel_metadata, decode_record,
    encode_channel_metadata, encode_record, pack_metadata_block, read_image, save_snapshot_png,
    unpack_metadata_block, write_image,
};
use super::tiff::byte_values;
use crate::model::{
    BlankFill, CalibrationFunction, ColorTable, Dimensions, Image5D, LutUpdateMode, PixelBuffer,
    PixelType, Position, SpatialCalibration,
};

fn two_channel_image() -> Image5D {
    let dims = Dimensions::new(4, 3, 2, 1, 1).expect("dims");
    Image5D::blank("codec", PixelType::U8, dims, BlankFill::Black)
}

fn annotated_image() -> Image5D {
    let mut image = two_channel_image();
    image.set_channel_labels(&["Ch-1"]).expect("labels");
    let mut display = image.channel_display_properties(1).expect("display");
    display.set_display_range(10.0, 240.0);
    display.min_threshold = 20.0;
    display.max_threshold = 200.0;
    display.lut_update_mode = LutUpdateMode::OverUnder;
    display.displayed_gray = true;
    display.displayed_in_overlay = true;
    display.color_table = ColorTable::from_color([0, 255, 0]);
    image
        .set_channel_display_properties(1, &display)
        .expect("set display");
    image
        .channel_calibration_mut(0)
        .expect("calibration")
        .set_function(CalibrationFunction::StraightLine, &[1.5, 2.0], "OD", true);
    image
}

#[test]
fn channel_metadata_survives_encode_and_apply() {
    let source = annotated_image();
    let records = encode_channel_metadata(&source).expect("encode");
    let mut restored = two_channel_image();
    let summary = apply_channel_metadata(&mut restored, &records).expect("apply");

    assert!(summary.skipped.is_empty());
    assert_eq!(summary.applied, records.len());
    assert_eq!(summary.has_color_table, vec![true, true]);
    assert_eq!(restored.channel_calibration(0).expect("cal").label(), "Ch-1");
    assert_eq!(restored.channel_calibration(1).expect("cal").label(), "");
    for channel in 0..2 {
        assert_eq!(
            restored.channel_display_properties(channel).expect("display"),
            source.channel_display_properties(channel).expect("display")
        );
    }
    let calibration = restored.channel_calibration(0).expect("cal");
    assert_eq!(calibration.function(), CalibrationFunction::StraightLine);
    assert_eq!(calibration.coefficients(), &[1.5, 2.0]);
    assert_eq!(calibration.value_unit(), "OD");
    assert!(calibration.is_zero_clip());
    assert!(!restored.channel_calibration(1).expect("cal").is_calibrated());
}

#[test]
fn record_bodies_use_one_based_big_endian_channels() {
    let raw = encode_record(&ChannelRecord::ContrastWindow {
        channel: 1,
        min: 10.0,
        max: 240.0,
    });
    assert_eq!(raw.tag, TAG_CONTRAST_WINDOW);
    assert_eq!(raw.body.len(), 24);
    assert_eq!(&raw.body[..8], &[0, 0, 0, 1, 0, 0, 0, 2]);
    assert_eq!(&raw.body[8..16], &10.0_f64.to_be_bytes());
}

#[test]
fn unknown_tags_are_skipped_and_the_rest_applies() {
    let mut records = encode_channel_metadata(&annotated_image()).expect("encode");
    records.insert(
        0,
        RawRecord {
            tag: 0x0058_5858,
            body: vec![0, 0, 0, 1, 0, 0, 0, 1, 42],
        },
    );
    let mut restored = two_channel_image();
    let summary = apply_channel_metadata(&mut restored, &records).expect("apply");
    assert_eq!(summary.unknown, 1);
    assert!(summary.skipped.is_empty());
    assert_eq!(restored.channel_calibration(0).expect("cal").label(), "Ch-1");
}

#[test]
fn unknown_subtype_is_ignored() {
    let mut raw = encode_record(&ChannelRecord::DisplayedGray {
        channel: 0,
        value: true,
    });
    raw.body[3] = 9;
    assert_eq!(decode_record(&raw, 2), Ok(None));
}

#[test]
fn malformed_record_is_skipped_without_aborting() {
    let mut records = encode_channel_metadata(&annotated_image()).expect("encode");
    let lut = records
        .iter_mut()
        .find(|record| record.tag == TAG_COLOR_TABLE)
        .expect("lut record");
    lut.body.truncate(100);

    let mut restored = two_channel_image();
    let summary = apply_channel_metadata(&mut restored, &records).expect("apply");
    assert_eq!(summary.skipped.len(), 1);
    assert!(matches!(
        summary.skipped[0],
        MetadataDecodeError::LengthMismatch {
            tag: TAG_COLOR_TABLE,
            actual: 100,
            ..
        }
    ));
    assert_eq!(summary.has_color_table, vec![false, true]);
    assert_eq!(restored.channel_calibration(0).expect("cal").label(), "Ch-1");
}

#[test]
fn out_of_range_channel_is_reported() {
    let raw = encode_record(&ChannelRecord::ContrastWindow {
        channel: 4,
        min: 0.0,
        max: 1.0,
    });
    assert_eq!(
        decode_record(&raw, 2),
        Err(MetadataDecodeError::ChannelOutOfRange {
            tag: TAG_CONTRAST_WINDOW,
            channel: 5,
            channels: 2
        })
    );
}

#[test]
fn calibration_is_written_with_a_length_prefixed_unit() {
    let raw = encode_record(&ChannelRecord::Calibration {
        channel: 0,
        function: CalibrationFunction::StraightLine,
        coefficients: vec![0.5, 3.0],
        zero_clip: true,
        unit: "OD".to_string(),
    });
    assert_eq!(raw.tag, super::TAG_CALIBRATION);
    assert_eq!(&raw.body[..8], &[0, 0, 0, 2, 0, 0, 0, 1]);
    let unit_at = raw.body.len() - 6;
    assert_eq!(&raw.body[unit_at..unit_at + 4], &2_i32.to_be_bytes());
    assert_eq!(&raw.body[unit_at + 4..], b"OD");
}

#[test]
fn calibration_with_trailing_unit_is_read() {
    let mut body = vec![0, 0, 0, 1, 0, 0, 0, 1];
    body.extend_from_slice(&0_i32.to_be_bytes());
    body.extend_from_slice(&2_i32.to_be_bytes());
    body.extend_from_slice(&0.5_f64.to_be_bytes());
    body.extend_from_slice(&3.0_f64.to_be_bytes());
    body.push(0);
    body.extend_from_slice(b"Gray Value");
    let raw = RawRecord {
        tag: super::TAG_CALIBRATION,
        body,
    };
    let record = decode_record(&raw, 1).expect("decode").expect("known");
    assert_eq!(
        record,
        ChannelRecord::Calibration {
            channel: 0,
            function: CalibrationFunction::StraightLine,
            coefficients: vec![0.5, 3.0],
            zero_clip: false,
            unit: "Gray Value".to_string(),
        }
    );
}

#[test]
fn metadata_block_round_trips_in_both_byte_orders() {
    let records = encode_channel_metadata(&annotated_image()).expect("encode");
    let (counts, data) = pack_metadata_block::<BigEndian>(&records);
    assert_eq!(counts.len(), records.len() + 1);
    assert_eq!(&data[..4], b"IJIJ");
    assert_eq!(
        unpack_metadata_block(&counts, &data).expect("unpack"),
        records
    );

    let (little_counts, little) = pack_metadata_block::<LittleEndian>(&records);
    assert_eq!(little_counts, counts);
    assert_eq!(&little[..4], b"JIJI");
    assert_eq!(&little[counts[0] as usize..], &data[counts[0] as usize..]);
    assert_eq!(
        unpack_metadata_block(&counts, &little).expect("unpack little endian"),
        records
    );

    let mut broken = data;
    broken[0] = b'X';
    assert!(matches!(
        unpack_metadata_block(&counts, &broken),
        Err(MetadataDecodeError::MalformedBlock(_))
    ));
}

#[test]
fn metadata_header_follows_the_tiff_byte_order() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("order.tif");
    let image = annotated_image();
    write_image(&path, &image).expect("write tiff");

    let bytes = std::fs::read(&path).expect("read bytes");
    assert_eq!(&bytes[..2], b"II");
    let mut decoder = Decoder::new(File::open(&path).expect("open")).expect("decoder");
    let data = decoder
        .find_tag(Tag::Unknown(META_DATA_TAG))
        .expect("find tag")
        .and_then(byte_values)
        .expect("metadata bytes");
    assert_eq!(LittleEndian::read_u32(&data[..4]), 0x494a_494a);
    let records = encode_channel_metadata(&image).expect("encode");
    assert_eq!(LittleEndian::read_u32(&data[4..8]), records[0].tag);
    assert_eq!(LittleEndian::read_u32(&data[8..12]), 1);
}

#[test]
fn oversized_hyperstack_counts_fall_back_to_a_z_stack() {
    let description = Description::parse("ImageJ=1.54f\nchannels=9223372036854775809\nslices=2\n");
    assert_eq!(description.hyperstack_shape(2), None);

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("crafted.tif");
    {
        let mut encoder = TiffEncoder::new(File::create(&path).expect("create")).expect("encoder");
        for page in 0..2u8 {
            let mut page_image = encoder
                .new_image::<colortype::Gray8>(2, 2)
                .expect("page");
            page_image
                .encoder()
                .write_tag(
                    Tag::ImageDescription,
                    "ImageJ=1.54f\nchannels=9223372036854775809\nslices=2\n",
                )
                .expect("description");
            page_image.write_data(&[page; 4]).expect("data");
        }
    }
    let image = read_image(&path).expect("read crafted tiff");
    assert_eq!(image.dimensions(), Dimensions::new(2, 2, 1, 2, 1).expect("dims"));
}

#[test]
fn description_properties_round_trip() {
    let mut image = two_channel_image();
    image.set_spatial_calibration(SpatialCalibration {
        pixel_depth: 0.5,
        frame_interval: 2.0,
        unit: "micron".to_string(),
        ..SpatialCalibration::default()
    });
    let text = Description::for_image(&image).format();
    assert!(text.starts_with("ImageJ="));
    assert!(text.contains("channels=2\n"));
    assert!(text.contains("hyperstack=true\n"));

    let parsed = Description::parse(&text);
    assert!(parsed.is_image5d());
    assert_eq!(parsed.hyperstack_shape(2), Some((2, 1, 1)));
    assert_eq!(parsed.hyperstack_shape(3), None);
    assert_eq!(parsed.spatial_calibration(), *image.spatial_calibration());
}

#[test]
fn tiff_round_trip_preserves_pixels_and_channel_metadata() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("round.tif");
    let planes = (0..12)
        .map(|index| PixelBuffer::U16((0..6).map(|offset| index * 100 + offset).collect()))
        .collect();
    let mut image = Image5D::from_stack("round", 3, 2, planes, 2, 3, 2).expect("image");
    image.set_channel_labels(&["DAPI", "GFP"]).expect("labels");
    image
        .set_position(Position::plane(1, 0, 0))
        .expect("position");
    image.live_display_mut().set_display_range(5.0, 900.0);

    write_image(&path, &image).expect("write tiff");
    let restored = read_image(&path).expect("read tiff");

    assert_eq!(restored.title(), "round");
    assert_eq!(restored.dimensions(), image.dimensions());
    assert_eq!(restored.pixel_type(), PixelType::U16);
    assert_eq!(restored.to_stack(), image.to_stack());
    assert_eq!(restored.channel_calibration(1).expect("cal").label(), "GFP");
    let display = restored.channel_display_properties(1).expect("display");
    assert_eq!((display.min_value, display.max_value), (5.0, 900.0));
    assert_eq!(restored.current_position(), Some(Position::default()));
}

#[test]
fn plain_tiff_loads_as_z_stack_with_hue_colors() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("plain.tiff");
    {
        let mut encoder = TiffEncoder::new(File::create(&path).expect("create")).expect("encoder");
        for page in 0..3u8 {
            encoder
                .write_image::<colortype::Gray8>(2, 2, &[page; 4])
                .expect("page");
        }
    }
    let image = read_image(&path).expect("read");
    assert_eq!(image.dimensions(), Dimensions::new(2, 2, 1, 3, 1).expect("dims"));
    assert_eq!(image.pixel(&Position::new(1, 1, 0, 2, 0)).expect("pixel"), 2.0);
    let table = image.channel_display_properties(0).expect("display").color_table;
    assert_eq!(table.end_color(), [255, 0, 0]);
}

#[test]
fn rgb_png_becomes_three_colored_channels() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("color.png");
    let mut buffer = ImageBuffer::<Rgb<u8>, Vec<u8>>::new(2, 1);
    buffer.put_pixel(0, 0, Rgb([255, 0, 0]));
    buffer.put_pixel(1, 0, Rgb([0, 128, 0]));
    buffer.save(&path).expect("save png");

    let image = read_image(&path).expect("read png");
    assert_eq!(image.n_channels(), 3);
    assert_eq!(image.pixel(&Position::new(1, 0, 1, 0, 0)).expect("pixel"), 128.0);
    assert_eq!(image.channel_calibration(2).expect("cal").label(), "Blue");
    let green = image.channel_display_properties(1).expect("display").color_table;
    assert_eq!(green.end_color(), [0, 255, 0]);
}

#[test]
fn image5d_cannot_be_written_as_png() {
    let dir = tempdir().expect("tempdir");
    let error = write_image(dir.path().join("out.png"), &two_channel_image())
        .expect_err("png cannot hold five dimensions");
    assert!(matches!(error, IoError::UnsupportedFormat(ref ext) if ext == "png"));

    let snapshot = RgbImage::new(2, 2);
    save_snapshot_png(dir.path().join("snap.png"), &snapshot).expect("snapshot");
    assert!(save_snapshot_png(dir.path().join("snap.bmp"), &snapshot).is_err());
}
