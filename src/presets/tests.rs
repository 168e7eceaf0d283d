use tempfile::tempdir;

use super::{
    CalibrationPreset, ChannelPreset, ChannelPresetSet, PresetError, apply_presets, load_presets,
    save_presets,
};
use crate::model::{
    BlankFill, CalibrationFunction, CoreError, Dimensions, Image5D, PixelType, Position,
};

fn image(channels: usize) -> Image5D {
    let dims = Dimensions::new(2, 2, channels, 1, 1).expect("dims");
    Image5D::blank("presets", PixelType::U8, dims, BlankFill::Black)
}

fn green_preset() -> ChannelPresetSet {
    ChannelPresetSet {
        name: Some("gfp".to_string()),
        channels: vec![ChannelPreset {
            channel: 1,
            label: Some("GFP".to_string()),
            color: Some([0, 255, 0]),
            display_range: Some([12.0, 200.0]),
            calibration: Some(CalibrationPreset {
                function: CalibrationFunction::StraightLine,
                coefficients: vec![0.0, 2.0],
                unit: "photons".to_string(),
                zero_clip: false,
            }),
            ..ChannelPreset::default()
        }],
    }
}

#[test]
fn presets_apply_to_named_channels_and_release_the_lock() {
    let mut target = image(2);
    let report = apply_presets(&mut target, &green_preset()).expect("apply");
    assert_eq!(report.channels, vec![1]);
    assert!(!target.is_locked());

    let display = target.channel_display_properties(1).expect("display");
    assert_eq!(display.color_table.end_color(), [0, 255, 0]);
    assert_eq!((display.min_value, display.max_value), (12.0, 200.0));
    let calibration = target.channel_calibration(1).expect("calibration");
    assert_eq!(calibration.label(), "GFP");
    assert_eq!(calibration.apply(10.0), 20.0);
    assert_eq!(target.channel_calibration(0).expect("calibration").label(), "");
}

#[test]
fn presets_reach_the_live_channel() {
    let mut target = image(2);
    target
        .set_position(Position::plane(1, 0, 0))
        .expect("position");
    apply_presets(&mut target, &green_preset()).expect("apply");
    assert_eq!(target.live_display().min_value, 12.0);
}

#[test]
fn missing_channel_fails_before_any_change() {
    let mut target = image(1);
    let error = apply_presets(&mut target, &green_preset()).expect_err("channel 1 of 1");
    assert!(matches!(
        error,
        PresetError::Core(CoreError::OutOfRange { index: 1, size: 1, .. })
    ));
    assert_eq!(target.channel_calibration(0).expect("calibration").label(), "");
}

#[test]
fn busy_image_rejects_presets() {
    let mut target = image(2);
    assert!(target.try_lock("other tool"));
    let error = apply_presets(&mut target, &green_preset()).expect_err("busy");
    assert!(matches!(error, PresetError::Core(CoreError::ResourceBusy { .. })));
    assert!(target.unlock("other tool"));
}

#[test]
fn invalid_presets_are_rejected() {
    let mut duplicate = green_preset();
    duplicate.channels.push(duplicate.channels[0].clone());
    assert!(matches!(duplicate.validate(), Err(PresetError::Parse(_))));

    let mut inverted = green_preset();
    inverted.channels[0].display_range = Some([5.0, 1.0]);
    assert!(inverted.validate().is_err());

    let mut short = green_preset();
    if let Some(calibration) = short.channels[0].calibration.as_mut() {
        calibration.coefficients.truncate(1);
    }
    assert!(short.validate().is_err());

    assert!(ChannelPresetSet::default().validate().is_err());
}

#[test]
fn presets_round_trip_through_json_and_yaml() {
    let mut source = image(2);
    apply_presets(&mut source, &green_preset()).expect("apply");
    let exported = ChannelPresetSet::from_image(&source).expect("export");
    assert_eq!(exported.channels.len(), 2);

    let dir = tempdir().expect("tempdir");
    for name in ["presets.json", "presets.yaml"] {
        let path = dir.path().join(name);
        save_presets(&path, &exported).expect("save");
        assert_eq!(load_presets(&path).expect("load"), exported);
    }

    let mut target = image(2);
    apply_presets(&mut target, &exported).expect("apply exported");
    for channel in 0..2 {
        assert_eq!(
            target.channel_display_properties(channel).expect("display"),
            source.channel_display_properties(channel).expect("display")
        );
    }
}
