use super::{SnapshotMode, render_channel, render_overlay, render_snapshot, window_index};
use crate::model::{ColorTable, Image5D, Is5D, PixelBuffer};

fn two_color_image() -> Image5D {
    let planes = vec![
        PixelBuffer::U8(vec![0, 255]),
        PixelBuffer::U8(vec![255, 255]),
    ];
    let mut image = Image5D::from_stack("render", 2, 1, planes, 2, 1, 1).expect("image");
    image
        .set_channel_color_table(0, ColorTable::from_color([255, 0, 0]))
        .expect("red");
    image
        .set_channel_color_table(1, ColorTable::from_color([0, 0, 255]))
        .expect("blue");
    image
}

#[test]
fn window_maps_the_display_range_onto_the_table() {
    assert_eq!(window_index(10.0, 10.0, 20.0), 0);
    assert_eq!(window_index(20.0, 10.0, 20.0), 255);
    assert_eq!(window_index(15.0, 10.0, 20.0), 128);
    assert_eq!(window_index(-5.0, 10.0, 20.0), 0);
    assert_eq!(window_index(99.0, 10.0, 20.0), 255);
    assert_eq!(window_index(5.0, 5.0, 5.0), 255);
}

#[test]
fn channel_uses_its_color_table_or_gray() {
    let mut image = two_color_image();
    let red = render_channel(&image, 0, 0, 0).expect("render");
    assert_eq!(red.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(red.get_pixel(1, 0).0, [255, 0, 0]);

    let mut display = image.channel_display_properties(0).expect("display");
    display.displayed_gray = true;
    image
        .set_channel_display_properties(0, &display)
        .expect("set display");
    let gray = render_channel(&image, 0, 0, 0).expect("render");
    assert_eq!(gray.get_pixel(1, 0).0, [255, 255, 255]);
}

#[test]
fn overlay_adds_only_flagged_channels() {
    let mut image = two_color_image();
    let blended = render_overlay(&image, 0, 0).expect("overlay");
    assert_eq!(blended.get_pixel(0, 0).0, [0, 0, 255]);
    assert_eq!(blended.get_pixel(1, 0).0, [255, 0, 255]);

    let mut display = image.channel_display_properties(1).expect("display");
    display.displayed_in_overlay = false;
    image
        .set_channel_display_properties(1, &display)
        .expect("set display");
    let red_only = render_snapshot(&image, SnapshotMode::Overlay, 0, 0).expect("overlay");
    assert_eq!(red_only.get_pixel(1, 0).0, [255, 0, 0]);
}

#[test]
fn rendering_an_absent_channel_fails() {
    let image = two_color_image();
    assert!(render_snapshot(&image, SnapshotMode::Channel(2), 0, 0).is_err());
}

#[test]
fn snapshots_are_not_five_dimensional() {
    let image = two_color_image();
    let snapshot = render_overlay(&image, 0, 0).expect("overlay");
    assert!(!snapshot.is_5d());
    assert!(image.is_5d());
}
