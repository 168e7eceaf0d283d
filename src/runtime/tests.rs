use tempfile::tempdir;

use super::{AppContext, AppError};
use crate::model::{AxisKind, BlankFill, CoreError, PixelType, Position};
use crate::render::SnapshotMode;

#[test]
fn create_expand_and_reload() {
    let app = AppContext::new();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("stack.tif");

    let mut image = app
        .image_service()
        .create("stack", PixelType::U8, [8, 6, 2, 1, 1], BlankFill::White)
        .expect("create");
    assert_eq!(image.current_position(), Some(Position::default()));
    assert_ne!(
        image.channel_display_properties(0).expect("display").color_table,
        image.channel_display_properties(1).expect("display").color_table
    );

    app.image_service()
        .expand(
            &mut image,
            &[(AxisKind::Channel, 3), (AxisKind::Time, 2)],
            false,
        )
        .expect("expand");
    app.io_service().write(&path, &image).expect("write");

    let restored = app.io_service().read(&path).expect("read");
    assert_eq!(restored.dimensions().to_array(), [8, 6, 3, 1, 2]);
    assert_eq!(restored.plane(0, 0, 0).expect("plane").get(0), Some(255.0));
    assert_eq!(restored.plane(2, 0, 1).expect("plane").get(0), Some(0.0));
}

#[test]
fn shrinking_is_reported_as_an_image_error() {
    let app = AppContext::new();
    let mut image = app
        .image_service()
        .create("small", PixelType::U16, [2, 2, 2, 1, 1], BlankFill::Black)
        .expect("create");
    let error = app
        .image_service()
        .expand(&mut image, &[(AxisKind::Channel, 1)], false)
        .expect_err("cannot shrink");
    assert!(matches!(
        error,
        AppError::Image(CoreError::InvalidExpansion { .. })
    ));
}

#[test]
fn snapshot_writes_png_and_preset_export_reloads() {
    let app = AppContext::new();
    let dir = tempdir().expect("tempdir");
    let image = app
        .image_service()
        .create("snap", PixelType::U8, [4, 4, 2, 1, 1], BlankFill::Value(128.0))
        .expect("create");

    let png = dir.path().join("overlay.png");
    app.io_service()
        .snapshot(&png, &image, SnapshotMode::Overlay, 0, 0)
        .expect("snapshot");
    assert!(png.exists());

    let preset_path = dir.path().join("channels.yaml");
    let exported = app
        .preset_service()
        .export(&preset_path, &image)
        .expect("export");
    assert_eq!(
        app.preset_service().load(&preset_path).expect("load"),
        exported
    );
}
