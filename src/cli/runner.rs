use clap::Parser;
use serde::Serialize;
use serde_json::json;

use crate::model::{AxisKind, Image5D};
use crate::render::SnapshotMode;
use crate::runtime::AppContext;

use super::logging::init_logging;
use super::types::{ChannelInfo, Cli, Commands, ImageInfo, PresetCommand};

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    let app = AppContext::new();

    match cli.command {
        Commands::Info { input } => {
            let image = app
                .io_service()
                .read(&input)
                .map_err(|error| error.to_string())?;
            print_json(&image_info(&image)?)?;
        }
        Commands::Create {
            output,
            width,
            height,
            channels,
            slices,
            frames,
            pixel_type,
            fill,
        } => {
            let title = output
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Image5D".to_string());
            let image = app
                .image_service()
                .create(
                    &title,
                    pixel_type.into(),
                    [width, height, channels, slices, frames],
                    fill,
                )
                .map_err(|error| error.to_string())?;
            app.io_service()
                .write(&output, &image)
                .map_err(|error| error.to_string())?;
            print_json(&json!({
                "status": "ok",
                "output": output,
                "dimensions": image.dimensions()
            }))?;
        }
        Commands::Expand {
            input,
            output,
            channels,
            slices,
            frames,
            copy_current,
        } => {
            let mut image = app
                .io_service()
                .read(&input)
                .map_err(|error| error.to_string())?;
            let sizes = [
                (AxisKind::Channel, channels),
                (AxisKind::Z, slices),
                (AxisKind::Time, frames),
            ]
            .into_iter()
            .filter_map(|(axis, size)| size.map(|size| (axis, size)))
            .collect::<Vec<_>>();
            app.image_service()
                .expand(&mut image, &sizes, copy_current)
                .map_err(|error| error.to_string())?;
            let output = output.unwrap_or(input);
            app.io_service()
                .write(&output, &image)
                .map_err(|error| error.to_string())?;
            print_json(&json!({
                "status": "ok",
                "output": output,
                "dimensions": image.dimensions()
            }))?;
        }
        Commands::Snapshot {
            input,
            output,
            channel,
            overlay,
            slice,
            frame,
        } => {
            let image = app
                .io_service()
                .read(&input)
                .map_err(|error| error.to_string())?;
            let mode = if overlay {
                SnapshotMode::Overlay
            } else {
                SnapshotMode::Channel(channel.unwrap_or(0))
            };
            app.io_service()
                .snapshot(&output, &image, mode, slice, frame)
                .map_err(|error| error.to_string())?;
            print_json(&json!({"status": "ok", "output": output, "mode": mode}))?;
        }
        Commands::Preset { command } => run_preset(&app, command)?,
    }

    Ok(())
}

fn run_preset(app: &AppContext, command: PresetCommand) -> Result<(), String> {
    match command {
        PresetCommand::Export { input, preset } => {
            let image = app
                .io_service()
                .read(&input)
                .map_err(|error| error.to_string())?;
            let presets = app
                .preset_service()
                .export(&preset, &image)
                .map_err(|error| error.to_string())?;
            print_json(&presets)
        }
        PresetCommand::Apply {
            input,
            preset,
            output,
        } => {
            let mut image = app
                .io_service()
                .read(&input)
                .map_err(|error| error.to_string())?;
            let presets = app
                .preset_service()
                .load(&preset)
                .map_err(|error| error.to_string())?;
            let report = app
                .preset_service()
                .apply(&mut image, &presets)
                .map_err(|error| error.to_string())?;
            let output = output.unwrap_or(input);
            app.io_service()
                .write(&output, &image)
                .map_err(|error| error.to_string())?;
            print_json(&report)
        }
    }
}

fn image_info(image: &Image5D) -> Result<ImageInfo, String> {
    let mut channels = Vec::with_capacity(image.n_channels());
    for index in 0..image.n_channels() {
        let display = image
            .channel_display_properties(index)
            .map_err(|error| error.to_string())?;
        let calibration = image
            .channel_calibration(index)
            .map_err(|error| error.to_string())?;
        let extent = image
            .pixel_store()
            .channel_min_max(index)
            .map_err(|error| error.to_string())?;
        channels.push(ChannelInfo {
            index,
            label: calibration.label().to_string(),
            color: display.color_table.end_color(),
            display_range: [display.min_value, display.max_value],
            displayed_in_overlay: display.displayed_in_overlay,
            calibration: calibration.is_calibrated().then(|| {
                format!(
                    "{:?} {:?}",
                    calibration.function(),
                    calibration.coefficients()
                )
            }),
            min: extent.map(|(min, _)| min),
            max: extent.map(|(_, max)| max),
        });
    }
    Ok(ImageInfo {
        title: image.title().to_string(),
        dimensions: image.dimensions(),
        pixel_type: image.pixel_type().to_string(),
        position: image.current_position(),
        spatial: image.spatial_calibration().clone(),
        channels,
    })
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|error| error.to_string())?
    );
    Ok(())
}
