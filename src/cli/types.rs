use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::model::{BlankFill, Dimensions, PixelType, Position, SpatialCalibration};

#[derive(Debug, Parser)]
#[command(
    name = "image5d",
    version,
    about = "Five-dimensional (x, y, channel, z, t) image stacks with per-channel metadata"
)]
pub(super) struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub(super) log_level: String,

    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Prints dimensions, channel settings and calibration as JSON.
    Info { input: PathBuf },
    /// Writes a blank image.
    Create {
        output: PathBuf,
        #[arg(long)]
        width: usize,
        #[arg(long)]
        height: usize,
        #[arg(long, default_value_t = 1)]
        channels: usize,
        #[arg(long, default_value_t = 1)]
        slices: usize,
        #[arg(long, default_value_t = 1)]
        frames: usize,
        #[arg(long, value_enum, default_value_t = PixelTypeArg::U8)]
        pixel_type: PixelTypeArg,
        /// `black`, `white` or a sample value.
        #[arg(long, default_value = "black", value_parser = parse_fill)]
        fill: BlankFill,
    },
    /// Grows the channel, slice or frame axis.
    Expand {
        input: PathBuf,
        /// Defaults to overwriting the input.
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        channels: Option<usize>,
        #[arg(long)]
        slices: Option<usize>,
        #[arg(long)]
        frames: Option<usize>,
        /// Fill new planes with a copy of the current plane instead of blanks.
        #[arg(long)]
        copy_current: bool,
    },
    /// Renders one plane (or the channel overlay) to PNG.
    Snapshot {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, conflicts_with = "overlay")]
        channel: Option<usize>,
        #[arg(long)]
        overlay: bool,
        #[arg(long, default_value_t = 0)]
        slice: usize,
        #[arg(long, default_value_t = 0)]
        frame: usize,
    },
    /// Channel-settings preset files (JSON or YAML).
    Preset {
        #[command(subcommand)]
        command: PresetCommand,
    },
}

#[derive(Debug, Subcommand)]
pub(super) enum PresetCommand {
    Export {
        input: PathBuf,
        preset: PathBuf,
    },
    Apply {
        input: PathBuf,
        preset: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(super) enum PixelTypeArg {
    U8,
    U16,
    F32,
}

impl From<PixelTypeArg> for PixelType {
    fn from(value: PixelTypeArg) -> Self {
        match value {
            PixelTypeArg::U8 => PixelType::U8,
            PixelTypeArg::U16 => PixelType::U16,
            PixelTypeArg::F32 => PixelType::F32,
        }
    }
}

fn parse_fill(raw: &str) -> Result<BlankFill, String> {
    match raw.to_ascii_lowercase().as_str() {
        "black" => Ok(BlankFill::Black),
        "white" => Ok(BlankFill::White),
        other => other
            .parse::<f64>()
            .map(BlankFill::Value)
            .map_err(|_| format!("expected black, white or a number, found `{raw}`")),
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ImageInfo {
    pub(super) title: String,
    pub(super) dimensions: Dimensions,
    pub(super) pixel_type: String,
    pub(super) position: Option<Position>,
    pub(super) spatial: SpatialCalibration,
    pub(super) channels: Vec<ChannelInfo>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChannelInfo {
    pub(super) index: usize,
    pub(super) label: String,
    pub(super) color: [u8; 3],
    pub(super) display_range: [f64; 2],
    pub(super) displayed_in_overlay: bool,
    pub(super) calibration: Option<String>,
    pub(super) min: Option<f64>,
    pub(super) max: Option<f64>,
}
