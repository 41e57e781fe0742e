use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, builder::BoolishValueParser};
use nifti_slices::{
    CastMode, ClipRange, ConversionRequest, Converter,
    config::{DEFAULT_NORM_CLIP, DEFAULT_STATS_CLIP},
};
use tracing_subscriber::EnvFilter;

/// Convert NIfTI volumes to PNG slices
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Folder containing nii.gz files
    source_folder: PathBuf,

    /// Folder the slices are written to
    target_folder: PathBuf,

    /// Axis along which slicing is done (0, 1 or 2)
    #[arg(allow_negative_numbers = true)]
    slice_dim: i64,

    /// Spacing in voxels between png slices
    spacing: usize,

    /// Normalize with dataset-wide statistics (true/false, yes/no, 1/0)
    #[arg(
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    global_norm: bool,

    /// How out-of-range intensities become pixels
    #[arg(long, value_enum, default_value_t = CastMode::Clamp)]
    cast: CastMode,

    /// Clip range for dataset statistics, as MIN,MAX
    #[arg(long, default_value_t = DEFAULT_STATS_CLIP, allow_hyphen_values = true)]
    stats_clip: ClipRange,

    /// Clip range for global normalization, as MIN,MAX
    #[arg(long, default_value_t = DEFAULT_NORM_CLIP, allow_hyphen_values = true)]
    norm_clip: ClipRange,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

impl From<Cli> for ConversionRequest {
    fn from(cli: Cli) -> Self {
        Self {
            source_folder: cli.source_folder,
            target_folder: cli.target_folder,
            slice_dim: cli.slice_dim,
            spacing: cli.spacing,
            global_norm: cli.global_norm,
            cast: cli.cast,
            stats_clip: cli.stats_clip,
            norm_clip: cli.norm_clip,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    ExitCode::from(run(ConversionRequest::from(cli)))
}

/// Process exit status: 1 for any validation or runtime error. clap exits
/// with 2 on usage errors before this is reached.
fn run(request: ConversionRequest) -> u8 {
    match Converter::new(&request).and_then(|converter| converter.run()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}
