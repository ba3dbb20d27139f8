//! raceline: trace a turn-colored racing line over a track layout image.
//!
//! Loads the image, fits it to the working resolution, runs the
//! pipeline, and writes the line composited over the image as a PNG.
//! Optionally also writes the bare line as SVG, dumps the line as JSON,
//! or prints per-stage diagnostics.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin raceline -- <IMAGE> -o <OUT.png> [OPTIONS]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `raceline=info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use raceline_pipeline::diagnostics::Clock;
use raceline_pipeline::{DownsampleFilter, PipelineConfig, PipelineError, PixelBuffer, Status};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Trace a turn-colored racing line over a track layout image.
#[derive(Parser)]
#[command(name = "raceline", version)]
struct Cli {
    /// Path to the track layout image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Output PNG path.
    #[arg(short, long)]
    output: PathBuf,

    /// Also write the line alone as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print the generated line as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Print per-stage timing and counts on stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Half-width of the smoothing window, in points.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SMOOTHING_RADIUS)]
    smoothing_radius: usize,

    /// Multiplier from heading change (radians) to turn intensity.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_TURN_GAIN)]
    turn_gain: f64,

    /// Fewest points a path may have and still be accepted.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MIN_POINTS)]
    min_points: usize,

    /// Working resolution (max dimension in pixels after downsampling).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_WORKING_RESOLUTION, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    working_resolution: u32,

    /// Downsample filter.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_FILTER)]
    downsample_filter: Filter,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization; omitted
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Downsample resampling filter selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Filter {
    /// Disabled: analyze at full resolution regardless of size.
    Disabled,
    /// Nearest-neighbor (fastest, blocky).
    Nearest,
    /// Bilinear interpolation (fast, decent quality).
    Triangle,
    /// Bicubic Catmull-Rom.
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Lanczos with 3 lobes (slowest, sharpest).
    Lanczos3,
}

const fn filter_from_pipeline(f: DownsampleFilter) -> Filter {
    match f {
        DownsampleFilter::None => Filter::Disabled,
        DownsampleFilter::Nearest => Filter::Nearest,
        DownsampleFilter::Triangle => Filter::Triangle,
        DownsampleFilter::CatmullRom => Filter::CatmullRom,
        DownsampleFilter::Gaussian => Filter::Gaussian,
        DownsampleFilter::Lanczos3 => Filter::Lanczos3,
    }
}

const fn filter_to_pipeline(f: Filter) -> DownsampleFilter {
    match f {
        Filter::Disabled => DownsampleFilter::None,
        Filter::Nearest => DownsampleFilter::Nearest,
        Filter::Triangle => DownsampleFilter::Triangle,
        Filter::CatmullRom => DownsampleFilter::CatmullRom,
        Filter::Gaussian => DownsampleFilter::Gaussian,
        Filter::Lanczos3 => DownsampleFilter::Lanczos3,
    }
}

/// The CLI default filter, derived from [`PipelineConfig::DEFAULT_DOWNSAMPLE_FILTER`].
const CLI_DEFAULT_FILTER: Filter = filter_from_pipeline(PipelineConfig::DEFAULT_DOWNSAMPLE_FILTER);

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// `--config-json` wins over the individual flags.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        PipelineConfig {
            smoothing_radius: cli.smoothing_radius,
            turn_gain: cli.turn_gain,
            min_points: cli.min_points,
            working_resolution: cli.working_resolution,
            downsample_filter: filter_to_pipeline(cli.downsample_filter),
            ..PipelineConfig::default()
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Log the user-facing message for `err`, with the cause at debug level.
fn report_failure(err: &PipelineError) {
    error!("{}", Status::from_error(err));
    tracing::debug!(error = %err, kind = ?err.kind(), "request failed");
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("raceline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            error!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let working = match raceline_pipeline::decode::load_image(
        &image_bytes,
        config.working_resolution,
        config.downsample_filter,
    ) {
        Ok(img) => img,
        Err(e) => {
            report_failure(&e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        width = working.width(),
        height = working.height(),
        "{}",
        Status::Loaded
    );

    info!("{}", Status::Generating);
    let buffer = PixelBuffer::from_rgba_image(&working);
    let result = if cli.diagnostics {
        let (result, diagnostics) =
            raceline_pipeline::diagnostics::generate_with_diagnostics(&buffer, &config, &StdClock);
        eprintln!("{}", diagnostics.report());
        result
    } else {
        raceline_pipeline::generate(&buffer, &config)
    };
    let line = match result {
        Ok(line) => line,
        Err(e) => {
            report_failure(&e);
            return ExitCode::FAILURE;
        }
    };

    let png = match raceline_export::render_overlay(&working, &line)
        .and_then(|overlay| raceline_export::encode_png(&overlay))
    {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Error rendering overlay: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = std::fs::write(&cli.output, &png) {
        error!("Error writing PNG to {}: {e}", cli.output.display());
        return ExitCode::FAILURE;
    }
    info!(
        "PNG written to {} ({} bytes)",
        cli.output.display(),
        png.len()
    );

    if let Some(ref svg_path) = cli.svg {
        let title = cli
            .image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("raceline");
        let desc = format!(
            "smoothing_radius={}, turn_gain={}, min_points={}",
            config.smoothing_radius, config.turn_gain, config.min_points,
        );
        let metadata = raceline_export::SvgMetadata {
            title: Some(title),
            description: Some(&desc),
        };
        let svg = raceline_export::to_svg(&line, &metadata);
        if let Err(e) = std::fs::write(svg_path, &svg) {
            error!("Error writing SVG to {}: {e}", svg_path.display());
            return ExitCode::FAILURE;
        }
        info!("SVG written to {} ({} bytes)", svg_path.display(), svg.len());
    }

    if cli.json {
        match serde_json::to_string_pretty(&line) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Error serializing racing line: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    info!(segments = line.segments.len(), "{}", Status::Done);
    ExitCode::SUCCESS
}
