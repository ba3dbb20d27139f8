//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! [`crate::generate`] runs every stage in one call. [`Pipeline`] lets
//! the caller drive execution one step at a time:
//!
//! ```rust
//! # use raceline_pipeline::{Pipeline, PipelineConfig, PipelineError, PixelBuffer, RgbaImage};
//! # fn run(image: &RgbaImage) -> Result<(), PipelineError> {
//! let buffer = PixelBuffer::from_rgba_image(image);
//! let colored = Pipeline::new(buffer, PipelineConfig::default())
//!     .scan()?
//!     .smooth()
//!     .accept()?
//!     .estimate_turns()
//!     .color();
//!
//! let line = colored.into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next state (or a
//! `Result` for the two fallible steps). Only [`Pending`] borrows the
//! pixel buffer; every later stage owns its data.

use crate::types::{Dimensions, Path, PipelineConfig, PipelineError, PixelBuffer, RacingLine, Segment};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
#[must_use = "pipeline stages are consumed by advancing — call .scan() to continue"]
pub struct Pending<'a> {
    config: PipelineConfig,
    buffer: PixelBuffer<'a>,
}

impl Pending<'_> {
    /// Validate the configuration and run the column scanner.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the configuration
    /// fails [`PipelineConfig::validate`].
    pub fn scan(self) -> Result<Scanned, PipelineError> {
        self.config.validate()?;
        let dimensions = self.buffer.dimensions();
        let step = crate::scan::column_step(dimensions.width, &self.config);
        let raw = crate::scan::scan_columns(&self.buffer, step);
        tracing::debug!(
            width = dimensions.width,
            height = dimensions.height,
            step,
            points = raw.len(),
            "scanned columns"
        );
        Ok(Scanned {
            config: self.config,
            dimensions,
            step,
            raw,
        })
    }
}

// ───────────────────────── Stage 1: Scanned ──────────────────────────

/// Pipeline state after the column scan.
#[must_use = "pipeline stages are consumed by advancing — call .smooth() to continue"]
pub struct Scanned {
    config: PipelineConfig,
    dimensions: Dimensions,
    step: u32,
    raw: Path,
}

impl Scanned {
    /// The raw, unsmoothed centerline.
    #[must_use]
    pub const fn raw(&self) -> &Path {
        &self.raw
    }

    /// Distance between sampled columns.
    #[must_use]
    pub const fn step(&self) -> u32 {
        self.step
    }

    /// Advance to the smoothing stage.
    pub fn smooth(self) -> Smoothed {
        let smoothed = crate::smooth::smooth_path(&self.raw, self.config.smoothing_radius);
        Smoothed {
            config: self.config,
            dimensions: self.dimensions,
            step: self.step,
            raw: self.raw,
            smoothed,
        }
    }
}

// ───────────────────────── Stage 2: Smoothed ─────────────────────────

/// Pipeline state after moving-average smoothing.
///
/// Call [`accept`](Self::accept) to apply the minimum-point gate.
#[must_use = "pipeline stages are consumed by advancing — call .accept() to continue"]
pub struct Smoothed {
    config: PipelineConfig,
    dimensions: Dimensions,
    step: u32,
    raw: Path,
    smoothed: Path,
}

impl Smoothed {
    /// The raw centerline the smoothing was applied to.
    #[must_use]
    pub const fn raw(&self) -> &Path {
        &self.raw
    }

    /// The smoothed centerline.
    #[must_use]
    pub const fn smoothed(&self) -> &Path {
        &self.smoothed
    }

    /// Check the path against `config.min_points`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InsufficientDetail`] if the smoothed
    /// path is shorter than the configured minimum. The rejection is
    /// final for this input.
    pub fn accept(self) -> Result<Accepted, PipelineError> {
        let detected = self.smoothed.len();
        let required = self.config.min_points;
        if detected < required {
            tracing::warn!(detected, required, "rejected: insufficient track detail");
            return Err(PipelineError::InsufficientDetail { detected, required });
        }
        Ok(Accepted {
            config: self.config,
            dimensions: self.dimensions,
            step: self.step,
            path: self.smoothed,
        })
    }
}

// ───────────────────────── Stage 3: Accepted ─────────────────────────

/// Pipeline state once the path has passed the acceptance gate.
#[must_use = "pipeline stages are consumed by advancing — call .estimate_turns() to continue"]
pub struct Accepted {
    config: PipelineConfig,
    dimensions: Dimensions,
    step: u32,
    path: Path,
}

impl Accepted {
    /// The accepted, smoothed centerline.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Advance to turn estimation.
    pub fn estimate_turns(self) -> Estimated {
        let intensities = crate::turn::turn_intensities(&self.path, self.config.turn_gain);
        Estimated {
            config: self.config,
            dimensions: self.dimensions,
            step: self.step,
            path: self.path,
            intensities,
        }
    }
}

// ───────────────────────── Stage 4: Estimated ────────────────────────

/// Pipeline state after turn estimation.
#[must_use = "pipeline stages are consumed by advancing — call .color() to continue"]
pub struct Estimated {
    config: PipelineConfig,
    dimensions: Dimensions,
    step: u32,
    path: Path,
    intensities: Vec<f64>,
}

impl Estimated {
    /// One turn intensity per path segment.
    #[must_use]
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Resolve colors and stroke width into drawable segments.
    pub fn color(self) -> Colored {
        let line_width = crate::gradient::line_width(self.dimensions.width, &self.config.gradient);
        let segments = crate::gradient::build_segments(
            &self.path,
            &self.intensities,
            line_width,
            &self.config.gradient,
        );
        tracing::debug!(segments = segments.len(), line_width, "colored segments");
        Colored {
            dimensions: self.dimensions,
            step: self.step,
            path: self.path,
            segments,
            line_width,
        }
    }
}

// ───────────────────────── Stage 5: Colored ──────────────────────────

/// Final pipeline state: drawable segments are ready.
#[must_use = "call .into_result() to obtain the racing line"]
pub struct Colored {
    dimensions: Dimensions,
    step: u32,
    path: Path,
    segments: Vec<Segment>,
    line_width: f64,
}

impl Colored {
    /// The drawable segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Distance between sampled columns used for this line.
    #[must_use]
    pub const fn step(&self) -> u32 {
        self.step
    }

    /// Consume the final stage into a [`RacingLine`].
    #[must_use]
    pub fn into_result(self) -> RacingLine {
        RacingLine {
            path: self.path,
            segments: self.segments,
            dimensions: self.dimensions,
            line_width: self.line_width,
        }
    }
}

/// Entry point for the incremental pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Start a new pipeline over `buffer`.
    pub const fn new(buffer: PixelBuffer<'_>, config: PipelineConfig) -> Pending<'_> {
        Pending { config, buffer }
    }
}
