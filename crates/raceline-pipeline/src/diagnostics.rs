//! Pipeline diagnostics: timing and counts for each stage.
//!
//! [`generate_with_diagnostics`] runs the same stages as
//! [`crate::generate`] while recording how long each took and what it
//! produced. Useful when tuning the step, window and gain constants
//! against real track images.
//!
//! Time is read through the [`Clock`] trait so the crate stays free of
//! platform timers; callers supply an implementation.
//!
//! Durations are serialized as fractional seconds (`f64`) since
//! `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::types::{PipelineConfig, PipelineError, PixelBuffer, RacingLine};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single run.
///
/// A stage that never ran (because configuration validation failed or
/// the path was rejected) is `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Column scan.
    pub scan: Option<StageDiagnostics>,
    /// Moving-average smoothing.
    pub smooth: Option<StageDiagnostics>,
    /// Minimum-point gate.
    pub gate: Option<StageDiagnostics>,
    /// Turn estimation.
    pub turns: Option<StageDiagnostics>,
    /// Gradient coloring.
    pub color: Option<StageDiagnostics>,
    /// Total wall-clock duration (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Column scan metrics.
    Scan {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Distance between sampled columns.
        step: u32,
        /// Raw points produced.
        points: usize,
    },
    /// Smoothing metrics.
    Smooth {
        /// Window radius in points.
        radius: usize,
        /// Largest vertical displacement applied to any point.
        max_shift: f64,
    },
    /// Acceptance gate metrics.
    Gate {
        /// Points in the smoothed path.
        detected: usize,
        /// Configured minimum.
        required: usize,
        /// Whether the path passed.
        accepted: bool,
    },
    /// Turn estimation metrics.
    Turns {
        /// Number of intensities computed.
        segments: usize,
        /// Mean intensity.
        mean_intensity: f64,
        /// Maximum intensity.
        max_intensity: f64,
    },
    /// Coloring metrics.
    Color {
        /// Segments emitted.
        segments: usize,
        /// Stroke width in pixels.
        line_width: f64,
    },
}

/// High-level summary counts for the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Image width in pixels.
    pub image_width: u32,
    /// Image height in pixels.
    pub image_height: u32,
    /// Points in the smoothed path.
    pub path_points: usize,
    /// Segments in the accepted line (0 when rejected).
    pub segment_count: usize,
    /// Whether a line was produced.
    pub accepted: bool,
}

/// Time one stage, returning its output and duration.
fn timed<C: Clock, T>(clock: &C, f: impl FnOnce() -> T) -> (T, Duration) {
    let start = clock.now();
    let out = f();
    (out, clock.elapsed(&start))
}

/// Run the pipeline, collecting per-stage diagnostics.
///
/// The returned result is identical to what [`crate::generate`] would
/// produce for the same input. Diagnostics are returned in every case,
/// including rejection.
pub fn generate_with_diagnostics<C: Clock>(
    buffer: &PixelBuffer<'_>,
    config: &PipelineConfig,
    clock: &C,
) -> (Result<RacingLine, PipelineError>, PipelineDiagnostics) {
    let run_start = clock.now();
    let mut diag = PipelineDiagnostics {
        summary: PipelineSummary {
            image_width: buffer.width(),
            image_height: buffer.height(),
            ..PipelineSummary::default()
        },
        ..PipelineDiagnostics::default()
    };

    let result = run_stages(buffer, config, clock, &mut diag);

    if let Ok(line) = &result {
        diag.summary.segment_count = line.segments.len();
        diag.summary.accepted = true;
    }
    diag.total_duration = clock.elapsed(&run_start);
    (result, diag)
}

fn run_stages<C: Clock>(
    buffer: &PixelBuffer<'_>,
    config: &PipelineConfig,
    clock: &C,
    diag: &mut PipelineDiagnostics,
) -> Result<RacingLine, PipelineError> {
    let (scanned, duration) = timed(clock, || Pipeline::new(*buffer, config.clone()).scan());
    let scanned = scanned?;
    diag.scan = Some(StageDiagnostics {
        duration,
        metrics: StageMetrics::Scan {
            width: buffer.width(),
            height: buffer.height(),
            step: scanned.step(),
            points: scanned.raw().len(),
        },
    });

    let (smoothed, duration) = timed(clock, || scanned.smooth());
    diag.summary.path_points = smoothed.smoothed().len();
    diag.smooth = Some(StageDiagnostics {
        duration,
        metrics: StageMetrics::Smooth {
            radius: config.smoothing_radius,
            max_shift: max_shift(smoothed.raw(), smoothed.smoothed()),
        },
    });

    let detected = smoothed.smoothed().len();
    let (accepted, duration) = timed(clock, || smoothed.accept());
    diag.gate = Some(StageDiagnostics {
        duration,
        metrics: StageMetrics::Gate {
            detected,
            required: config.min_points,
            accepted: accepted.is_ok(),
        },
    });
    let accepted = accepted?;

    let (estimated, duration) = timed(clock, || accepted.estimate_turns());
    let intensities = estimated.intensities();
    #[allow(clippy::cast_precision_loss)]
    let mean_intensity = if intensities.is_empty() {
        0.0
    } else {
        intensities.iter().sum::<f64>() / intensities.len() as f64
    };
    diag.turns = Some(StageDiagnostics {
        duration,
        metrics: StageMetrics::Turns {
            segments: intensities.len(),
            mean_intensity,
            max_intensity: intensities.iter().copied().fold(0.0, f64::max),
        },
    });

    let (colored, duration) = timed(clock, || estimated.color());
    let line = colored.into_result();
    diag.color = Some(StageDiagnostics {
        duration,
        metrics: StageMetrics::Color {
            segments: line.segments.len(),
            line_width: line.line_width,
        },
    });

    Ok(line)
}

/// Largest `|raw.y - smoothed.y|` over matching points.
fn max_shift(raw: &crate::Path, smoothed: &crate::Path) -> f64 {
    raw.points()
        .iter()
        .zip(smoothed.points())
        .map(|(a, b)| (a.y - b.y).abs())
        .fold(0.0, f64::max)
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}",
            self.summary.image_width, self.summary.image_height,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Scan", &self.scan),
            ("Smooth", &self.smooth),
            ("Gate", &self.gate),
            ("Turns", &self.turns),
            ("Color", &self.color),
        ];

        for (name, diag) in stages {
            let Some(diag) = diag else {
                lines.push(format!("{name:<16} {:>10} {:>10}  skipped", "-", "-"));
                continue;
            };
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Path points: {}  |  Segments: {}  |  {}",
            self.summary.path_points,
            self.summary.segment_count,
            if self.summary.accepted {
                "accepted"
            } else {
                "rejected"
            },
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Scan {
            width,
            height,
            step,
            points,
        } => format!("{width}x{height} step={step} -> {points} pts"),
        StageMetrics::Smooth { radius, max_shift } => {
            format!("r={radius} max_shift={max_shift:.2}px")
        }
        StageMetrics::Gate {
            detected,
            required,
            accepted,
        } => {
            let verdict = if *accepted { "pass" } else { "fail" };
            format!("{detected}/{required} {verdict}")
        }
        StageMetrics::Turns {
            segments,
            mean_intensity,
            max_intensity,
        } => format!("{segments} segs mean={mean_intensity:.3} max={max_intensity:.3}"),
        StageMetrics::Color {
            segments,
            line_width,
        } => format!("{segments} segs width={line_width:.1}px"),
    }
}
