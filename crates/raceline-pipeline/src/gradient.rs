//! Turn-intensity coloring and drawable segment construction.
//!
//! Intensity maps onto a two-endpoint gradient, green for straights
//! and red for the sharpest turns. Each segment fades from a slightly
//! cooler start color into its full end color, which makes the line
//! visibly heat up while entering a corner.

use crate::types::{GradientConfig, Path, Rgb, Segment};

/// Color for turn intensity `t` on the default green-to-red gradient.
///
/// `t` is clamped to `[0, 1]`; NaN maps to the cool end.
///
/// # Examples
///
/// ```
/// use raceline_pipeline::gradient::color_for;
/// use raceline_pipeline::Rgb;
///
/// assert_eq!(color_for(0.0), Rgb::new(35, 225, 65));
/// assert_eq!(color_for(1.0), Rgb::new(245, 55, 15));
/// ```
#[must_use]
pub fn color_for(t: f64) -> Rgb {
    lerp_color(GradientConfig::DEFAULT_COOL, GradientConfig::DEFAULT_HOT, t)
}

/// Linear interpolation from `cool` (at 0) to `hot` (at 1), each
/// channel rounded to the nearest integer.
#[must_use]
pub fn lerp_color(cool: Rgb, hot: Rgb, t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let channel = |from: u8, to: u8| -> u8 {
        let from = f64::from(from);
        // Rounding must match `from + t * (to - from)` exactly, so no mul_add.
        #[allow(clippy::suboptimal_flops)]
        let value = from + t * (f64::from(to) - from);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = value.round().clamp(0.0, 255.0) as u8;
        rounded
    };
    Rgb::new(
        channel(cool.r, hot.r),
        channel(cool.g, hot.g),
        channel(cool.b, hot.b),
    )
}

/// Stroke width for a drawing surface `canvas_width` pixels wide.
#[must_use]
pub fn line_width(canvas_width: u32, config: &GradientConfig) -> f64 {
    (f64::from(canvas_width) * config.line_width_fraction).max(config.min_line_width)
}

/// Pair each segment of `path` with its intensity and resolve colors.
///
/// `intensities` holds one value per segment, as produced by
/// [`crate::turn::turn_intensities`]. If it is shorter than the number
/// of segments, the extra segments are dropped.
#[must_use = "returns the drawable segments"]
pub fn build_segments(
    path: &Path,
    intensities: &[f64],
    width: f64,
    config: &GradientConfig,
) -> Vec<Segment> {
    path.points()
        .windows(2)
        .zip(intensities)
        .map(|(pair, &intensity)| Segment {
            start: pair[0],
            end: pair[1],
            intensity,
            start_color: lerp_color(config.cool, config.hot, intensity * config.start_color_scale),
            end_color: lerp_color(config.cool, config.hot, intensity),
            width,
        })
        .collect()
}
