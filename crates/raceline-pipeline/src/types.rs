//! Shared types for the raceline analysis pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decode::DownsampleFilter;

/// Re-export `RgbaImage` so downstream crates can hand decoded images
/// to the pipeline without depending on `image` directly.
pub use image::RgbaImage;

/// A point on the racing line in image coordinates.
///
/// `x` is always a sampled column index. `y` is a row coordinate: raw
/// scanner output carries integral values, smoothed output carries the
/// window mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Column index (pixels from left edge).
    pub x: u32,
    /// Row coordinate (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: u32, y: f64) -> Self {
        Self { x, y }
    }

    /// The column index as a float, for geometry.
    #[must_use]
    pub fn x_f64(self) -> f64 {
        f64::from(self.x)
    }
}

/// An ordered centerline estimate, one point per sampled column.
///
/// Points are strictly increasing in `x` by the column step used to
/// produce them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path(Vec<Point>);

impl Path {
    /// Create a new path from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the path has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the path.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Channel layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelLayout {
    /// Four bytes per pixel: red, green, blue, alpha.
    Rgba,
    /// Three bytes per pixel: red, green, blue.
    Rgb,
}

impl PixelLayout {
    /// Number of bytes occupied by one pixel.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba => 4,
            Self::Rgb => 3,
        }
    }
}

/// A borrowed, row-major view of decoded pixel data.
///
/// The pipeline only ever reads from the buffer. Construction checks
/// that the byte slice is exactly `width * height * bytes_per_pixel`
/// long, so indexing inside the scanner cannot go out of bounds.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    /// Wrap a raw byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidBuffer`] if `data.len()` does not
    /// match the dimensions and layout.
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: &'a [u8],
    ) -> Result<Self, PipelineError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(layout.bytes_per_pixel()));
        if expected != Some(data.len()) {
            return Err(PipelineError::InvalidBuffer {
                width,
                height,
                layout,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Borrow a decoded RGBA image.
    #[must_use]
    pub fn from_rgba_image(image: &'a RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            layout: PixelLayout::Rgba,
            data: image.as_raw(),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height as [`Dimensions`].
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// The `[r, g, b]` channels of the pixel at `(x, y)`, or `None`
    /// when the coordinate is outside the buffer.
    #[must_use]
    pub fn rgb(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset =
            (y as usize * self.width as usize + x as usize) * self.layout.bytes_per_pixel();
        match self.data.get(offset..offset + 3) {
            Some(&[r, g, b]) => Some([r, g, b]),
            _ => None,
        }
    }
}

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex notation, e.g. `#23e141`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Formats as CSS Color 4 space-separated `rgb(r g b)`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({} {} {})", self.r, self.g, self.b)
    }
}

/// One drawable piece of the racing line.
///
/// A straight stroke from `start` to `end`, shaded with a linear
/// gradient from `start_color` to `end_color`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start point (smoothed path coordinates).
    pub start: Point,
    /// End point (smoothed path coordinates).
    pub end: Point,
    /// Turn intensity in `[0, 1]`.
    pub intensity: f64,
    /// Gradient color at `start`.
    pub start_color: Rgb,
    /// Gradient color at `end`.
    pub end_color: Rgb,
    /// Stroke width in output pixels.
    pub width: f64,
}

/// An accepted racing line, ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacingLine {
    /// The smoothed centerline the segments were built from.
    pub path: Path,
    /// Colored segments, in path order.
    pub segments: Vec<Segment>,
    /// Dimensions of the analyzed image (the drawing surface).
    pub dimensions: Dimensions,
    /// Stroke width shared by every segment.
    pub line_width: f64,
}

/// Color and stroke settings for the rendered line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Color at zero turn intensity.
    pub cool: Rgb,
    /// Color at full turn intensity.
    pub hot: Rgb,
    /// Factor applied to a segment's intensity for its start color, so
    /// the color ramps up while entering a turn.
    pub start_color_scale: f64,
    /// Lower bound for the stroke width in pixels.
    pub min_line_width: f64,
    /// Stroke width as a fraction of the output width.
    pub line_width_fraction: f64,
}

impl GradientConfig {
    /// Default color at zero intensity.
    pub const DEFAULT_COOL: Rgb = Rgb::new(35, 225, 65);
    /// Default color at full intensity.
    pub const DEFAULT_HOT: Rgb = Rgb::new(245, 55, 15);
    /// Default start-color intensity factor.
    pub const DEFAULT_START_COLOR_SCALE: f64 = 0.8;
    /// Default minimum stroke width in pixels.
    pub const DEFAULT_MIN_LINE_WIDTH: f64 = 4.0;
    /// Default stroke width as a fraction of the output width.
    pub const DEFAULT_LINE_WIDTH_FRACTION: f64 = 0.01;
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            cool: Self::DEFAULT_COOL,
            hot: Self::DEFAULT_HOT,
            start_color_scale: Self::DEFAULT_START_COLOR_SCALE,
            min_line_width: Self::DEFAULT_MIN_LINE_WIDTH,
            line_width_fraction: Self::DEFAULT_LINE_WIDTH_FRACTION,
        }
    }
}

/// Configuration for the racing line pipeline.
///
/// The defaults match the stock look of the overlay; every field
/// is tunable per deployment. Use [`validate`](Self::validate) before
/// running with hand-built values ([`crate::generate`] does this for
/// you).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Lower bound on the distance between sampled columns.
    pub min_column_step: u32,

    /// Approximate number of columns to sample across the image width.
    /// The step is `max(min_column_step, width / target_columns)`.
    pub target_columns: u32,

    /// Half-width of the centered moving-average window, in points.
    pub smoothing_radius: usize,

    /// Multiplier applied to the absolute heading change (radians)
    /// before clamping to `[0, 1]`.
    pub turn_gain: f64,

    /// Minimum number of path points for a line to be accepted.
    pub min_points: usize,

    /// Colors and stroke width.
    pub gradient: GradientConfig,

    /// Longest side, in pixels, of the image the pipeline analyzes.
    /// Only applied by [`crate::decode::load_image`].
    pub working_resolution: u32,

    /// Resampling filter used when shrinking to `working_resolution`.
    pub downsample_filter: DownsampleFilter,
}

impl PipelineConfig {
    /// Default lower bound on the column step.
    pub const DEFAULT_MIN_COLUMN_STEP: u32 = 3;
    /// Default target column count.
    pub const DEFAULT_TARGET_COLUMNS: u32 = 160;
    /// Default smoothing window radius.
    pub const DEFAULT_SMOOTHING_RADIUS: usize = 6;
    /// Default turn-intensity multiplier.
    pub const DEFAULT_TURN_GAIN: f64 = 1.4;
    /// Default acceptance threshold.
    pub const DEFAULT_MIN_POINTS: usize = 12;
    /// Default working resolution (longest side in pixels).
    pub const DEFAULT_WORKING_RESOLUTION: u32 = 1200;
    /// Default downsampling filter.
    pub const DEFAULT_DOWNSAMPLE_FILTER: DownsampleFilter = DownsampleFilter::Triangle;

    /// Check the configuration for values the pipeline cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |msg: &str| Err(PipelineError::InvalidConfig(msg.to_string()));

        if self.min_column_step == 0 {
            return invalid("min_column_step must be at least 1");
        }
        if self.target_columns == 0 {
            return invalid("target_columns must be at least 1");
        }
        if !self.turn_gain.is_finite() || self.turn_gain < 0.0 {
            return invalid("turn_gain must be finite and non-negative");
        }
        if self.min_points < 2 {
            return invalid("min_points must be at least 2");
        }
        if self.working_resolution == 0 {
            return invalid("working_resolution must be at least 1");
        }
        let gradient = &self.gradient;
        if !(0.0..=1.0).contains(&gradient.start_color_scale) {
            return invalid("gradient.start_color_scale must be within [0, 1]");
        }
        if !gradient.min_line_width.is_finite() || gradient.min_line_width <= 0.0 {
            return invalid("gradient.min_line_width must be finite and positive");
        }
        if !gradient.line_width_fraction.is_finite() || gradient.line_width_fraction < 0.0 {
            return invalid("gradient.line_width_fraction must be finite and non-negative");
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_column_step: Self::DEFAULT_MIN_COLUMN_STEP,
            target_columns: Self::DEFAULT_TARGET_COLUMNS,
            smoothing_radius: Self::DEFAULT_SMOOTHING_RADIUS,
            turn_gain: Self::DEFAULT_TURN_GAIN,
            min_points: Self::DEFAULT_MIN_POINTS,
            gradient: GradientConfig::default(),
            working_resolution: Self::DEFAULT_WORKING_RESOLUTION,
            downsample_filter: Self::DEFAULT_DOWNSAMPLE_FILTER,
        }
    }
}

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable pixel buffer could be obtained.
    InputUnavailable,
    /// The configuration was rejected before running.
    InvalidConfig,
    /// Too few centerline points were detected.
    InsufficientDetail,
}

/// Errors that can occur while loading an image or generating a line.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A pixel buffer's byte length does not match its dimensions.
    #[error("pixel buffer of {actual} bytes does not fit {width}x{height} {layout:?}")]
    InvalidBuffer {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Declared layout.
        layout: PixelLayout,
        /// Actual byte length.
        actual: usize,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// Fewer path points were detected than the acceptance threshold.
    #[error("insufficient track detail")]
    InsufficientDetail {
        /// Points in the smoothed path.
        detected: usize,
        /// Configured minimum.
        required: usize,
    },
}

impl PipelineError {
    /// The taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ImageDecode(_) | Self::EmptyInput | Self::InvalidBuffer { .. } => {
                ErrorKind::InputUnavailable
            }
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::InsufficientDetail { .. } => ErrorKind::InsufficientDetail,
        }
    }

    /// A message suitable for showing to the person who supplied the image.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::InputUnavailable => crate::status::LOAD_FAILED.to_string(),
            ErrorKind::InsufficientDetail => crate::status::INSUFFICIENT_DETAIL.to_string(),
            ErrorKind::InvalidConfig => self.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point / Path tests ---

    #[test]
    fn point_x_as_float() {
        let p = Point::new(7, 2.5);
        assert!((p.x_f64() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn path_empty() {
        let path = Path::new(vec![]);
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert!(path.points().is_empty());
    }

    #[test]
    fn path_keeps_point_order() {
        let path = Path::new(vec![
            Point::new(0, 1.0),
            Point::new(3, 2.0),
            Point::new(6, 3.0),
        ]);
        assert_eq!(path.len(), 3);
        assert_eq!(path.points()[0], Point::new(0, 1.0));
        assert_eq!(path.points()[2], Point::new(6, 3.0));
    }

    // --- PixelBuffer tests ---

    #[test]
    fn pixel_buffer_rejects_short_data() {
        let data = [0u8; 11];
        let result = PixelBuffer::new(2, 2, PixelLayout::Rgb, &data);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidBuffer { actual: 11, .. })
        ));
    }

    #[test]
    fn pixel_buffer_accepts_exact_rgb_and_rgba() {
        let rgb = [0u8; 12];
        let rgba = [0u8; 16];
        assert!(PixelBuffer::new(2, 2, PixelLayout::Rgb, &rgb).is_ok());
        assert!(PixelBuffer::new(2, 2, PixelLayout::Rgba, &rgba).is_ok());
    }

    #[test]
    fn pixel_buffer_allows_zero_sized() {
        let buffer = PixelBuffer::new(0, 5, PixelLayout::Rgba, &[]).unwrap();
        assert_eq!(
            buffer.dimensions(),
            Dimensions {
                width: 0,
                height: 5
            }
        );
    }

    #[test]
    fn pixel_buffer_reads_channels_for_both_layouts() {
        // 2x1: pixel (1, 0) is (10, 20, 30).
        let rgb = [0, 0, 0, 10, 20, 30];
        let rgba = [0, 0, 0, 255, 10, 20, 30, 128];
        let a = PixelBuffer::new(2, 1, PixelLayout::Rgb, &rgb).unwrap();
        let b = PixelBuffer::new(2, 1, PixelLayout::Rgba, &rgba).unwrap();
        assert_eq!(a.rgb(1, 0), Some([10, 20, 30]));
        assert_eq!(b.rgb(1, 0), Some([10, 20, 30]));
        assert_eq!(a.rgb(2, 0), None);
        assert_eq!(b.rgb(0, 1), None);
    }

    #[test]
    fn pixel_buffer_from_rgba_image() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 4]));
        let buffer = PixelBuffer::from_rgba_image(&img);
        assert_eq!(buffer.width(), 3);
        assert_eq!(buffer.height(), 2);
        assert_eq!(buffer.rgb(2, 1), Some([1, 2, 3]));
    }

    // --- Rgb tests ---

    #[test]
    fn rgb_display_is_css_space_separated() {
        assert_eq!(Rgb::new(35, 225, 65).to_string(), "rgb(35 225 65)");
    }

    #[test]
    fn rgb_hex() {
        assert_eq!(Rgb::new(245, 55, 15).to_hex(), "#f5370f");
    }

    // --- PipelineConfig tests ---

    #[test]
    fn pipeline_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_column_step, 3);
        assert_eq!(config.target_columns, 160);
        assert_eq!(config.smoothing_radius, 6);
        assert!((config.turn_gain - 1.4).abs() < f64::EPSILON);
        assert_eq!(config.min_points, 12);
        assert_eq!(config.working_resolution, 1200);
        assert_eq!(config.gradient.cool, Rgb::new(35, 225, 65));
        assert_eq!(config.gradient.hot, Rgb::new(245, 55, 15));
        assert!((config.gradient.start_color_scale - 0.8).abs() < f64::EPSILON);
        assert!((config.gradient.min_line_width - 4.0).abs() < f64::EPSILON);
        assert!((config.gradient.line_width_fraction - 0.01).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_step() {
        let config = PipelineConfig {
            min_column_step: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(ref s)) if s.contains("min_column_step")
        ));
    }

    #[test]
    fn validate_rejects_nan_gain() {
        let config = PipelineConfig {
            turn_gain: f64::NAN,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_single_point_threshold() {
        let config = PipelineConfig {
            min_points: 1,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_start_scale() {
        let mut config = PipelineConfig::default();
        config.gradient.start_color_scale = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn pipeline_config_partial_json_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"smoothing_radius": 2, "gradient": {"min_line_width": 6.0}}"#)
                .unwrap();
        assert_eq!(config.smoothing_radius, 2);
        assert_eq!(config.min_points, PipelineConfig::DEFAULT_MIN_POINTS);
        assert!((config.gradient.min_line_width - 6.0).abs() < f64::EPSILON);
        assert_eq!(config.gradient.cool, GradientConfig::DEFAULT_COOL);
    }

    #[test]
    fn pipeline_config_serde_round_trip() {
        let config = PipelineConfig {
            smoothing_radius: 3,
            turn_gain: 2.0,
            downsample_filter: DownsampleFilter::Lanczos3,
            ..PipelineConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    // --- PipelineError tests ---

    #[test]
    fn error_insufficient_detail_display() {
        let err = PipelineError::InsufficientDetail {
            detected: 11,
            required: 12,
        };
        assert_eq!(err.to_string(), "insufficient track detail");
        assert_eq!(err.kind(), ErrorKind::InsufficientDetail);
    }

    #[test]
    fn error_empty_input_display() {
        let err = PipelineError::EmptyInput;
        assert_eq!(err.to_string(), "input image data is empty");
        assert_eq!(err.kind(), ErrorKind::InputUnavailable);
    }

    #[test]
    fn error_user_messages() {
        let detail = PipelineError::InsufficientDetail {
            detected: 0,
            required: 12,
        };
        assert_eq!(
            detail.user_message(),
            "Could not detect enough track detail. Try a clearer layout image."
        );
        assert_eq!(
            PipelineError::EmptyInput.user_message(),
            "Could not load that image. Try another file."
        );
        let config = PipelineError::InvalidConfig("bad".to_string());
        assert_eq!(config.user_message(), "invalid pipeline configuration: bad");
    }
}
