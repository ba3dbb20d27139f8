//! raceline-pipeline: Pure racing-line analysis pipeline (sans-IO).
//!
//! Turns the pixels of a track layout image into a colored racing line
//! through:
//! column scan -> smoothing -> acceptance gate -> turn estimation ->
//! gradient coloring.
//!
//! The pipeline operates on an already-decoded, borrowed
//! [`PixelBuffer`] and returns plain data. Decoding file bytes lives in
//! [`decode`]; drawing and file formats live in `raceline-export`.

pub mod decode;
pub mod diagnostics;
pub mod gradient;
pub mod pipeline;
pub mod scan;
pub mod smooth;
pub mod status;
pub mod turn;
pub mod types;

pub use decode::DownsampleFilter;
pub use pipeline::Pipeline;
pub use status::{Status, Tone};
pub use types::{
    Dimensions, ErrorKind, GradientConfig, Path, PipelineConfig, PipelineError, PixelBuffer,
    PixelLayout, Point, RacingLine, Rgb, RgbaImage, Segment,
};

/// Generate a racing line from a decoded pixel buffer.
///
/// Each call is independent: the buffer is only read, nothing is
/// cached, and the same input always produces the same output.
///
/// # Pipeline steps
///
/// 1. Column scan (brightest row per sampled column)
/// 2. Centered moving-average smoothing
/// 3. Minimum-point acceptance gate
/// 4. Turn estimation from heading change
/// 5. Gradient coloring into drawable segments
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// validation. Returns [`PipelineError::InsufficientDetail`] if fewer
/// than `config.min_points` points were detected; zero-sized buffers
/// always end up here.
pub fn generate(
    buffer: &PixelBuffer<'_>,
    config: &PipelineConfig,
) -> Result<RacingLine, PipelineError> {
    let line = Pipeline::new(*buffer, config.clone())
        .scan()?
        .smooth()
        .accept()?
        .estimate_turns()
        .color()
        .into_result();
    Ok(line)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Black RGBA buffer of the given size.
    fn black(width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0u8; (width * height * 4) as usize];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        data
    }

    /// 160x100 black image with a 3-row white band whose top edge runs
    /// linearly from row 10 at x=0 to row 90 at x=159.
    fn diagonal_band() -> (Vec<u8>, impl Fn(u32) -> u32) {
        let (width, height) = (160u32, 100u32);
        let top = |x: u32| 10 + 80 * x / 159;
        let mut data = black(width, height);
        for x in 0..width {
            for y in top(x)..(top(x) + 3).min(height) {
                let off = ((y * width + x) * 4) as usize;
                data[off..off + 3].copy_from_slice(&[255, 255, 255]);
            }
        }
        (data, top)
    }

    #[test]
    fn exactly_eleven_points_is_rejected() {
        // ceil(33 / 3) = 11 columns.
        let data = black(33, 8);
        let buffer = PixelBuffer::new(33, 8, PixelLayout::Rgba, &data).unwrap();
        let result = generate(&buffer, &PipelineConfig::default());
        assert!(matches!(
            result,
            Err(PipelineError::InsufficientDetail {
                detected: 11,
                required: 12
            })
        ));
    }

    #[test]
    fn exactly_twelve_points_is_accepted() {
        // ceil(34 / 3) = 12 columns.
        let data = black(34, 8);
        let buffer = PixelBuffer::new(34, 8, PixelLayout::Rgba, &data).unwrap();
        let line = generate(&buffer, &PipelineConfig::default()).unwrap();
        assert_eq!(line.path.len(), 12);
        assert_eq!(line.segments.len(), 11);
    }

    #[test]
    fn zero_width_is_insufficient_detail() {
        let buffer = PixelBuffer::new(0, 50, PixelLayout::Rgba, &[]).unwrap();
        let err = generate(&buffer, &PipelineConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientDetail);
    }

    #[test]
    fn zero_height_is_insufficient_detail() {
        let buffer = PixelBuffer::new(200, 0, PixelLayout::Rgba, &[]).unwrap();
        let err = generate(&buffer, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InsufficientDetail { detected: 0, .. }
        ));
    }

    #[test]
    fn maximal_smoothing_radius_flattens_the_path() {
        let data = black(60, 4);
        let buffer = PixelBuffer::new(60, 4, PixelLayout::Rgba, &data).unwrap();
        let config = PipelineConfig {
            smoothing_radius: usize::MAX,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
        let line = generate(&buffer, &config).unwrap();
        assert_eq!(line.path.len(), 20);
        assert!(line.path.points().iter().all(|p| p.y.abs() < 1e-12));
    }

    #[test]
    fn lowered_threshold_accepts_narrow_image() {
        let data = black(33, 8);
        let buffer = PixelBuffer::new(33, 8, PixelLayout::Rgba, &data).unwrap();
        let config = PipelineConfig {
            min_points: 11,
            ..PipelineConfig::default()
        };
        assert!(generate(&buffer, &config).is_ok());
    }

    #[test]
    fn diagonal_band_is_accepted_and_follows_the_line() {
        let (data, top) = diagonal_band();
        let buffer = PixelBuffer::new(160, 100, PixelLayout::Rgba, &data).unwrap();
        let line = generate(&buffer, &PipelineConfig::default()).unwrap();

        // step = max(3, 160 / 160) = 3 -> ceil(160 / 3) = 54 columns.
        assert_eq!(line.path.len(), 54);
        assert_eq!(line.segments.len(), 53);

        // The window is 13 points (39 px) wide; at the clipped ends the
        // mean drifts up to half a window (~10 rows) toward the middle.
        for p in line.path.points() {
            let expected = f64::from(top(p.x));
            assert!(
                (p.y - expected).abs() <= 10.5,
                "x={}: y={} expected ~{expected}",
                p.x,
                p.y,
            );
        }
    }

    #[test]
    fn diagonal_band_has_near_zero_turn_intensity() {
        let (data, _) = diagonal_band();
        let buffer = PixelBuffer::new(160, 100, PixelLayout::Rgba, &data).unwrap();
        let line = generate(&buffer, &PipelineConfig::default()).unwrap();

        let radius = PipelineConfig::DEFAULT_SMOOTHING_RADIUS;
        let n = line.path.len();
        // Segments whose three points all sit in full smoothing windows.
        for (i, segment) in line.segments[radius..n - radius - 2].iter().enumerate() {
            assert!(
                segment.intensity < 0.1,
                "segment {}: intensity {}",
                i + radius,
                segment.intensity,
            );
            assert!(segment.end_color.g > 200, "segment should stay green");
        }
        // The clipped windows at both ends bend the line slightly but
        // never approach a real turn.
        for segment in &line.segments {
            assert!(segment.intensity < 0.5, "intensity {}", segment.intensity);
        }
    }

    #[test]
    fn generate_is_deterministic() {
        let (data, _) = diagonal_band();
        let buffer = PixelBuffer::new(160, 100, PixelLayout::Rgba, &data).unwrap();
        let config = PipelineConfig::default();
        assert_eq!(
            generate(&buffer, &config).unwrap(),
            generate(&buffer, &config).unwrap()
        );
    }

    #[test]
    fn v_shaped_track_turns_hot_at_the_apex() {
        // Line falls to the bottom at the center, then climbs back up.
        let (width, height) = (300u32, 200u32);
        let mut data = black(width, height);
        for x in 0..width {
            let y = if x <= 150 { x } else { 300 - x };
            let off = ((y * width + x) * 4) as usize;
            data[off..off + 3].copy_from_slice(&[255, 255, 255]);
        }
        let buffer = PixelBuffer::new(width, height, PixelLayout::Rgba, &data).unwrap();
        let config = PipelineConfig {
            smoothing_radius: 0,
            ..PipelineConfig::default()
        };
        let line = generate(&buffer, &config).unwrap();
        let last = line.segments.len() - 1;
        for (i, segment) in line.segments[..last].iter().enumerate() {
            if segment.end.x == 150 {
                assert!((segment.intensity - 1.0).abs() < f64::EPSILON);
                assert_eq!(segment.end_color, Rgb::new(245, 55, 15));
            } else {
                assert!(segment.intensity < 1e-9, "segment {i}: {}", segment.intensity);
            }
        }
    }
}
