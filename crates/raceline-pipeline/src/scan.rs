//! Column scanner: raw centerline estimate from pixel data.
//!
//! A track drawn on a darker background is assumed to be the brightest
//! feature in any given column, so the per-column brightness maximum is
//! used as a cheap stand-in for "where the track surface is". No
//! segmentation is attempted.
//!
//! This is the first step in the pipeline: `PixelBuffer` in, raw
//! [`Path`] out.

use crate::types::{PipelineConfig, PixelBuffer, Point, Path};

/// Distance in pixels between sampled columns for an image `width`
/// pixels wide: `max(min_column_step, width / target_columns)`.
#[must_use]
pub fn column_step(width: u32, config: &PipelineConfig) -> u32 {
    (width / config.target_columns.max(1)).max(config.min_column_step.max(1))
}

/// Number of columns [`scan_columns`] will sample. A `step` of zero
/// counts as one.
#[must_use]
pub const fn sampled_column_count(width: u32, step: u32) -> u32 {
    let step = if step == 0 { 1 } else { step };
    width.div_ceil(step)
}

/// Sample every `step`-th column and record the brightest row in each.
///
/// Brightness is the unweighted sum of the red, green and blue
/// channels (alpha is ignored). Only a strictly greater value replaces
/// the current best, so on ties the topmost row wins.
///
/// Returns one point per sampled column. A zero-height buffer has no
/// rows to choose from and yields an empty path, as does a zero-width
/// one. A `step` of zero is treated as one.
#[must_use = "returns the raw centerline points"]
pub fn scan_columns(buffer: &PixelBuffer<'_>, step: u32) -> Path {
    let step = step.max(1);
    let mut points = Vec::with_capacity(sampled_column_count(buffer.width(), step) as usize);

    for x in (0..buffer.width()).step_by(step as usize) {
        if let Some(y) = brightest_row(buffer, x) {
            points.push(Point::new(x, f64::from(y)));
        }
    }

    Path::new(points)
}

/// Topmost row with the greatest R+G+B in column `x`.
fn brightest_row(buffer: &PixelBuffer<'_>, x: u32) -> Option<u32> {
    let mut best: Option<(u32, u16)> = None;
    for y in 0..buffer.height() {
        let Some([r, g, b]) = buffer.rgb(x, y) else {
            continue;
        };
        let score = u16::from(r) + u16::from(g) + u16::from(b);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((y, score));
        }
    }
    best.map(|(y, _)| y)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::PixelLayout;

    /// Black RGBA image with the given `(x, y)` pixels set to `value`.
    fn image_with(width: u32, height: u32, lit: &[(u32, u32)], value: [u8; 4]) -> Vec<u8> {
        let mut data = vec![0u8; (width * height * 4) as usize];
        for &(x, y) in lit {
            let off = ((y * width + x) * 4) as usize;
            data[off..off + 4].copy_from_slice(&value);
        }
        data
    }

    #[test]
    fn step_has_lower_bound_of_three() {
        let config = PipelineConfig::default();
        assert_eq!(column_step(0, &config), 3);
        assert_eq!(column_step(160, &config), 3);
        assert_eq!(column_step(479, &config), 3);
        assert_eq!(column_step(480, &config), 3);
        assert_eq!(column_step(640, &config), 4);
        assert_eq!(column_step(1200, &config), 7);
    }

    #[test]
    fn zero_step_counts_every_column() {
        assert_eq!(sampled_column_count(10, 0), 10);
        assert_eq!(sampled_column_count(10, 3), 4);
        let data = vec![0u8; 5 * 2 * 4];
        let buffer = PixelBuffer::new(5, 2, PixelLayout::Rgba, &data).unwrap();
        assert_eq!(scan_columns(&buffer, 0).len(), 5);
    }

    #[test]
    fn output_length_is_ceil_width_over_step() {
        let config = PipelineConfig::default();
        for width in [1, 2, 3, 4, 31, 33, 34, 160, 481, 1000] {
            let data = vec![0u8; (width * 2 * 4) as usize];
            let buffer = PixelBuffer::new(width, 2, PixelLayout::Rgba, &data).unwrap();
            let step = column_step(width, &config);
            let path = scan_columns(&buffer, step);
            assert_eq!(
                path.len() as u32,
                width.div_ceil(step),
                "width={width} step={step}"
            );
            assert!(path.points().iter().all(|p| p.x % step == 0));
        }
    }

    #[test]
    fn x_values_increase_by_step() {
        let data = vec![0u8; 20 * 4 * 4];
        let buffer = PixelBuffer::new(20, 4, PixelLayout::Rgba, &data).unwrap();
        let path = scan_columns(&buffer, 3);
        let xs: Vec<u32> = path.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 3, 6, 9, 12, 15, 18]);
    }

    #[test]
    fn finds_brightest_row() {
        let data = image_with(3, 10, &[(0, 7)], [200, 200, 200, 255]);
        let buffer = PixelBuffer::new(3, 10, PixelLayout::Rgba, &data).unwrap();
        let path = scan_columns(&buffer, 3);
        assert_eq!(path.points(), &[Point::new(0, 7.0)]);
    }

    #[test]
    fn ties_keep_topmost_row() {
        let data = image_with(1, 10, &[(0, 4), (0, 8)], [90, 90, 90, 255]);
        let buffer = PixelBuffer::new(1, 10, PixelLayout::Rgba, &data).unwrap();
        let path = scan_columns(&buffer, 3);
        assert_eq!(path.points(), &[Point::new(0, 4.0)]);
    }

    #[test]
    fn uniform_column_picks_row_zero() {
        let data = vec![128u8; 5 * 4];
        let buffer = PixelBuffer::new(1, 5, PixelLayout::Rgba, &data).unwrap();
        let path = scan_columns(&buffer, 3);
        assert_eq!(path.points(), &[Point::new(0, 0.0)]);
    }

    #[test]
    fn brightness_is_unweighted_channel_sum() {
        // Pure green (0,255,0) sums to 255; gray (90,90,90) sums to 270.
        // A luminance-weighted conversion would pick green instead.
        let mut data = image_with(1, 4, &[(0, 1)], [0, 255, 0, 255]);
        data[3 * 4..3 * 4 + 4].copy_from_slice(&[90, 90, 90, 255]);
        let buffer = PixelBuffer::new(1, 4, PixelLayout::Rgba, &data).unwrap();
        let path = scan_columns(&buffer, 3);
        assert_eq!(path.points(), &[Point::new(0, 3.0)]);
    }

    #[test]
    fn alpha_is_ignored() {
        let mut data = image_with(1, 3, &[(0, 2)], [100, 100, 100, 0]);
        data[4..8].copy_from_slice(&[50, 50, 50, 255]);
        let buffer = PixelBuffer::new(1, 3, PixelLayout::Rgba, &data).unwrap();
        let path = scan_columns(&buffer, 3);
        assert_eq!(path.points(), &[Point::new(0, 2.0)]);
    }

    #[test]
    fn rgb_layout_is_supported() {
        // 1x3 RGB, brightest in the middle.
        let data = [10, 10, 10, 250, 250, 250, 20, 20, 20];
        let buffer = PixelBuffer::new(1, 3, PixelLayout::Rgb, &data).unwrap();
        let path = scan_columns(&buffer, 3);
        assert_eq!(path.points(), &[Point::new(0, 1.0)]);
    }

    #[test]
    fn zero_height_yields_no_points() {
        let buffer = PixelBuffer::new(30, 0, PixelLayout::Rgba, &[]).unwrap();
        assert!(scan_columns(&buffer, 3).is_empty());
    }

    #[test]
    fn zero_width_yields_no_points() {
        let buffer = PixelBuffer::new(0, 30, PixelLayout::Rgba, &[]).unwrap();
        assert!(scan_columns(&buffer, 3).is_empty());
    }

    #[test]
    fn scanning_is_deterministic() {
        let data: Vec<u8> = (0..40u32 * 25 * 4)
            .map(|i| u8::try_from((i * 37 + i / 7) % 256).unwrap())
            .collect();
        let buffer = PixelBuffer::new(40, 25, PixelLayout::Rgba, &data).unwrap();
        assert_eq!(scan_columns(&buffer, 3), scan_columns(&buffer, 3));
    }
}
