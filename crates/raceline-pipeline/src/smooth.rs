//! Centered moving-average smoothing of the raw centerline.
//!
//! The window is symmetric around each point, so smoothing removes
//! vertical jitter without shifting the path horizontally. Near either
//! end the window is clipped to the available points rather than
//! padded or wrapped.

use crate::types::{Path, Point};

/// Replace each point's `y` with the mean `y` of the points within
/// `radius` indices of it.
///
/// The output has the same length and the same `x` values as the input.
/// A radius of zero returns an identical path.
#[must_use = "returns the smoothed path"]
pub fn smooth_path(path: &Path, radius: usize) -> Path {
    let points = path.points();
    let n = points.len();

    let smoothed = (0..n)
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = i.saturating_add(radius).min(n - 1);
            let window = &points[lo..=hi];
            let sum: f64 = window.iter().map(|p| p.y).sum();
            #[allow(clippy::cast_precision_loss)]
            let mean = sum / window.len() as f64;
            Point::new(points[i].x, mean)
        })
        .collect();

    Path::new(smoothed)
}
