//! Turn estimation from local heading change.
//!
//! The absolute difference between the heading into a point and the
//! heading out of it approximates curvature without an arc-length
//! parametrization. Multiplying by a gain and clamping to `[0, 1]`
//! turns typical deltas (radians) into a value usable for coloring.
//!
//! The difference is taken as-is, without unwrapping across the ±π
//! boundary. A path that doubles back near ±π therefore reports an
//! intensity that may be too high or too low.

use crate::types::{Path, Point};

/// Direction of travel from `from` to `to`, in radians (`atan2`).
///
/// Returns `0.0` when the two points coincide.
#[must_use]
pub fn heading(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x_f64() - from.x_f64())
}

/// Turn intensity for every segment of `path`.
///
/// Entry `i - 1` belongs to the segment from point `i - 1` to point
/// `i` and compares its heading with the heading of the following
/// segment. The final segment has no successor and looks ahead to its
/// own end point, which gives an outgoing heading of zero.
///
/// Returns `path.len() - 1` values in `[0, 1]`, or none for paths
/// shorter than two points.
#[must_use = "returns one intensity per segment"]
pub fn turn_intensities(path: &Path, gain: f64) -> Vec<f64> {
    let points = path.points();
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    (1..n)
        .map(|i| {
            let a = points[i - 1];
            let b = points[i];
            let c = points[(i + 1).min(n - 1)];
            let delta = (heading(b, c) - heading(a, b)).abs();
            (delta * gain).clamp(0.0, 1.0)
        })
        .collect()
}
