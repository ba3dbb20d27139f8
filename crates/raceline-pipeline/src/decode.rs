//! Image loading ahead of the pipeline.
//!
//! Decodes raw file bytes (PNG, JPEG, BMP, WebP) into an RGBA image and
//! shrinks it so the longest side is at most the working resolution.
//! The result is both the surface the racing line is drawn on and the
//! pixel data the scanner reads, so analysis and output share one
//! coordinate space.
//!
//! This is not part of [`crate::generate`], which only ever sees an
//! already-decoded [`PixelBuffer`](crate::PixelBuffer).

use std::fmt;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::types::{PipelineError, RgbaImage};

/// Resampling filter used when downsampling.
///
/// Ordered from fastest/lowest-quality to slowest/highest-quality,
/// with a `None` variant to skip downsampling entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownsampleFilter {
    /// Disabled: analyze at full resolution regardless of size.
    None,
    /// Nearest-neighbor: fastest, blocky artifacts.
    Nearest,
    /// Bilinear interpolation: fast, close to what browsers use when
    /// drawing a scaled image onto a canvas.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom).
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Lanczos with 3 lobes: slowest, sharpest.
    Lanczos3,
}

impl DownsampleFilter {
    const fn to_image_filter(self) -> Option<image::imageops::FilterType> {
        match self {
            Self::None => Option::None,
            Self::Nearest => Some(image::imageops::FilterType::Nearest),
            Self::Triangle => Some(image::imageops::FilterType::Triangle),
            Self::CatmullRom => Some(image::imageops::FilterType::CatmullRom),
            Self::Gaussian => Some(image::imageops::FilterType::Gaussian),
            Self::Lanczos3 => Some(image::imageops::FilterType::Lanczos3),
        }
    }
}

impl fmt::Display for DownsampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Nearest => f.write_str("Nearest"),
            Self::Triangle => f.write_str("Triangle"),
            Self::CatmullRom => f.write_str("CatmullRom"),
            Self::Gaussian => f.write_str("Gaussian"),
            Self::Lanczos3 => f.write_str("Lanczos3"),
        }
    }
}

/// Decode `bytes` and fit the image within `working_resolution`.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded image"]
pub fn load_image(
    bytes: &[u8],
    working_resolution: u32,
    filter: DownsampleFilter,
) -> Result<RgbaImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let decoded = image::load_from_memory(bytes)?;
    tracing::debug!(
        width = decoded.width(),
        height = decoded.height(),
        input_bytes = bytes.len(),
        "decoded image"
    );

    let (image, applied) = downsample(&decoded, working_resolution, filter);
    if applied {
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            %filter,
            "downsampled to working resolution"
        );
    }
    Ok(image.into_rgba8())
}

/// Size of an image `width`x`height` after scaling its longest side
/// down to `max_dimension`, or `None` if it already fits.
///
/// Each axis is scaled by the same factor and rounded to the nearest
/// pixel, never below one.
#[must_use]
pub fn fitted_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let long_axis = width.max(height);
    if long_axis <= max_dimension || max_dimension == 0 {
        return None;
    }
    let scale = f64::from(max_dimension) / f64::from(long_axis);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let fit = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
    Some((fit(width), fit(height)))
}

/// Downsample a decoded image so the longest axis is at most
/// `max_dimension` pixels. Images are never upscaled.
///
/// Returns the (possibly unchanged) image and whether downsampling
/// was actually applied.
#[must_use]
pub fn downsample(
    image: &DynamicImage,
    max_dimension: u32,
    filter: DownsampleFilter,
) -> (DynamicImage, bool) {
    let Some(image_filter) = filter.to_image_filter() else {
        return (image.clone(), false);
    };
    let Some((w, h)) = fitted_dimensions(image.width(), image.height(), max_dimension) else {
        return (image.clone(), false);
    };
    (image.resize_exact(w, h, image_filter), true)
}
