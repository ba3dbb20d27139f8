//! raceline-export: Overlay rasterization and format serializers (sans-IO)
//!
//! Turns a [`RacingLine`](raceline_pipeline::RacingLine) into something
//! a person can download: the line composited over the analyzed image
//! (PNG), or the segments alone as an SVG document. Every function
//! returns bytes or a string; writing files is up to the caller.

pub mod raster;
pub mod svg;

pub use raster::{encode_png, render_overlay};
pub use svg::{SvgMetadata, to_svg};

/// Errors that can occur while exporting a racing line.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The drawing surface could not be created (zero width or height).
    #[error("cannot create a {width}x{height} drawing surface")]
    Surface {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}
