//! Raster overlay: the racing line drawn over the analyzed image.
//!
//! Each segment is stroked on its own with a two-stop linear gradient
//! running from its start point to its end point, so color changes
//! smoothly along the line while each piece keeps its own turn shading.
//! Strokes use round caps and joins and are anti-aliased by `tiny-skia`.

use image::{ImageEncoder, Rgba, RgbaImage};
use raceline_pipeline::{RacingLine, Rgb, Segment};
use tiny_skia::{
    Color, ColorU8, GradientStop, LineCap, LineJoin, LinearGradient, Paint, PathBuilder, Pixmap,
    Point, SpreadMode, Stroke, Transform,
};

use crate::ExportError;

/// Composite `line` over a copy of `base`.
///
/// Segment coordinates are taken to be in `base` pixel space, which is
/// the case when `base` is the same working image the line was
/// generated from.
///
/// # Errors
///
/// Returns [`ExportError::Surface`] if `base` has zero width or height.
pub fn render_overlay(base: &RgbaImage, line: &RacingLine) -> Result<RgbaImage, ExportError> {
    let (width, height) = base.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::Surface { width, height })?;

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(base.pixels()) {
        let Rgba([r, g, b, a]) = *src;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    let mut drawn = 0usize;
    for segment in &line.segments {
        if stroke_segment(&mut pixmap, segment) {
            drawn += 1;
        }
    }
    tracing::debug!(
        width,
        height,
        segments = line.segments.len(),
        drawn,
        "rendered overlay"
    );

    // Back from premultiplied to straight alpha.
    let mut img = RgbaImage::new(width, height);
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(img)
}

/// Stroke one segment. Returns `false` if it was too degenerate to draw.
#[allow(clippy::cast_possible_truncation)]
fn stroke_segment(pixmap: &mut Pixmap, segment: &Segment) -> bool {
    let start = Point::from_xy(segment.start.x_f64() as f32, segment.start.y as f32);
    let end = Point::from_xy(segment.end.x_f64() as f32, segment.end.y as f32);

    let mut pb = PathBuilder::new();
    pb.move_to(start.x, start.y);
    pb.line_to(end.x, end.y);
    let Some(path) = pb.finish() else {
        return false;
    };

    let mut paint = Paint::default();
    paint.anti_alias = true;
    match LinearGradient::new(
        start,
        end,
        vec![
            GradientStop::new(0.0, color(segment.start_color)),
            GradientStop::new(1.0, color(segment.end_color)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    ) {
        Some(shader) => paint.shader = shader,
        None => {
            let Rgb { r, g, b } = segment.end_color;
            paint.set_color_rgba8(r, g, b, 255);
        }
    }

    let stroke = Stroke {
        width: segment.width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    true
}

fn color(rgb: Rgb) -> Color {
    Color::from_rgba8(rgb.r, rgb.g, rgb.b, 255)
}

/// Encode an image as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder rejects the image.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}
