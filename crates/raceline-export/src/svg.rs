//! SVG export serializer.
//!
//! Converts a racing line into an SVG document sized to the analyzed
//! image. Each segment becomes a `<line>` stroked with its own
//! `<linearGradient>` (in user space, running from the segment's start
//! point to its end point), mirroring how the raster overlay shades it.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use raceline_pipeline::{RacingLine, Segment};
use svg::Document;
use svg::node::Text;
use svg::node::element::{Definitions, Description, Line, LinearGradient, Stop, Title};

/// Metadata to embed in the SVG document.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,
}

/// Id of the gradient used by segment `index`.
fn gradient_id(index: usize) -> String {
    format!("segment-{index}")
}

fn segment_gradient(index: usize, segment: &Segment) -> LinearGradient {
    LinearGradient::new()
        .set("id", gradient_id(index))
        .set("gradientUnits", "userSpaceOnUse")
        .set("x1", segment.start.x)
        .set("y1", segment.start.y)
        .set("x2", segment.end.x)
        .set("y2", segment.end.y)
        .add(
            Stop::new()
                .set("offset", 0)
                .set("stop-color", segment.start_color.to_hex()),
        )
        .add(
            Stop::new()
                .set("offset", 1)
                .set("stop-color", segment.end_color.to_hex()),
        )
}

fn segment_line(index: usize, segment: &Segment) -> Line {
    Line::new()
        .set("x1", segment.start.x)
        .set("y1", segment.start.y)
        .set("x2", segment.end.x)
        .set("y2", segment.end.y)
        .set("stroke", format!("url(#{})", gradient_id(index)))
        .set("stroke-width", segment.width)
        .set("stroke-linecap", "round")
        .set("stroke-linejoin", "round")
}

/// Serialize a racing line into an SVG document string.
///
/// The `viewBox` matches the line's dimensions so the document can be
/// laid over the analyzed image at 1:1.
///
/// # Examples
///
/// ```
/// use raceline_export::{SvgMetadata, to_svg};
/// use raceline_pipeline::{Dimensions, Path, RacingLine};
///
/// let line = RacingLine {
///     path: Path::default(),
///     segments: vec![],
///     dimensions: Dimensions { width: 800, height: 600 },
///     line_width: 8.0,
/// };
/// let metadata = SvgMetadata {
///     title: Some("monza"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&line, &metadata);
/// assert!(svg.contains("<title>monza</title>"));
/// assert!(svg.contains(r#"viewBox="0 0 800 600""#));
/// ```
#[must_use]
pub fn to_svg(line: &RacingLine, metadata: &SvgMetadata<'_>) -> String {
    let w = line.dimensions.width;
    let h = line.dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if !line.segments.is_empty() {
        let defs = line
            .segments
            .iter()
            .enumerate()
            .fold(Definitions::new(), |defs, (i, segment)| {
                defs.add(segment_gradient(i, segment))
            });
        doc = doc.add(defs);
    }

    for (i, segment) in line.segments.iter().enumerate() {
        doc = doc.add(segment_line(i, segment));
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
