//! SVG output encoder.
//!
//! Figures are written as vector SVG. Raster layers (filled fields) are
//! embedded as base64 PNG images; map panels clip their contents with a
//! `clipPath` so nothing spills outside the extent.

use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// SVG document builder.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    width: u32,
    height: u32,
    /// Background color (None for transparent)
    background: Option<Rgba>,
    elements: Vec<SvgElement>,
}

/// An SVG element.
///
/// Field names are self-documenting and match SVG attribute names.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Rectangle
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgba>,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Circle
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Rgba,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Line
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Rgba,
        stroke_width: f32,
    },
    /// Polyline, or polygon when `fill` is set
    Polyline {
        points: Vec<(f32, f32)>,
        stroke: Option<Rgba>,
        stroke_width: f32,
        fill: Option<Rgba>,
        /// `stroke-dasharray` value
        dash: Option<String>,
    },
    /// Text, rotated by `rotation` degrees about its anchor point
    Text {
        x: f32,
        y: f32,
        text: String,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
        rotation: f32,
        /// Outline painted under the glyphs, masking what lies beneath
        halo: Option<Rgba>,
    },
    /// Embedded raster image (data URI)
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        href: String,
    },
    /// Group of elements, optionally clipped to a rectangle
    Group {
        clip: Option<Rect>,
        children: Vec<SvgElement>,
    },
}

impl SvgElement {
    /// Plain text with no rotation or halo.
    #[must_use]
    pub fn text(
        x: f32,
        y: f32,
        text: impl Into<String>,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
    ) -> Self {
        Self::Text {
            x,
            y,
            text: text.into(),
            font_size,
            fill,
            anchor,
            rotation: 0.0,
            halo: None,
        }
    }

    /// Embed a framebuffer as a PNG image stretched over `rect`.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn image(fb: &Framebuffer, rect: Rect) -> Result<Self> {
        let png_bytes = super::PngEncoder::to_bytes(fb)?;
        let href = format!("data:image/png;base64,{}", STANDARD.encode(&png_bytes));
        Ok(Self::Image {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            href,
        })
    }
}

/// Text anchor position for SVG text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAnchor {
    /// Align text start at position (left-aligned for LTR)
    #[default]
    Start,
    /// Center text at position
    Middle,
    /// Align text end at position (right-aligned for LTR)
    End,
}

impl SvgEncoder {
    /// Create a new SVG encoder with given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, background: Some(Rgba::WHITE), elements: Vec::new() }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Add a raw element.
    pub fn add_element(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    /// Add several elements in order.
    pub fn extend<I: IntoIterator<Item = SvgElement>>(&mut self, elements: I) {
        self.elements.extend(elements);
    }

    /// Top-level elements added so far.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);

        let (w, h) = (self.width, self.height);
        let _ = write!(svg, r#"<svg xmlns="{SVG_NS}" xmlns:xlink="{XLINK_NS}""#);
        let _ = writeln!(svg, r#" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#);

        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{}"/>"#, bg.to_css());
        }

        let mut clip_ids = 0;
        for element in &self.elements {
            write_element(&mut svg, element, 1, &mut clip_ids);
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

fn stroke_attr(stroke: Option<Rgba>, stroke_width: f32) -> String {
    stroke
        .map(|s| format!(r#" stroke="{}" stroke-width="{stroke_width}""#, s.to_css()))
        .unwrap_or_default()
}

fn fill_attr(fill: Option<Rgba>) -> String {
    fill.map_or_else(|| "none".to_string(), Rgba::to_css)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn write_element(svg: &mut String, element: &SvgElement, depth: usize, clip_ids: &mut usize) {
    let indent = "  ".repeat(depth);
    match element {
        SvgElement::Rect { x, y, width, height, fill, stroke, stroke_width } => {
            let _ = writeln!(
                svg,
                r#"{indent}<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}"{}/>"#,
                fill_attr(*fill),
                stroke_attr(*stroke, *stroke_width)
            );
        }
        SvgElement::Circle { cx, cy, r, fill, stroke, stroke_width } => {
            let _ = writeln!(
                svg,
                r#"{indent}<circle cx="{cx}" cy="{cy}" r="{r}" fill="{}"{}/>"#,
                fill.to_css(),
                stroke_attr(*stroke, *stroke_width)
            );
        }
        SvgElement::Line { x1, y1, x2, y2, stroke, stroke_width } => {
            let _ = write!(svg, r#"{indent}<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}""#);
            let _ = writeln!(
                svg,
                r#" stroke="{}" stroke-width="{stroke_width}"/>"#,
                stroke.to_css()
            );
        }
        SvgElement::Polyline { points, stroke, stroke_width, fill, dash } => {
            let points_str = points
                .iter()
                .map(|(x, y)| format!("{x},{y}"))
                .collect::<Vec<_>>()
                .join(" ");
            let tag = if fill.is_some() { "polygon" } else { "polyline" };
            let fill_css = fill_attr(*fill);
            let stroke_css = stroke_attr(*stroke, *stroke_width);
            let dash_attr = dash
                .as_ref()
                .map(|d| format!(r#" stroke-dasharray="{d}""#))
                .unwrap_or_default();
            let _ = write!(svg, r#"{indent}<{tag} points="{points_str}" fill="{fill_css}""#);
            let _ = writeln!(svg, r#"{stroke_css}{dash_attr} stroke-linejoin="round"/>"#);
        }
        SvgElement::Text { x, y, text, font_size, fill, anchor, rotation, halo } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let transform = if *rotation == 0.0 {
                String::new()
            } else {
                format!(r#" transform="rotate({} {x} {y})""#, -rotation)
            };
            let halo_attr = halo
                .map(|h| {
                    format!(
                        r#" stroke="{}" stroke-width="{}" paint-order="stroke""#,
                        h.to_css(),
                        font_size * 0.3
                    )
                })
                .unwrap_or_default();
            let _ = write!(
                svg,
                r#"{indent}<text x="{x}" y="{y}" font-size="{font_size}" fill="{}""#,
                fill.to_css()
            );
            let _ = write!(svg, r#" text-anchor="{anchor_str}" dominant-baseline="middle""#);
            let _ = writeln!(
                svg,
                r#" font-family="sans-serif"{transform}{halo_attr}>{}</text>"#,
                escape_xml(text)
            );
        }
        SvgElement::Image { x, y, width, height, href } => {
            let _ = write!(svg, r#"{indent}<image x="{x}" y="{y}" width="{width}""#);
            let _ = writeln!(
                svg,
                r#" height="{height}" preserveAspectRatio="none" xlink:href="{href}"/>"#
            );
        }
        SvgElement::Group { clip, children } => {
            match clip {
                Some(rect) => {
                    *clip_ids += 1;
                    let id = *clip_ids;
                    let _ = write!(svg, r#"{indent}<clipPath id="clip{id}">"#);
                    let _ = writeln!(
                        svg,
                        r#"<rect x="{}" y="{}" width="{}" height="{}"/></clipPath>"#,
                        rect.x, rect.y, rect.width, rect.height
                    );
                    let _ = writeln!(svg, r#"{indent}<g clip-path="url(#clip{id})">"#);
                }
                None => {
                    let _ = writeln!(svg, "{indent}<g>");
                }
            }
            for child in children {
                write_element(svg, child, depth + 1, clip_ids);
            }
            let _ = writeln!(svg, "{indent}</g>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_one(element: SvgElement) -> String {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.add_element(element);
        encoder.render()
    }

    #[test]
    fn test_svg_encoder_new() {
        let svg = SvgEncoder::new(800, 600).render();

        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("height=\"600\""));
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_svg_rect_outline_only() {
        let svg = render_one(SvgElement::Rect {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
            fill: None,
            stroke: Some(Rgba::BLACK),
            stroke_width: 2.0,
        });

        assert!(svg.contains(r#"<rect x="10" y="20" width="30" height="40" fill="none""#));
        assert!(svg.contains("stroke=\"rgb(0,0,0)\""));
        assert!(svg.contains("stroke-width=\"2\""));
    }

    #[test]
    fn test_svg_dashed_polyline() {
        let svg = render_one(SvgElement::Polyline {
            points: vec![(0.0, 0.0), (50.0, 100.0), (100.0, 0.0)],
            stroke: Some(Rgba::GREEN),
            stroke_width: 1.5,
            fill: None,
            dash: Some("6,3".to_string()),
        });

        assert!(svg.contains("<polyline"));
        assert!(svg.contains("points=\"0,0 50,100 100,0\""));
        assert!(svg.contains("fill=\"none\""));
        assert!(svg.contains("stroke-dasharray=\"6,3\""));
    }

    #[test]
    fn test_svg_polygon() {
        let svg = render_one(SvgElement::Polyline {
            points: vec![(0.0, 0.0), (50.0, 100.0), (100.0, 0.0)],
            stroke: None,
            stroke_width: 0.0,
            fill: Some(Rgba::RED),
            dash: None,
        });

        assert!(svg.contains("<polygon"));
        assert!(!svg.contains("stroke="));
    }

    #[test]
    fn test_svg_rotated_text() {
        let mut text =
            SvgElement::text(10.0, 50.0, "105°W", 12.0, Rgba::BLACK, TextAnchor::Middle);
        if let SvgElement::Text { rotation, .. } = &mut text {
            *rotation = 45.0;
        }
        let svg = render_one(text);

        assert!(svg.contains("105°W"));
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("transform=\"rotate(-45 10 50)\""));
    }

    #[test]
    fn test_svg_unrotated_text_has_no_transform() {
        let text = SvgElement::text(0.0, 0.0, "40°N", 12.0, Rgba::BLACK, TextAnchor::End);
        let svg = render_one(text);
        assert!(!svg.contains("transform"));
    }

    #[test]
    fn test_svg_text_halo() {
        let svg = render_one(SvgElement::Text {
            x: 5.0,
            y: 5.0,
            text: "0.5".to_string(),
            font_size: 10.0,
            fill: Rgba::BLACK,
            anchor: TextAnchor::Middle,
            rotation: 0.0,
            halo: Some(Rgba::WHITE),
        });
        assert!(svg.contains("paint-order=\"stroke\""));
        assert!(svg.contains("stroke=\"rgb(255,255,255)\""));
    }

    #[test]
    fn test_svg_text_escaping() {
        let label = "<script>A & \"B\"</script>";
        let text = SvgElement::text(10.0, 50.0, label, 12.0, Rgba::BLACK, TextAnchor::Start);
        let svg = render_one(text);

        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;"));
        assert!(svg.contains("&amp;"));
        assert!(svg.contains("&quot;"));
    }

    #[test]
    fn test_svg_transparent_background() {
        let svg = SvgEncoder::new(100, 100).background(None).render();
        assert_eq!(svg.matches("<rect").count(), 0);
    }

    #[test]
    fn test_svg_clip_groups_get_unique_ids() {
        let mut encoder = SvgEncoder::new(100, 100);
        for _ in 0..2 {
            encoder.add_element(SvgElement::Group {
                clip: Some(Rect::new(0.0, 0.0, 50.0, 50.0)),
                children: vec![SvgElement::Circle {
                    cx: 10.0,
                    cy: 10.0,
                    r: 5.0,
                    fill: Rgba::RED,
                    stroke: None,
                    stroke_width: 1.0,
                }],
            });
        }
        let svg = encoder.render();

        assert!(svg.contains(r#"<clipPath id="clip1">"#));
        assert!(svg.contains(r#"<g clip-path="url(#clip2)">"#));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("</g>").count(), 2);
    }

    #[test]
    fn test_svg_embedded_image() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.clear(Rgba::RED);

        let svg = render_one(SvgElement::image(&fb, Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap());
        assert!(svg.contains("<image"));
        assert!(svg.contains("data:image/png;base64,"));
        assert!(svg.contains("width=\"40\""));
    }

    #[test]
    fn test_svg_write_to_file() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.extend([SvgElement::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 100.0,
            y2: 100.0,
            stroke: Rgba::BLACK,
            stroke_width: 1.0,
        }]);
        assert_eq!(encoder.elements().len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        encoder.write_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<line"));
        assert!(content.contains("</svg>"));
    }
}
