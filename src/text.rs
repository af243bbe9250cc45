//! Free text annotations on map panels.
//!
//! One entry point, [`plot_text`], covers plain annotations, point values
//! and marked places; the differences live in [`TextStyle`].

use tracing::debug;

use crate::axes::{Axes, Layer};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::format::Precision;
use crate::geometry::Point;
use crate::output::TextAnchor;

/// Marker glyph drawn at an annotated point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkerShape {
    /// Filled circle.
    #[default]
    Circle,
    /// Filled square.
    Square,
    /// Upward triangle.
    Triangle,
}

/// A point marker.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marker {
    /// Glyph.
    pub shape: MarkerShape,
    /// Diameter in pixels.
    pub size: f32,
    /// Fill color.
    pub color: Rgba,
}

impl Default for Marker {
    fn default() -> Self {
        Self { shape: MarkerShape::Circle, size: 5.0, color: Rgba::BLACK }
    }
}

/// Appearance of a text annotation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStyle {
    /// Text color.
    pub color: Rgba,
    /// Font size in pixels.
    pub font_size: f32,
    /// Text offset from the annotated point, in degrees (lon, lat).
    pub offset: Point,
    /// Horizontal alignment at the text position.
    pub anchor: TextAnchor,
    /// Marker drawn at the annotated point itself.
    pub marker: Option<Marker>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            font_size: 10.0,
            offset: Point::new(0.0, 0.0),
            anchor: TextAnchor::Start,
            marker: None,
        }
    }
}

impl TextStyle {
    /// Larger text nudged slightly north of its point.
    #[must_use]
    pub fn annotation() -> Self {
        Self { font_size: 16.0, offset: Point::new(0.0, 0.05), ..Self::default() }
    }

    /// A marked place with its name up and to the left of the marker.
    #[must_use]
    pub fn place() -> Self {
        Self { offset: Point::new(-0.3, 0.2), marker: Some(Marker::default()), ..Self::default() }
    }

    /// Set the color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Set the font size.
    #[must_use]
    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the offset in degrees.
    #[must_use]
    pub fn offset(mut self, dlon: f32, dlat: f32) -> Self {
        self.offset = Point::new(dlon, dlat);
        self
    }

    /// Set the anchor.
    #[must_use]
    pub fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the marker.
    #[must_use]
    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(Error::InvalidOption(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !(self.offset.x.is_finite() && self.offset.y.is_finite()) {
            return Err(Error::InvalidOption("text offset must be finite".to_string()));
        }
        if let Some(marker) = self.marker {
            if !(marker.size.is_finite() && marker.size > 0.0) {
                return Err(Error::InvalidOption(format!(
                    "marker size must be positive, got {}",
                    marker.size
                )));
            }
        }
        Ok(())
    }
}

/// A text annotation recorded on a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMark {
    /// Annotated point as (lon, lat).
    pub point: Point,
    /// Text content.
    pub text: String,
    /// Appearance.
    pub style: TextStyle,
}

impl TextMark {
    /// Where the text itself is drawn, as (lon, lat).
    #[must_use]
    pub fn text_position(&self) -> Point {
        Point::new(self.point.x + self.style.offset.x, self.point.y + self.style.offset.y)
    }
}

/// Place a text annotation at `(x, y)` in lon/lat.
///
/// # Errors
///
/// Returns [`Error::InvalidOption`] for a non-finite position or an invalid
/// style.
pub fn plot_text(axes: &mut Axes, x: f32, y: f32, text: &str, style: &TextStyle) -> Result<()> {
    if !(x.is_finite() && y.is_finite()) {
        return Err(Error::InvalidOption(format!("text position ({x}, {y}) must be finite")));
    }
    style.validate()?;

    debug!(x, y, text, "text annotation");
    axes.push_layer(Layer::Text(TextMark {
        point: Point::new(x, y),
        text: text.to_string(),
        style: style.clone(),
    }));
    Ok(())
}

/// Annotate a point with a formatted value.
///
/// # Errors
///
/// Same as [`plot_text`].
pub fn plot_value(
    axes: &mut Axes,
    x: f32,
    y: f32,
    value: f32,
    precision: Precision,
    style: &TextStyle,
) -> Result<()> {
    plot_text(axes, x, y, &precision.format(value), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::MapExtent;
    use approx::assert_abs_diff_eq;

    fn marks(axes: &Axes) -> Vec<&TextMark> {
        axes.layers()
            .iter()
            .filter_map(|layer| match layer {
                Layer::Text(mark) => Some(mark),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_plot_text_records_mark() {
        let mut axes = Axes::new(MapExtent::default());
        plot_text(&mut axes, -105.0, 43.0, "Casper", &TextStyle::default()).unwrap();

        let marks = marks(&axes);
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].text, "Casper");
        assert_eq!(marks[0].text_position(), Point::new(-105.0, 43.0));
    }

    #[test]
    fn test_annotation_offsets_north() {
        let mut axes = Axes::new(MapExtent::default());
        plot_text(&mut axes, -105.0, 43.0, "note", &TextStyle::annotation()).unwrap();

        let mark = marks(&axes)[0];
        assert_eq!(mark.style.font_size, 16.0);
        assert_abs_diff_eq!(mark.text_position().y, 43.05, epsilon = 1e-4);
    }

    #[test]
    fn test_place_has_marker() {
        let style = TextStyle::place();
        assert_eq!(style.marker, Some(Marker::default()));
        assert_eq!(style.offset, Point::new(-0.3, 0.2));
    }

    #[test]
    fn test_plot_value_formats() {
        let mut axes = Axes::new(MapExtent::default());
        let style = TextStyle::default();
        plot_value(&mut axes, -110.0, 41.0, 0.456, Precision::Decimals(2), &style).unwrap();
        plot_value(&mut axes, -110.0, 42.0, 12.9, Precision::Integer, &style).unwrap();

        let texts: Vec<_> = marks(&axes).iter().map(|m| m.text.clone()).collect();
        assert_eq!(texts, vec!["0.46", "12"]);
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let mut axes = Axes::new(MapExtent::default());
        let tiny = Marker { size: -1.0, ..Marker::default() };
        let bad_styles = [
            TextStyle::default().font_size(0.0),
            TextStyle::default().offset(f32::INFINITY, 0.0),
            TextStyle::default().marker(tiny),
        ];
        for style in &bad_styles {
            let err = plot_text(&mut axes, -105.0, 43.0, "x", style).unwrap_err();
            assert!(matches!(err, Error::InvalidOption(_)), "{err}");
        }
        let err = plot_text(&mut axes, f32::NAN, 43.0, "x", &TextStyle::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
        assert!(axes.layers().is_empty());
    }
}
