//! Colorbars derived from drawing artifacts.
//!
//! A colorbar is attached to one panel or to the whole grid and is placed
//! beside its anchor at render time, so it never shrinks the panels. Tick
//! labels come from the mappable's boundaries and can be thinned afterwards
//! with [`TickSuppression`] without changing the mapped range.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::axes::{Mappable, TICK_LENGTH, TICK_PAD};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::figure::Figure;
use crate::format::Precision;
use crate::geometry::Rect;
use crate::output::{SvgElement, TextAnchor};

/// Colorbar direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Bar to the right of the anchor, values increasing upward.
    #[default]
    Vertical,
    /// Bar below the anchor, values increasing to the right.
    Horizontal,
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" | "v" => Ok(Self::Vertical),
            "horizontal" | "h" => Ok(Self::Horizontal),
            _ => Err(Error::InvalidColorbar(format!("unknown orientation {s:?}"))),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        })
    }
}

/// Which tick labels to hide. Ticks themselves are always drawn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSuppression {
    /// Hide the first label.
    pub hide_first: bool,
    /// Hide the last label.
    pub hide_last: bool,
    /// Hide every label at an odd index.
    pub every_other: bool,
    /// Hide labels at these indices; out-of-range indices are ignored.
    pub indices: Vec<usize>,
}

impl TickSuppression {
    /// Nothing hidden.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether label `index` of `count` is hidden.
    #[must_use]
    pub fn hides(&self, index: usize, count: usize) -> bool {
        (self.hide_first && index == 0)
            || (self.hide_last && index + 1 == count)
            || (self.every_other && index % 2 == 1)
            || self.indices.contains(&index)
    }
}

/// Colorbar configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorbarSpec {
    /// Direction.
    pub orientation: Orientation,
    /// Axis label.
    pub label: Option<String>,
    /// Bar length as a fraction of the anchor's matching side, in `(0, 1]`.
    pub shrink: f32,
    /// Gap to the anchor as a fraction of the anchor's width (vertical) or
    /// height (horizontal).
    pub pad: f32,
    /// Length-to-thickness ratio.
    pub aspect: f32,
    /// Tick label format.
    pub precision: Precision,
    /// Tick label font size.
    pub tick_label_size: f32,
    /// Axis label font size.
    pub label_size: f32,
    /// Tick label rotation in degrees, counter-clockwise.
    pub tick_rotation: f32,
    /// Labels to hide.
    pub suppression: TickSuppression,
}

impl Default for ColorbarSpec {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            label: None,
            shrink: 0.75,
            pad: 0.05,
            aspect: 20.0,
            precision: Precision::Default,
            tick_label_size: 16.0,
            label_size: 24.0,
            tick_rotation: 0.0,
            suppression: TickSuppression::default(),
        }
    }
}

impl ColorbarSpec {
    /// Set the orientation.
    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the axis label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the shrink factor.
    #[must_use]
    pub fn shrink(mut self, shrink: f32) -> Self {
        self.shrink = shrink;
        self
    }

    /// Set the pad fraction.
    #[must_use]
    pub fn pad(mut self, pad: f32) -> Self {
        self.pad = pad;
        self
    }

    /// Set the tick label precision.
    #[must_use]
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Set the tick label rotation.
    #[must_use]
    pub fn tick_rotation(mut self, degrees: f32) -> Self {
        self.tick_rotation = degrees;
        self
    }

    /// Set the tick label suppression.
    #[must_use]
    pub fn suppression(mut self, suppression: TickSuppression) -> Self {
        self.suppression = suppression;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.shrink.is_finite() && self.shrink > 0.0 && self.shrink <= 1.0) {
            return Err(Error::InvalidColorbar(format!(
                "shrink must be within (0, 1], got {}",
                self.shrink
            )));
        }
        if !(self.pad.is_finite() && self.pad >= 0.0) {
            return Err(Error::InvalidColorbar(format!(
                "pad must be non-negative, got {}",
                self.pad
            )));
        }
        if !(self.aspect.is_finite() && self.aspect > 0.0) {
            return Err(Error::InvalidColorbar(format!(
                "aspect must be positive, got {}",
                self.aspect
            )));
        }
        for (what, size) in [
            ("tick label size", self.tick_label_size),
            ("label size", self.label_size),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return Err(Error::InvalidColorbar(format!("{what} must be positive, got {size}")));
            }
        }
        if !self.tick_rotation.is_finite() {
            return Err(Error::InvalidColorbar(format!(
                "tick rotation must be finite, got {}",
                self.tick_rotation
            )));
        }
        Ok(())
    }
}

/// What a colorbar is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorbarAnchor {
    /// A single panel.
    Cell {
        /// Panel row.
        row: usize,
        /// Panel column.
        col: usize,
    },
    /// The whole grid (shared colorbar).
    Figure,
}

/// Handle to a colorbar stored in a [`Figure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorbarId(usize);

impl ColorbarId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in the figure's colorbar list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One colorbar tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarTick {
    /// Data value.
    pub value: f32,
    /// Formatted label.
    pub label: String,
    /// Whether the label is drawn.
    pub visible: bool,
}

/// A colorbar attached to a figure.
#[derive(Debug, Clone)]
pub struct Colorbar {
    anchor: ColorbarAnchor,
    mappable: Mappable,
    spec: ColorbarSpec,
    ticks: Vec<ColorbarTick>,
}

impl Colorbar {
    fn new(anchor: ColorbarAnchor, mappable: &Mappable, spec: &ColorbarSpec) -> Self {
        let values = mappable.ticks();
        let count = values.len();
        let ticks = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| ColorbarTick {
                value,
                label: spec.precision.format(value),
                visible: !spec.suppression.hides(i, count),
            })
            .collect();
        Self { anchor, mappable: mappable.clone(), spec: spec.clone(), ticks }
    }

    /// Anchor.
    #[must_use]
    pub fn anchor(&self) -> ColorbarAnchor {
        self.anchor
    }

    /// Source mapping.
    #[must_use]
    pub fn mappable(&self) -> &Mappable {
        &self.mappable
    }

    /// Configuration.
    #[must_use]
    pub fn spec(&self) -> &ColorbarSpec {
        &self.spec
    }

    /// All ticks, visible or not.
    #[must_use]
    pub fn ticks(&self) -> &[ColorbarTick] {
        &self.ticks
    }

    /// Labels that will be drawn, in tick order.
    #[must_use]
    pub fn visible_tick_labels(&self) -> Vec<&str> {
        self.ticks.iter().filter(|t| t.visible).map(|t| t.label.as_str()).collect()
    }

    /// Bar box for an anchor box.
    pub(crate) fn bar_rect(&self, host: Rect) -> Rect {
        let spec = &self.spec;
        match spec.orientation {
            Orientation::Vertical => {
                let length = host.height * spec.shrink;
                Rect::new(
                    host.right() + spec.pad * host.width,
                    host.y + (host.height - length) / 2.0,
                    length / spec.aspect,
                    length,
                )
            }
            Orientation::Horizontal => {
                let length = host.width * spec.shrink;
                Rect::new(
                    host.x + (host.width - length) / 2.0,
                    host.bottom() + spec.pad * host.height,
                    length,
                    length / spec.aspect,
                )
            }
        }
    }

    pub(crate) fn render(&self, host: Rect) -> Vec<SvgElement> {
        let spec = &self.spec;
        let bar = self.bar_rect(host);
        let vertical = spec.orientation == Orientation::Vertical;
        let mut out = Vec::new();

        // Unit position along the bar to a pixel box covering [start, end].
        let span = |start: f32, end: f32| {
            if vertical {
                let length = (end - start) * bar.height;
                Rect::new(bar.x, bar.bottom() - end * bar.height, bar.width, length)
            } else {
                Rect::new(bar.x + start * bar.width, bar.y, (end - start) * bar.width, bar.height)
            }
        };

        for (start, end, color) in self.mappable.color_spans() {
            let r = span(start, end);
            out.push(SvgElement::Rect {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                fill: Some(color),
                stroke: None,
                stroke_width: 0.0,
            });
        }

        let tip = if vertical { bar.width } else { bar.height };
        if let Some(color) = self.mappable.under_color() {
            let points = if vertical {
                vec![
                    (bar.x, bar.bottom()),
                    (bar.right(), bar.bottom()),
                    (bar.x + bar.width / 2.0, bar.bottom() + tip),
                ]
            } else {
                vec![
                    (bar.x, bar.y),
                    (bar.x, bar.bottom()),
                    (bar.x - tip, bar.y + bar.height / 2.0),
                ]
            };
            out.push(triangle(points, color));
        }
        if let Some(color) = self.mappable.over_color() {
            let points = if vertical {
                vec![
                    (bar.x, bar.y),
                    (bar.right(), bar.y),
                    (bar.x + bar.width / 2.0, bar.y - tip),
                ]
            } else {
                vec![
                    (bar.right(), bar.y),
                    (bar.right(), bar.bottom()),
                    (bar.right() + tip, bar.y + bar.height / 2.0),
                ]
            };
            out.push(triangle(points, color));
        }

        out.push(SvgElement::Rect {
            x: bar.x,
            y: bar.y,
            width: bar.width,
            height: bar.height,
            fill: None,
            stroke: Some(Rgba::BLACK),
            stroke_width: 1.0,
        });

        let size = spec.tick_label_size;
        let mut widest = 0usize;
        for tick in &self.ticks {
            let t = self.mappable.position(tick.value);
            let (x1, y1, x2, y2) = if vertical {
                let y = bar.bottom() - t * bar.height;
                (bar.right(), y, bar.right() + TICK_LENGTH, y)
            } else {
                let x = bar.x + t * bar.width;
                (x, bar.bottom(), x, bar.bottom() + TICK_LENGTH)
            };
            out.push(SvgElement::Line { x1, y1, x2, y2, stroke: Rgba::BLACK, stroke_width: 1.0 });

            if !tick.visible {
                continue;
            }
            widest = widest.max(tick.label.chars().count());
            let (x, y, anchor) = if vertical {
                (x2 + TICK_PAD, y2, TextAnchor::Start)
            } else {
                (x2, y2 + TICK_PAD + size * 0.6, TextAnchor::Middle)
            };
            out.push(SvgElement::Text {
                x,
                y,
                text: tick.label.clone(),
                font_size: size,
                fill: Rgba::BLACK,
                anchor,
                rotation: spec.tick_rotation,
                halo: None,
            });
        }

        if let Some(label) = &spec.label {
            let (x, y, rotation) = if vertical {
                let offset = widest as f32 * size * 0.6 + spec.label_size;
                (bar.right() + TICK_LENGTH + TICK_PAD + offset, bar.center().y, 90.0)
            } else {
                let offset = size * 1.2 + spec.label_size;
                (bar.center().x, bar.bottom() + TICK_LENGTH + TICK_PAD + offset, 0.0)
            };
            out.push(SvgElement::Text {
                x,
                y,
                text: label.clone(),
                font_size: spec.label_size,
                fill: Rgba::BLACK,
                anchor: TextAnchor::Middle,
                rotation,
                halo: None,
            });
        }
        out
    }
}

fn triangle(points: Vec<(f32, f32)>, fill: Rgba) -> SvgElement {
    SvgElement::Polyline {
        points,
        stroke: Some(Rgba::BLACK),
        stroke_width: 1.0,
        fill: Some(fill),
        dash: None,
    }
}

/// Attach a colorbar for `mappable` to a panel or to the whole figure.
///
/// # Errors
///
/// Returns [`Error::InvalidColorbar`] for an invalid spec and
/// [`Error::CellOutOfBounds`] if the anchor cell is outside the grid.
pub fn make_colorbar(
    figure: &mut Figure,
    anchor: ColorbarAnchor,
    mappable: &Mappable,
    spec: &ColorbarSpec,
) -> Result<ColorbarId> {
    spec.validate()?;
    if let ColorbarAnchor::Cell { row, col } = anchor {
        figure.axes().cell(row, col)?;
    }

    let colorbar = Colorbar::new(anchor, mappable, spec);
    let visible = colorbar.visible_tick_labels().len();
    if visible == 0 {
        warn!(ticks = colorbar.ticks().len(), "colorbar has no visible tick labels");
    }
    debug!(
        ?anchor,
        orientation = %spec.orientation,
        ticks = colorbar.ticks().len(),
        visible,
        "colorbar"
    );

    Ok(figure.push_colorbar(colorbar))
}
