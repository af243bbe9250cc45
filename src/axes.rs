//! Map panels.
//!
//! An [`Axes`] is one drawable surface: a map extent, its coordinate ticks,
//! and an ordered stack of [`Layer`]s. Drawing operations record layers and
//! hand back artifacts ([`Mappable`], [`ContourSet`]) that decorators such
//! as colorbars and contour labels are built from. Rendering happens once,
//! when the owning figure is written out.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::color::Rgba;
use crate::contour::{
    validate_levels, ContourLabelFormat, ContourLabels, ContourLine, ContourSet, Levels, LineStyle,
};
use crate::error::{Error, Result};
use crate::extent::{MapExtent, Projection, TickSpacing};
use crate::field::Field;
use crate::format::{format_lat, format_lon};
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Rect};
use crate::labels::{LabelDecision, XEdge, YEdge};
use crate::output::{SvgElement, TextAnchor};
use crate::scale::{Colormap, Norm, UnitNorm};
use crate::text::{MarkerShape, TextMark};

/// Tick mark length in pixels.
pub(crate) const TICK_LENGTH: f32 = 5.0;

/// Gap between a tick mark and its label, in pixels.
pub(crate) const TICK_PAD: f32 = 3.0;

/// Color steps used to draw a continuous mapping.
const GRADIENT_STEPS: usize = 64;

/// Whether values outside the level range are painted with the end colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Extend {
    /// Out-of-range values stay unpainted.
    #[default]
    Neither,
    /// Values below the first level take the lowest color.
    Min,
    /// Values above the last level take the highest color.
    Max,
    /// Both ends are extended.
    Both,
}

impl Extend {
    /// Whether values below the range are painted.
    #[must_use]
    pub const fn lower(self) -> bool {
        matches!(self, Self::Min | Self::Both)
    }

    /// Whether values above the range are painted.
    #[must_use]
    pub const fn upper(self) -> bool {
        matches!(self, Self::Max | Self::Both)
    }
}

impl FromStr for Extend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neither" | "none" => Ok(Self::Neither),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "both" => Ok(Self::Both),
            _ => Err(Error::InvalidStyle(format!("unknown extend mode {s:?}"))),
        }
    }
}

impl fmt::Display for Extend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Neither => "neither",
            Self::Min => "min",
            Self::Max => "max",
            Self::Both => "both",
        })
    }
}

/// Appearance of filled contours.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FillStyle {
    /// Colormap.
    pub colormap: Colormap,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Out-of-range handling.
    pub extend: Extend,
    /// Placement of levels along the colormap.
    pub norm: Norm,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            colormap: Colormap::Rainbow,
            alpha: 0.8,
            extend: Extend::Neither,
            norm: Norm::Linear,
        }
    }
}

impl FillStyle {
    /// Set the colormap.
    #[must_use]
    pub fn colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    /// Set the opacity.
    #[must_use]
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the out-of-range handling.
    #[must_use]
    pub fn extend(mut self, extend: Extend) -> Self {
        self.extend = extend;
        self
    }

    /// Set the norm.
    #[must_use]
    pub fn norm(mut self, norm: Norm) -> Self {
        self.norm = norm;
        self
    }
}

/// Appearance of scattered point values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScatterStyle {
    /// Colormap.
    pub colormap: Colormap,
    /// Marker area in square pixels.
    pub size: f32,
    /// Marker outline.
    pub edge_color: Option<Rgba>,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Value placement along the colormap.
    pub norm: Norm,
    /// Value range mapped onto the colormap; the data range when `None`.
    pub range: Option<(f32, f32)>,
}

impl Default for ScatterStyle {
    fn default() -> Self {
        Self {
            colormap: Colormap::Rainbow,
            size: 20.0,
            edge_color: Some(Rgba::BLACK),
            alpha: 1.0,
            norm: Norm::Linear,
            range: None,
        }
    }
}

impl ScatterStyle {
    /// Set the colormap.
    #[must_use]
    pub fn colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    /// Set the marker area.
    #[must_use]
    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Set a fixed value range.
    #[must_use]
    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Marker radius in pixels.
    fn radius(&self) -> f32 {
        (self.size / std::f32::consts::PI).sqrt()
    }
}

fn validate_alpha(alpha: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(Error::InvalidOption(format!("alpha must be within [0, 1], got {alpha}")));
    }
    Ok(())
}

/// Value-to-color mapping produced by a drawing operation.
///
/// Discrete mappings (filled contours) color whole bins between
/// consecutive boundaries; continuous ones (scatter) interpolate.
#[derive(Debug, Clone)]
pub struct Mappable {
    boundaries: Vec<f32>,
    colormap: Colormap,
    norm: Norm,
    unit: UnitNorm,
    alpha: f32,
    extend: Extend,
    discrete: bool,
}

impl Mappable {
    /// A binned mapping over level boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevels`] for fewer than two boundaries,
    /// non-increasing or non-finite boundaries, or non-positive boundaries
    /// under [`Norm::Log`]; [`Error::InvalidOption`] for alpha outside `[0, 1]`.
    pub fn discrete(
        boundaries: Vec<f32>,
        colormap: Colormap,
        norm: Norm,
        alpha: f32,
        extend: Extend,
    ) -> Result<Self> {
        validate_alpha(alpha)?;
        validate_levels(&boundaries)?;
        let (first, last) = match (boundaries.first(), boundaries.last()) {
            (Some(&first), Some(&last)) if boundaries.len() >= 2 => (first, last),
            _ => {
                return Err(Error::InvalidLevels(
                    "filled contours need at least two levels".to_string(),
                ))
            }
        };
        let unit = unit_norm(norm, (first, last))?;
        Ok(Self { boundaries, colormap, norm, unit, alpha, extend, discrete: true })
    }

    /// A continuous mapping over `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevels`] for an empty or non-finite domain, or
    /// a non-positive one under [`Norm::Log`].
    pub fn continuous(
        domain: (f32, f32),
        colormap: Colormap,
        norm: Norm,
        alpha: f32,
    ) -> Result<Self> {
        validate_alpha(alpha)?;
        if !(domain.0.is_finite() && domain.1.is_finite() && domain.0 < domain.1) {
            return Err(Error::InvalidLevels(format!(
                "invalid value range {}..{}",
                domain.0, domain.1
            )));
        }
        let unit = unit_norm(norm, domain)?;
        Ok(Self {
            boundaries: vec![domain.0, domain.1],
            colormap,
            norm,
            unit,
            alpha,
            extend: Extend::Neither,
            discrete: false,
        })
    }

    /// Level boundaries (discrete) or the `[min, max]` domain (continuous).
    #[must_use]
    pub fn boundaries(&self) -> &[f32] {
        &self.boundaries
    }

    /// First and last boundary.
    #[must_use]
    pub fn domain(&self) -> (f32, f32) {
        let first = self.boundaries.first().copied().unwrap_or_default();
        let last = self.boundaries.last().copied().unwrap_or_default();
        (first, last)
    }

    /// Colormap.
    #[must_use]
    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    /// Norm.
    #[must_use]
    pub fn norm(&self) -> Norm {
        self.norm
    }

    /// Opacity.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Out-of-range handling.
    #[must_use]
    pub fn extend(&self) -> Extend {
        self.extend
    }

    /// Whether the mapping is binned.
    #[must_use]
    pub fn is_discrete(&self) -> bool {
        self.discrete
    }

    /// Position of a value along the colormap, clamped to `[0, 1]`.
    #[must_use]
    pub fn position(&self, value: f32) -> f32 {
        self.unit.apply(value).clamp(0.0, 1.0)
    }

    /// Default tick values: every boundary, or five values across a
    /// continuous domain.
    #[must_use]
    pub fn ticks(&self) -> Vec<f32> {
        if self.discrete {
            return self.boundaries.clone();
        }
        let (lo, hi) = self.domain();
        (0..5)
            .map(|i| {
                let t = i as f32 / 4.0;
                match self.norm {
                    Norm::Linear => lo + (hi - lo) * t,
                    Norm::Log => lo * (hi / lo).powf(t),
                }
            })
            .collect()
    }

    /// Color for a value, or `None` when it stays unpainted.
    #[must_use]
    pub fn color_for(&self, value: f32) -> Option<Rgba> {
        if !value.is_finite() {
            return None;
        }
        if !self.discrete {
            return Some(self.colormap.at(self.position(value)).with_opacity(self.alpha));
        }

        let (first, last) = self.domain();
        if value < first {
            return self.under_color();
        }
        if value > last {
            return self.over_color();
        }
        let bins = self.boundaries.len() - 1;
        let k = self.boundaries.partition_point(|&b| b <= value).saturating_sub(1).min(bins - 1);
        Some(self.bin_color(k))
    }

    /// Color below the range, when extended.
    #[must_use]
    pub fn under_color(&self) -> Option<Rgba> {
        self.extend.lower().then(|| self.colormap.at(0.0).with_opacity(self.alpha))
    }

    /// Color above the range, when extended.
    #[must_use]
    pub fn over_color(&self) -> Option<Rgba> {
        self.extend.upper().then(|| self.colormap.at(1.0).with_opacity(self.alpha))
    }

    /// Colored spans along the colormap as `(start, end, color)` positions
    /// in `[0, 1]`.
    #[must_use]
    pub fn color_spans(&self) -> Vec<(f32, f32, Rgba)> {
        if self.discrete {
            return self
                .boundaries
                .windows(2)
                .enumerate()
                .map(|(k, w)| (self.position(w[0]), self.position(w[1]), self.bin_color(k)))
                .collect();
        }
        (0..GRADIENT_STEPS)
            .map(|i| {
                let start = i as f32 / GRADIENT_STEPS as f32;
                let end = (i + 1) as f32 / GRADIENT_STEPS as f32;
                let color = self.colormap.at((start + end) / 2.0).with_opacity(self.alpha);
                (start, end, color)
            })
            .collect()
    }

    fn bin_color(&self, k: usize) -> Rgba {
        let (lo, hi) = (self.boundaries[k], self.boundaries[k + 1]);
        let mid = match self.norm {
            Norm::Linear => (lo + hi) / 2.0,
            Norm::Log => (lo * hi).sqrt(),
        };
        self.colormap.at(self.position(mid)).with_opacity(self.alpha)
    }
}

fn unit_norm(norm: Norm, domain: (f32, f32)) -> Result<UnitNorm> {
    norm.unit(domain).map_err(|_| {
        Error::InvalidLevels(match norm {
            Norm::Log => format!(
                "logarithmic levels must be positive, got {}..{}",
                domain.0, domain.1
            ),
            Norm::Linear => format!("levels span an empty range {}..{}", domain.0, domain.1),
        })
    })
}

/// Something drawn on a panel, in drawing order.
#[derive(Debug, Clone)]
pub enum Layer {
    /// Filled contours of a field.
    Filled {
        /// Source field.
        field: Field,
        /// Level-to-color mapping.
        mappable: Mappable,
    },
    /// Contour lines.
    Lines(ContourSet),
    /// Colored point markers.
    Points {
        /// Marker positions as (lon, lat).
        points: Vec<Point>,
        /// Value per point.
        values: Vec<f32>,
        /// Value-to-color mapping.
        mappable: Mappable,
        /// Marker appearance.
        style: ScatterStyle,
    },
    /// A text annotation.
    Text(TextMark),
    /// Labels along contour lines.
    ContourLabels {
        /// Placed labels.
        labels: ContourLabels,
        /// Formatting used.
        format: ContourLabelFormat,
        /// Color of the labeled lines.
        line_color: Rgba,
    },
}

/// One map panel.
#[derive(Debug, Clone)]
pub struct Axes {
    extent: MapExtent,
    ticks: TickSpacing,
    tick_font_size: f32,
    title: Option<String>,
    title_font_size: f32,
    position: Rect,
    labels: LabelDecision,
    layers: Vec<Layer>,
}

impl Axes {
    /// An empty panel over `extent`, labeled on both axes.
    #[must_use]
    pub fn new(extent: MapExtent) -> Self {
        Self {
            extent,
            ticks: TickSpacing::default(),
            tick_font_size: 16.0,
            title: None,
            title_font_size: 18.0,
            position: Rect::new(0.0, 0.0, 400.0, 400.0).fit_aspect(extent.aspect()),
            labels: LabelDecision::default(),
            layers: Vec::new(),
        }
    }

    /// Set the tick spacing.
    #[must_use]
    pub fn with_ticks(mut self, ticks: TickSpacing) -> Self {
        self.ticks = ticks;
        self
    }

    /// Set the tick label font size.
    #[must_use]
    pub fn with_tick_font_size(mut self, size: f32) -> Self {
        self.tick_font_size = size;
        self
    }

    /// Set the title font size.
    #[must_use]
    pub fn with_title_font_size(mut self, size: f32) -> Self {
        self.title_font_size = size;
        self
    }

    /// Map extent.
    #[must_use]
    pub fn extent(&self) -> MapExtent {
        self.extent
    }

    /// Tick spacing.
    #[must_use]
    pub fn ticks(&self) -> TickSpacing {
        self.ticks
    }

    /// Panel title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set the panel title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Panel box in figure pixels.
    #[must_use]
    pub fn position(&self) -> Rect {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Rect) {
        self.position = position;
    }

    /// Current tick-label decision.
    #[must_use]
    pub fn labels(&self) -> LabelDecision {
        self.labels
    }

    pub(crate) fn set_labels(&mut self, labels: LabelDecision) {
        self.labels = labels;
    }

    /// Layers in drawing order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Longitude ticks and their labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick interval is invalid.
    pub fn lon_tick_labels(&self) -> Result<Vec<(f32, String)>> {
        let ticks = self.extent.lon_ticks(self.ticks.lon)?;
        Ok(ticks.into_iter().map(|lon| (lon, format_lon(lon))).collect())
    }

    /// Latitude ticks and their labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick interval is invalid.
    pub fn lat_tick_labels(&self) -> Result<Vec<(f32, String)>> {
        let ticks = self.extent.lat_ticks(self.ticks.lat)?;
        Ok(ticks.into_iter().map(|lat| (lat, format_lat(lat))).collect())
    }

    /// Draw filled contours of `field`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevels`] for fewer than two usable levels (or
    /// non-positive levels under a log norm) and [`Error::InvalidOption`] for
    /// an alpha outside `[0, 1]`.
    pub fn contourf(
        &mut self,
        field: &Field,
        levels: &Levels,
        style: &FillStyle,
    ) -> Result<Mappable> {
        let boundaries = levels.resolve(field)?;
        let mappable =
            Mappable::discrete(boundaries, style.colormap, style.norm, style.alpha, style.extend)?;
        debug!(levels = mappable.boundaries().len(), colormap = ?style.colormap, "contourf");

        self.layers.push(Layer::Filled { field: field.clone(), mappable: mappable.clone() });
        Ok(mappable)
    }

    /// Draw contour lines of `field`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid levels or a non-positive line width.
    pub fn contour(
        &mut self,
        field: &Field,
        levels: &Levels,
        style: &LineStyle,
    ) -> Result<ContourSet> {
        let set = ContourSet::from_field(field, levels, *style)?;
        debug!(levels = set.levels.len(), lines = set.lines.len(), "contour");

        self.layers.push(Layer::Lines(set.clone()));
        Ok(set)
    }

    /// Draw point markers colored by value.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyData`] if no points are given.
    /// - [`Error::DataLengthMismatch`] if `values` and `points` differ in length.
    /// - [`Error::InvalidOption`] for non-finite points or a bad style.
    /// - [`Error::InvalidLevels`] if no usable value range exists.
    pub fn scatter(
        &mut self,
        points: &[Point],
        values: &[f32],
        style: &ScatterStyle,
    ) -> Result<Mappable> {
        if points.is_empty() {
            return Err(Error::EmptyData);
        }
        if values.len() != points.len() {
            return Err(Error::DataLengthMismatch {
                expected: points.len(),
                actual: values.len(),
            });
        }
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(Error::InvalidOption("scatter points must be finite".to_string()));
        }
        if !(style.size.is_finite() && style.size > 0.0) {
            return Err(Error::InvalidOption(format!(
                "marker size must be positive, got {}",
                style.size
            )));
        }

        let domain = match style.range {
            Some(range) => range,
            None => widen(finite_range(values).ok_or(Error::EmptyData)?, style.norm),
        };
        let mappable = Mappable::continuous(domain, style.colormap, style.norm, style.alpha)?;
        debug!(points = points.len(), "scatter");

        self.layers.push(Layer::Points {
            points: points.to_vec(),
            values: values.to_vec(),
            mappable: mappable.clone(),
            style: *style,
        });
        Ok(mappable)
    }

    /// Render the panel: clipped data layers, frame, ticks and title.
    pub(crate) fn render(&self, background: Rgba) -> Result<Vec<SvgElement>> {
        let rect = self.position;
        let proj = self.extent.projection(rect)?;

        let mut data = Vec::new();
        for layer in &self.layers {
            match layer {
                Layer::Filled { field, mappable } => data.push(self.rasterize(field, mappable)?),
                Layer::Lines(set) => {
                    data.extend(set.lines.iter().map(|line| line_element(&proj, line, &set.style)));
                }
                Layer::Points { points, values, mappable, style } => {
                    for (p, &v) in points.iter().zip(values) {
                        let Some(fill) = mappable.color_for(v) else { continue };
                        let c = proj.to_pixel(p.x, p.y);
                        data.push(SvgElement::Circle {
                            cx: c.x,
                            cy: c.y,
                            r: style.radius(),
                            fill,
                            stroke: style.edge_color,
                            stroke_width: 0.5,
                        });
                    }
                }
                Layer::Text(mark) => push_text_mark(&mut data, &proj, mark),
                Layer::ContourLabels { labels, format, line_color } => {
                    self.push_contour_labels(
                        &mut data,
                        &proj,
                        labels,
                        format,
                        *line_color,
                        background,
                    );
                }
            }
        }

        let mut out = vec![
            SvgElement::Group { clip: Some(rect), children: data },
            SvgElement::Rect {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                fill: None,
                stroke: Some(Rgba::BLACK),
                stroke_width: 1.0,
            },
        ];
        self.push_ticks(&mut out, &proj)?;

        if let Some(title) = &self.title {
            let above = if self.labels.show_x && self.labels.x_edge == XEdge::Top {
                TICK_LENGTH + TICK_PAD + self.tick_font_size * 1.2
            } else {
                0.0
            };
            out.push(SvgElement::text(
                rect.center().x,
                rect.y - above - self.title_font_size * 0.8,
                title.as_str(),
                self.title_font_size,
                Rgba::BLACK,
                TextAnchor::Middle,
            ));
        }
        Ok(out)
    }

    fn rasterize(&self, field: &Field, mappable: &Mappable) -> Result<SvgElement> {
        let rect = self.position;
        let width = rect.width.ceil().max(1.0) as u32;
        let height = rect.height.ceil().max(1.0) as u32;
        let mut fb = Framebuffer::new(width, height)?;
        let proj = self.extent.projection(Rect::new(0.0, 0.0, width as f32, height as f32))?;

        for py in 0..height {
            for px in 0..width {
                let geo = proj.to_geo(px as f32 + 0.5, py as f32 + 0.5);
                let color = field.sample(geo.x, geo.y).and_then(|v| mappable.color_for(v));
                if let Some(color) = color {
                    fb.blend_pixel(px, py, color);
                }
            }
        }
        SvgElement::image(&fb, Rect::new(rect.x, rect.y, width as f32, height as f32))
    }

    fn push_contour_labels(
        &self,
        out: &mut Vec<SvgElement>,
        proj: &Projection,
        labels: &ContourLabels,
        format: &ContourLabelFormat,
        line_color: Rgba,
        background: Rgba,
    ) {
        let sx = self.position.width / (self.extent.east() - self.extent.west());
        let sy = self.position.height / (self.extent.north() - self.extent.south());

        for label in labels.labels() {
            let at = proj.to_pixel(label.position.x, label.position.y);
            let mut rotation = (label.direction.y * sy).atan2(label.direction.x * sx).to_degrees();
            if rotation > 90.0 {
                rotation -= 180.0;
            } else if rotation < -90.0 {
                rotation += 180.0;
            }
            let y = if format.inline { at.y } else { at.y - format.font_size * 0.6 };

            out.push(SvgElement::Text {
                x: at.x,
                y,
                text: label.text.clone(),
                font_size: format.font_size,
                fill: format.color.unwrap_or(line_color),
                anchor: TextAnchor::Middle,
                rotation,
                halo: format.inline.then_some(background),
            });
        }
    }

    fn push_ticks(&self, out: &mut Vec<SvgElement>, proj: &Projection) -> Result<()> {
        let rect = self.position;
        let size = self.tick_font_size;
        let decision = self.labels;

        let (edge_y, dir_y) = match decision.x_edge {
            XEdge::Bottom => (rect.bottom(), 1.0),
            XEdge::Top => (rect.y, -1.0),
        };
        for (lon, label) in self.lon_tick_labels()? {
            let x = proj.to_pixel(lon, self.extent.south()).x;
            out.push(tick_line(x, edge_y, x, edge_y + dir_y * TICK_LENGTH));
            if let Some(rotation) = decision.x_rotation {
                let y = edge_y + dir_y * (TICK_LENGTH + TICK_PAD + size * 0.6);
                out.push(SvgElement::Text {
                    x,
                    y,
                    text: label,
                    font_size: size,
                    fill: Rgba::BLACK,
                    anchor: TextAnchor::Middle,
                    rotation,
                    halo: None,
                });
            }
        }

        let (edge_x, dir_x, anchor) = match decision.y_edge {
            YEdge::Left => (rect.x, -1.0, TextAnchor::End),
            YEdge::Right => (rect.right(), 1.0, TextAnchor::Start),
        };
        for (lat, label) in self.lat_tick_labels()? {
            let y = proj.to_pixel(self.extent.west(), lat).y;
            out.push(tick_line(edge_x, y, edge_x + dir_x * TICK_LENGTH, y));
            if let Some(rotation) = decision.y_rotation {
                out.push(SvgElement::Text {
                    x: edge_x + dir_x * (TICK_LENGTH + TICK_PAD),
                    y,
                    text: label,
                    font_size: size,
                    fill: Rgba::BLACK,
                    anchor,
                    rotation,
                    halo: None,
                });
            }
        }
        Ok(())
    }
}

fn tick_line(x1: f32, y1: f32, x2: f32, y2: f32) -> SvgElement {
    SvgElement::Line { x1, y1, x2, y2, stroke: Rgba::BLACK, stroke_width: 1.0 }
}

fn line_element(proj: &Projection, line: &ContourLine, style: &LineStyle) -> SvgElement {
    let mut points: Vec<(f32, f32)> = line
        .points
        .iter()
        .map(|p| {
            let px = proj.to_pixel(p.x, p.y);
            (px.x, px.y)
        })
        .collect();
    if line.closed {
        if let Some(&first) = points.first() {
            points.push(first);
        }
    }
    SvgElement::Polyline {
        points,
        stroke: Some(style.color),
        stroke_width: style.width,
        fill: None,
        dash: style.dash.dasharray(style.width),
    }
}

fn push_text_mark(out: &mut Vec<SvgElement>, proj: &Projection, mark: &TextMark) {
    if let Some(marker) = mark.style.marker {
        let c = proj.to_pixel(mark.point.x, mark.point.y);
        let r = marker.size / 2.0;
        out.push(match marker.shape {
            MarkerShape::Circle => SvgElement::Circle {
                cx: c.x,
                cy: c.y,
                r,
                fill: marker.color,
                stroke: None,
                stroke_width: 0.0,
            },
            MarkerShape::Square => SvgElement::Rect {
                x: c.x - r,
                y: c.y - r,
                width: marker.size,
                height: marker.size,
                fill: Some(marker.color),
                stroke: None,
                stroke_width: 0.0,
            },
            MarkerShape::Triangle => SvgElement::Polyline {
                points: vec![(c.x, c.y - r), (c.x + r, c.y + r), (c.x - r, c.y + r)],
                stroke: None,
                stroke_width: 0.0,
                fill: Some(marker.color),
                dash: None,
            },
        });
    }

    let at = mark.text_position();
    let px = proj.to_pixel(at.x, at.y);
    let style = &mark.style;
    out.push(SvgElement::text(
        px.x,
        px.y,
        mark.text.as_str(),
        style.font_size,
        style.color,
        style.anchor,
    ));
}

fn finite_range(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Give a single-valued range some width so it can be normalized.
fn widen((lo, hi): (f32, f32), norm: Norm) -> (f32, f32) {
    if lo < hi {
        return (lo, hi);
    }
    match norm {
        Norm::Linear => (lo - 0.5, hi + 0.5),
        Norm::Log => (lo / 10.0, hi * 10.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{place_labels, LabelStyle, RotationSpec};
    use crate::grid::Cell;
    use crate::output::SvgEncoder;
    use approx::assert_abs_diff_eq;

    fn ramp() -> Field {
        // Values rise west to east from 0 to 1 across the default extent.
        let lons: Vec<f32> = (0..=9).map(|i| -112.0 + i as f32).collect();
        let lats: Vec<f32> = (0..=6).map(|j| 40.0 + j as f32).collect();
        Field::from_fn(lons, lats, |lon, _| (lon + 112.0) / 9.0).unwrap()
    }

    fn grey(boundaries: Vec<f32>, extend: Extend) -> Mappable {
        Mappable::discrete(boundaries, Colormap::Greyscale, Norm::Linear, 1.0, extend).unwrap()
    }

    fn render(axes: &Axes) -> String {
        let mut encoder = SvgEncoder::new(500, 400);
        encoder.extend(axes.render(Rgba::WHITE).unwrap());
        encoder.render()
    }

    #[test]
    fn test_extend_flags() {
        assert!(!Extend::Neither.lower() && !Extend::Neither.upper());
        assert!(Extend::Min.lower() && !Extend::Min.upper());
        assert!(Extend::Both.lower() && Extend::Both.upper());
        assert_eq!("max".parse::<Extend>().unwrap(), Extend::Max);
        assert!("sideways".parse::<Extend>().is_err());
    }

    #[test]
    fn test_discrete_bins() {
        let m = grey(vec![0.0, 1.0, 2.0], Extend::Neither);
        let low = m.color_for(0.5).unwrap();
        let high = m.color_for(1.5).unwrap();
        assert!(low.r < high.r);
        assert_eq!(m.color_for(2.0), Some(high));
        assert_eq!(m.color_for(1.0), Some(high));
        assert_eq!(m.color_for(-0.1), None);
        assert_eq!(m.color_for(2.1), None);
        assert_eq!(m.color_for(f32::NAN), None);
    }

    #[test]
    fn test_discrete_extend_paints_ends() {
        let m = grey(vec![0.0, 1.0], Extend::Both);
        assert_eq!(m.color_for(-5.0), Some(Rgba::BLACK));
        assert_eq!(m.color_for(5.0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_alpha_applied() {
        let rainbow = |alpha| {
            let levels = vec![0.0, 1.0];
            Mappable::discrete(levels, Colormap::Rainbow, Norm::Linear, alpha, Extend::Neither)
        };
        assert_eq!(rainbow(0.8).unwrap().color_for(0.5).unwrap().a, 204);
        assert!(matches!(rainbow(1.5), Err(Error::InvalidOption(_))));
    }

    #[test]
    fn test_log_norm_requires_positive_levels() {
        let log = |levels| {
            Mappable::discrete(levels, Colormap::Rainbow, Norm::Log, 1.0, Extend::Neither)
        };
        assert!(matches!(log(vec![0.0, 1.0, 10.0]), Err(Error::InvalidLevels(_))));

        let m = log(vec![1.0, 10.0, 100.0]).unwrap();
        assert_abs_diff_eq!(m.position(10.0), 0.5, epsilon = 1e-5);
        let spans = m.color_spans();
        assert_eq!(spans.len(), 2);
        assert_abs_diff_eq!(spans[0].1, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_continuous_ticks() {
        let m = Mappable::continuous((0.0, 8.0), Colormap::Viridis, Norm::Linear, 1.0).unwrap();
        assert_eq!(m.ticks(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(m.color_spans().len(), GRADIENT_STEPS);
        assert!(m.color_for(100.0).is_some());

        let log = Mappable::continuous((1.0, 10_000.0), Colormap::Viridis, Norm::Log, 1.0).unwrap();
        let ticks = log.ticks();
        assert_abs_diff_eq!(ticks[2], 100.0, epsilon = 1e-2);
    }

    #[test]
    fn test_contourf_returns_mappable_and_records_layer() {
        let mut axes = Axes::new(MapExtent::default());
        let levels = Levels::range(0.0, 1.0, 0.1).unwrap();
        let m = axes.contourf(&ramp(), &levels, &FillStyle::default()).unwrap();

        assert_eq!(m.boundaries().len(), 11);
        assert!(m.is_discrete());
        assert_eq!(m.alpha(), 0.8);
        assert!(matches!(axes.layers(), [Layer::Filled { .. }]));
    }

    #[test]
    fn test_contourf_needs_two_levels() {
        let mut axes = Axes::new(MapExtent::default());
        let err = axes.contourf(&ramp(), &Levels::Explicit(vec![0.5]), &FillStyle::default());
        assert!(matches!(err, Err(Error::InvalidLevels(_))));
        assert!(axes.layers().is_empty());
    }

    #[test]
    fn test_scatter_validation() {
        let mut axes = Axes::new(MapExtent::default());
        let pts = [Point::new(-110.0, 42.0), Point::new(-105.0, 44.0)];
        assert!(matches!(axes.scatter(&[], &[], &ScatterStyle::default()), Err(Error::EmptyData)));
        assert!(matches!(
            axes.scatter(&pts, &[1.0], &ScatterStyle::default()),
            Err(Error::DataLengthMismatch { expected: 2, actual: 1 })
        ));

        assert!(matches!(
            axes.scatter(&[Point::new(f32::NAN, 42.0)], &[1.0], &ScatterStyle::default()),
            Err(Error::InvalidOption(_))
        ));

        let m = axes.scatter(&pts, &[3.0, 3.0], &ScatterStyle::default()).unwrap();
        assert_eq!(m.domain(), (2.5, 3.5));
        assert!(!m.is_discrete());
    }

    #[test]
    fn test_tick_labels() {
        let axes = Axes::new(MapExtent::default()).with_ticks(TickSpacing::new(3.0, 2.0));
        let lons: Vec<String> =
            axes.lon_tick_labels().unwrap().into_iter().map(|(_, s)| s).collect();
        assert_eq!(lons, vec!["112°W", "109°W", "106°W", "103°W"]);
        let lats: Vec<String> =
            axes.lat_tick_labels().unwrap().into_iter().map(|(_, s)| s).collect();
        assert_eq!(lats, vec!["40°N", "42°N", "44°N", "46°N"]);
    }

    #[test]
    fn test_render_shows_only_decided_labels() {
        let mut axes = Axes::new(MapExtent::default());
        let cell = Cell::new(0, 1, 2, 2).unwrap();
        axes.set_labels(place_labels(&cell, LabelStyle::outer(), RotationSpec::NONE));

        let svg = render(&axes);
        assert!(!svg.contains("°W"));
        assert!(!svg.contains("°N"));
        // Tick marks are still drawn.
        assert!(svg.matches("<line").count() >= 10 + 7);
    }

    #[test]
    fn test_render_layers() {
        let mut axes = Axes::new(MapExtent::default());
        axes.set_title("Precip");
        axes.contourf(&ramp(), &Levels::Auto(5), &FillStyle::default()).unwrap();
        let dashed = LineStyle::default().dash(crate::contour::Dash::Dashed);
        axes.contour(&ramp(), &Levels::Explicit(vec![0.5]), &dashed).unwrap();
        axes.scatter(&[Point::new(-108.0, 43.0)], &[0.3], &ScatterStyle::default()).unwrap();

        let svg = render(&axes);
        assert!(svg.contains("data:image/png;base64,"));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("Precip"));
        assert!(svg.contains("108°W"));
        assert!(svg.contains("clip-path"));
    }

    #[test]
    fn test_rasterized_fill_follows_field() {
        let mut axes = Axes::new(MapExtent::default());
        let style = FillStyle::default().alpha(1.0).colormap(Colormap::Greyscale);
        let m = axes.contourf(&ramp(), &Levels::Explicit(vec![0.0, 0.5, 1.0]), &style).unwrap();
        let Some(Layer::Filled { field, .. }) = axes.layers().first() else {
            panic!("expected a filled layer");
        };
        // West half is the dark bin, east half the light one.
        assert_eq!(field.sample(-111.0, 43.0).and_then(|v| m.color_for(v)), m.color_for(0.1));
        assert_ne!(m.color_for(0.1), m.color_for(0.9));
    }
}
