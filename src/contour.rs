//! Contour levels, isoline extraction and contour labeling.
//!
//! Isolines are extracted with marching squares over the field's index
//! space, chained into polylines, and only then mapped to lon/lat so that
//! uneven coordinate spacing is honored.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::axes::{Axes, Layer};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::extent::arange_inclusive;
use crate::field::Field;
use crate::format::Precision;
use crate::geometry::Point;

/// Tolerance for joining segment endpoints, in grid-index units.
const JOIN_EPSILON: f32 = 1e-4;

/// Contour or fill levels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Levels {
    /// Explicit, strictly increasing values.
    Explicit(Vec<f32>),
    /// `n` evenly spaced values spanning the field's finite range.
    Auto(usize),
}

impl Default for Levels {
    /// `0.0, 0.1, ..., 1.0`.
    fn default() -> Self {
        Self::Explicit((0..=10).map(|i| i as f32 / 10.0).collect())
    }
}

impl Levels {
    /// Levels `start, start + step, ...` up to and including `stop`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevels`] if the step is not positive, the
    /// range is empty, or it would hold more than 10 000 levels.
    pub fn range(start: f32, stop: f32, step: f32) -> Result<Self> {
        let values = arange_inclusive(start, stop, step).map_err(|e| match e {
            Error::InvalidExtent(reason) => Error::InvalidLevels(reason),
            other => other,
        })?;
        if values.is_empty() {
            return Err(Error::InvalidLevels(format!("empty level range {start}..{stop}")));
        }
        Ok(Self::Explicit(values))
    }

    /// Concrete level values for a field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevels`] for empty, non-finite or
    /// non-increasing explicit levels, `Auto(0)`, or an automatic request on
    /// a field with no finite values.
    pub fn resolve(&self, field: &Field) -> Result<Vec<f32>> {
        match self {
            Self::Explicit(values) => {
                validate_levels(values)?;
                Ok(values.clone())
            }
            Self::Auto(0) => {
                Err(Error::InvalidLevels("automatic level count must be positive".to_string()))
            }
            Self::Auto(n) => {
                let (min, max) = field
                    .value_range()
                    .ok_or_else(|| Error::InvalidLevels("field has no finite values".to_string()))?;
                if *n == 1 || min == max {
                    return Ok(vec![min]);
                }
                let step = (max - min) / (*n - 1) as f32;
                Ok((0..*n).map(|i| if i + 1 == *n { max } else { min + step * i as f32 }).collect())
            }
        }
    }
}

pub(crate) fn validate_levels(values: &[f32]) -> Result<()> {
    if values.is_empty() {
        return Err(Error::InvalidLevels("at least one level is required".to_string()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidLevels("levels must be finite".to_string()));
    }
    if values.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidLevels("levels must be strictly increasing".to_string()));
    }
    Ok(())
}

/// Stroke dash pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dash {
    /// Continuous line.
    #[default]
    Solid,
    /// Long dashes.
    Dashed,
    /// Alternating dash and dot.
    DashDot,
    /// Dots.
    Dotted,
}

impl Dash {
    /// SVG `stroke-dasharray` for a line of the given width.
    #[must_use]
    pub fn dasharray(self, width: f32) -> Option<String> {
        let w = width.max(0.5);
        match self {
            Self::Solid => None,
            Self::Dashed => Some(format!("{},{}", 3.7 * w, 1.6 * w)),
            Self::DashDot => Some(format!("{},{},{},{}", 6.4 * w, 1.6 * w, w, 1.6 * w)),
            Self::Dotted => Some(format!("{},{}", w, 1.65 * w)),
        }
    }
}

impl FromStr for Dash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" | "-" => Ok(Self::Solid),
            "dashed" | "--" => Ok(Self::Dashed),
            "dashdot" | "-." => Ok(Self::DashDot),
            "dotted" | ":" => Ok(Self::Dotted),
            _ => Err(Error::InvalidStyle(format!("unknown line style {s:?}"))),
        }
    }
}

impl fmt::Display for Dash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::DashDot => "dashdot",
            Self::Dotted => "dotted",
        })
    }
}

/// Stroke style for contour lines.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineStyle {
    /// Line color.
    pub color: Rgba,
    /// Line width in pixels.
    pub width: f32,
    /// Dash pattern.
    pub dash: Dash,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self { color: Rgba::BLACK, width: 1.0, dash: Dash::Solid }
    }
}

impl LineStyle {
    /// Set the color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Set the line width.
    #[must_use]
    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Set the dash pattern.
    #[must_use]
    pub fn dash(mut self, dash: Dash) -> Self {
        self.dash = dash;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::InvalidOption(format!(
                "line width must be positive, got {}",
                self.width
            )));
        }
        Ok(())
    }
}

/// One isoline in lon/lat coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    /// Level this line traces.
    pub level: f32,
    /// Vertices as (lon, lat).
    pub points: Vec<Point>,
    /// Whether the line forms a ring.
    pub closed: bool,
}

impl ContourLine {
    /// Total length in degrees.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Point halfway along the line and the direction of travel there.
    #[must_use]
    pub fn midpoint(&self) -> Option<(Point, Point)> {
        let half = self.length() / 2.0;
        if half <= 0.0 {
            return None;
        }

        let mut walked = 0.0;
        for w in self.points.windows(2) {
            let seg = w[0].distance(w[1]);
            if seg > 0.0 && walked + seg >= half {
                let t = (half - walked) / seg;
                let direction = Point::new((w[1].x - w[0].x) / seg, (w[1].y - w[0].y) / seg);
                return Some((w[0].lerp(w[1], t), direction));
            }
            walked += seg;
        }
        None
    }
}

/// Isolines for a set of levels, with their stroke style.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourSet {
    /// Levels requested, ascending.
    pub levels: Vec<f32>,
    /// Extracted lines, grouped by level in ascending order.
    pub lines: Vec<ContourLine>,
    /// Stroke style.
    pub style: LineStyle,
}

impl ContourSet {
    /// Extract isolines from a field.
    ///
    /// # Errors
    ///
    /// Returns an error if the levels cannot be resolved or the style is invalid.
    pub fn from_field(field: &Field, levels: &Levels, style: LineStyle) -> Result<Self> {
        style.validate()?;
        let levels = levels.resolve(field)?;
        let lines = levels.iter().flat_map(|&level| trace_level(field, level)).collect();
        Ok(Self { levels, lines, style })
    }

    /// Lines tracing `level`.
    pub fn lines_at(&self, level: f32) -> impl Iterator<Item = &ContourLine> {
        self.lines.iter().filter(move |l| same_level(l.level, level))
    }
}

fn same_level(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    start: Point,
    end: Point,
}

fn trace_level(field: &Field, level: f32) -> Vec<ContourLine> {
    let segments = march_squares(field.values(), field.nx(), field.ny(), level);
    connect_segments(segments)
        .into_iter()
        .map(|(points, closed)| ContourLine {
            level,
            points: points.into_iter().map(|p| to_geo(field, p)).collect(),
            closed,
        })
        .collect()
}

/// Fractional grid index to (lon, lat).
fn to_geo(field: &Field, p: Point) -> Point {
    Point::new(along(field.lons(), p.x), along(field.lats(), p.y))
}

fn along(coords: &[f32], idx: f32) -> f32 {
    let last = coords.len().saturating_sub(1);
    let i = (idx.floor().max(0.0) as usize).min(last.saturating_sub(1));
    let t = idx - i as f32;
    match (coords.get(i), coords.get(i + 1)) {
        (Some(&a), Some(&b)) => a + (b - a) * t,
        (Some(&a), None) => a,
        _ => 0.0,
    }
}

/// Marching squares over row-major data; points are in index space.
fn march_squares(data: &[f32], width: usize, height: usize, level: f32) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let c0 = data[y * width + x];
            let c1 = data[y * width + x + 1];
            let c2 = data[(y + 1) * width + x + 1];
            let c3 = data[(y + 1) * width + x];
            if [c0, c1, c2, c3].iter().any(|v| v.is_nan()) {
                continue;
            }

            let mut case = 0u8;
            if c0 >= level {
                case |= 1;
            }
            if c1 >= level {
                case |= 2;
            }
            if c2 >= level {
                case |= 4;
            }
            if c3 >= level {
                case |= 8;
            }
            if case == 0 || case == 15 {
                continue;
            }

            let (fx, fy) = (x as f32, y as f32);
            let low = interpolate_edge((fx, fy), (fx + 1.0, fy), c0, c1, level);
            let right = interpolate_edge((fx + 1.0, fy), (fx + 1.0, fy + 1.0), c1, c2, level);
            let high = interpolate_edge((fx, fy + 1.0), (fx + 1.0, fy + 1.0), c3, c2, level);
            let left = interpolate_edge((fx, fy), (fx, fy + 1.0), c0, c3, level);

            // A corner lying exactly on the level yields zero-length pieces.
            let mut emit = |start: Point, end: Point| {
                if start.distance(end) > f32::EPSILON {
                    segments.push(Segment { start, end });
                }
            };
            match case {
                1 | 14 => emit(left, low),
                2 | 13 => emit(low, right),
                3 | 12 => emit(left, right),
                4 | 11 => emit(right, high),
                6 | 9 => emit(low, high),
                7 | 8 => emit(left, high),
                // Saddles: resolve with the cell-center average.
                5 | 10 => {
                    let center_high = (c0 + c1 + c2 + c3) / 4.0 >= level;
                    if (case == 5) == center_high {
                        emit(left, high);
                        emit(low, right);
                    } else {
                        emit(left, low);
                        emit(right, high);
                    }
                }
                _ => {}
            }
        }
    }
    segments
}

fn interpolate_edge(a: (f32, f32), b: (f32, f32), va: f32, vb: f32, level: f32) -> Point {
    if (vb - va).abs() < 1e-12 {
        return Point::new((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    }
    let t = ((level - va) / (vb - va)).clamp(0.0, 1.0);
    Point::new(a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
}

fn near(a: Point, b: Point) -> bool {
    a.distance(b) < JOIN_EPSILON
}

/// Endpoint position quantized to [`JOIN_EPSILON`] cells.
fn endpoint_key(p: Point) -> (i64, i64) {
    ((p.x / JOIN_EPSILON).round() as i64, (p.y / JOIN_EPSILON).round() as i64)
}

/// Segment ids bucketed by quantized endpoint.
///
/// Points within [`JOIN_EPSILON`] of each other land in the same or an
/// adjacent bucket, so a lookup checks the 3×3 neighborhood.
struct EndpointIndex {
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl EndpointIndex {
    fn new(segments: &[Segment]) -> Self {
        let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::with_capacity(segments.len());
        for (i, s) in segments.iter().enumerate() {
            buckets.entry(endpoint_key(s.start)).or_default().push(i);
            buckets.entry(endpoint_key(s.end)).or_default().push(i);
        }
        Self { buckets }
    }

    /// Claim an unused segment touching `p` and return its far end.
    fn take(&self, p: Point, segments: &[Segment], used: &mut [bool]) -> Option<Point> {
        let (kx, ky) = endpoint_key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(ids) = self.buckets.get(&(kx + dx, ky + dy)) else {
                    continue;
                };
                for &i in ids {
                    if used[i] {
                        continue;
                    }
                    let s = &segments[i];
                    let far = if near(s.start, p) {
                        s.end
                    } else if near(s.end, p) {
                        s.start
                    } else {
                        continue;
                    };
                    used[i] = true;
                    return Some(far);
                }
            }
        }
        None
    }
}

/// Chain unordered segments into polylines, growing the tail then the head.
fn connect_segments(segments: Vec<Segment>) -> Vec<(Vec<Point>, bool)> {
    let index = EndpointIndex::new(&segments);
    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut points = VecDeque::from([segments[start].start, segments[start].end]);

        let is_ring = |points: &VecDeque<Point>| {
            points.len() > 2
                && matches!((points.front(), points.back()), (Some(&a), Some(&b)) if near(a, b))
        };

        while let Some(&tail) = points.back() {
            if is_ring(&points) {
                break;
            }
            match index.take(tail, &segments, &mut used) {
                Some(p) => points.push_back(p),
                None => break,
            }
        }
        // An open tail means the head cannot close the ring either.
        if !is_ring(&points) {
            while let Some(&head) = points.front() {
                match index.take(head, &segments, &mut used) {
                    Some(p) => points.push_front(p),
                    None => break,
                }
            }
        }

        let closed = is_ring(&points);
        lines.push((points.into_iter().collect(), closed));
    }
    lines
}

/// How contour labels are formatted and placed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContourLabelFormat {
    /// Number format for the level value.
    pub precision: Precision,
    /// Inline labels mask the line beneath them; otherwise they sit beside it.
    pub inline: bool,
    /// Font size in pixels.
    pub font_size: f32,
    /// Label only these levels (all levels when `None`).
    pub levels: Option<Vec<f32>>,
    /// Text color (line color when `None`).
    pub color: Option<Rgba>,
}

impl Default for ContourLabelFormat {
    fn default() -> Self {
        Self {
            precision: Precision::Default,
            inline: true,
            font_size: 10.0,
            levels: None,
            color: None,
        }
    }
}

impl ContourLabelFormat {
    /// Set the precision.
    #[must_use]
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Set whether labels are drawn inline.
    #[must_use]
    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    /// Set the font size.
    #[must_use]
    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Restrict labeling to a subset of levels.
    #[must_use]
    pub fn levels(mut self, levels: Vec<f32>) -> Self {
        self.levels = Some(levels);
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(Error::InvalidOption(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if let Some(levels) = &self.levels {
            if levels.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidLevels("label levels must be finite".to_string()));
            }
        }
        Ok(())
    }

    fn wants(&self, level: f32) -> bool {
        self.levels.as_ref().map_or(true, |subset| subset.iter().any(|&l| same_level(l, level)))
    }
}

/// A placed contour label.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLabel {
    /// Level the label belongs to.
    pub level: f32,
    /// Formatted text.
    pub text: String,
    /// Anchor position as (lon, lat).
    pub position: Point,
    /// Unit direction of the line at the anchor, in (lon, lat) space.
    pub direction: Point,
}

/// Labels produced by [`show_contour_labels`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContourLabels {
    labels: Vec<ContourLabel>,
}

impl ContourLabels {
    /// All placed labels.
    #[must_use]
    pub fn labels(&self) -> &[ContourLabel] {
        &self.labels
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no label was placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label texts in placement order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.text.as_str())
    }
}

/// Label the lines of a contour set on a panel.
///
/// Each line of a selected level gets one label at its arc-length
/// midpoint; labels whose anchor falls outside the panel's extent are
/// skipped. The labels are also recorded on the panel for rendering.
///
/// # Errors
///
/// Returns an error for a non-positive font size or non-finite label levels.
pub fn show_contour_labels(
    axes: &mut Axes,
    set: &ContourSet,
    format: &ContourLabelFormat,
) -> Result<ContourLabels> {
    format.validate()?;
    let extent = axes.extent();

    let labels: Vec<ContourLabel> = set
        .lines
        .iter()
        .filter(|line| format.wants(line.level))
        .filter_map(|line| {
            let (position, direction) = line.midpoint()?;
            extent.contains(position).then(|| ContourLabel {
                level: line.level,
                text: format.precision.format(line.level),
                position,
                direction,
            })
        })
        .collect();

    debug!(
        lines = set.lines.len(),
        labels = labels.len(),
        inline = format.inline,
        "placed contour labels"
    );

    let labels = ContourLabels { labels };
    axes.push_layer(Layer::ContourLabels {
        labels: labels.clone(),
        format: format.clone(),
        line_color: set.style.color,
    });
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::MapExtent;
    use approx::assert_abs_diff_eq;

    /// Cone peaking at (0, 0) with value 1, falling off linearly with distance.
    fn cone() -> Field {
        let coords: Vec<f32> = (-10..=10).map(|i| i as f32 * 0.2).collect();
        Field::from_fn(coords.clone(), coords, |x, y| 1.0 - (x * x + y * y).sqrt() / 2.0).unwrap()
    }

    fn trace(field: &Field, levels: &[f32]) -> ContourSet {
        ContourSet::from_field(field, &Levels::Explicit(levels.to_vec()), LineStyle::default())
            .unwrap()
    }

    fn cone_axes() -> Axes {
        Axes::new(MapExtent::new(-2.0, 2.0, -2.0, 2.0).unwrap())
    }

    #[test]
    fn test_levels_range() {
        let Levels::Explicit(values) = Levels::range(0.0, 1.0, 0.25).unwrap() else {
            panic!("expected explicit levels");
        };
        assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(Levels::range(0.0, 1.0, 0.0).is_err());
        assert!(Levels::range(1.0, 0.0, 0.1).is_err());
    }

    #[test]
    fn test_levels_range_rejects_unbounded_count() {
        let err = Levels::range(0.0, 1.0, f32::MIN_POSITIVE).unwrap_err();
        assert!(matches!(err, Error::InvalidLevels(_)));
        assert!(matches!(Levels::range(0.0, 1.0, -0.1), Err(Error::InvalidLevels(_))));
    }

    #[test]
    fn test_default_levels_match_unit_tenths() {
        let Levels::Explicit(values) = Levels::default() else {
            panic!("expected explicit levels");
        };
        assert_eq!(values.len(), 11);
        assert_eq!(values[3], 0.3);
    }

    #[test]
    fn test_explicit_levels_validation() {
        let field = cone();
        assert!(Levels::Explicit(vec![]).resolve(&field).is_err());
        assert!(Levels::Explicit(vec![0.5, 0.2]).resolve(&field).is_err());
        assert!(Levels::Explicit(vec![0.2, 0.2]).resolve(&field).is_err());
        assert!(Levels::Explicit(vec![0.2, f32::NAN]).resolve(&field).is_err());
    }

    #[test]
    fn test_auto_levels_span_range() {
        let field = cone();
        let (min, max) = field.value_range().unwrap();
        let levels = Levels::Auto(5).resolve(&field).unwrap();
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[0], min);
        assert_eq!(levels[4], max);
        assert!(Levels::Auto(0).resolve(&field).is_err());
    }

    #[test]
    fn test_flat_field_has_no_lines() {
        let field = Field::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0], vec![5.0; 9]).unwrap();
        let set = trace(&field, &[5.5]);
        assert!(set.lines.is_empty());
    }

    #[test]
    fn test_connect_shuffled_ring() {
        let n = 2000;
        let vertex = |i: usize| {
            let t = (i % n) as f32 / n as f32 * std::f32::consts::TAU;
            Point::new(100.0 + 50.0 * t.cos(), 100.0 + 50.0 * t.sin())
        };
        // Stride 7 visits every edge once; every third edge is reversed.
        let segments: Vec<Segment> = (0..n)
            .map(|k| (k * 7) % n)
            .map(|i| {
                let (a, b) = (vertex(i), vertex(i + 1));
                if i % 3 == 0 {
                    Segment { start: b, end: a }
                } else {
                    Segment { start: a, end: b }
                }
            })
            .collect();

        let lines = connect_segments(segments);
        assert_eq!(lines.len(), 1);
        let (points, closed) = &lines[0];
        assert!(*closed);
        assert_eq!(points.len(), n + 1);
    }

    #[test]
    fn test_connect_shuffled_open_line() {
        let n = 1000;
        let vertex = |i: usize| Point::new(i as f32 * 0.5, 3.0);
        let segments: Vec<Segment> = (0..n)
            .map(|k| (k * 13) % n)
            .map(|i| Segment { start: vertex(i), end: vertex(i + 1) })
            .collect();

        let lines = connect_segments(segments);
        assert_eq!(lines.len(), 1);
        let (points, closed) = &lines[0];
        assert!(!*closed);
        assert_eq!(points.len(), n + 1);
        let mut ends = [points[0].x, points[n].x];
        ends.sort_by(f32::total_cmp);
        assert_eq!(ends, [0.0, 500.0]);
    }

    #[test]
    fn test_cone_gives_closed_ring() {
        let set = trace(&cone(), &[0.55]);
        assert_eq!(set.lines.len(), 1);

        let ring = &set.lines[0];
        assert!(ring.closed);
        for p in &ring.points {
            // The 0.55 isoline of the cone is the circle of radius 0.9.
            assert_abs_diff_eq!((p.x * p.x + p.y * p.y).sqrt(), 0.9, epsilon = 0.05);
        }
    }

    #[test]
    fn test_open_line_across_ramp() {
        let field =
            Field::from_fn(vec![0.0, 1.0, 2.0, 3.0], vec![10.0, 11.0, 12.0], |lon, _| lon).unwrap();
        let set = trace(&field, &[1.5]);
        assert_eq!(set.lines.len(), 1);

        let line = &set.lines[0];
        assert!(!line.closed);
        assert_eq!(line.points.len(), 3);
        for p in &line.points {
            assert_abs_diff_eq!(p.x, 1.5, epsilon = 1e-5);
        }
        assert_abs_diff_eq!(line.length(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_uneven_coordinates_are_interpolated() {
        let field = Field::from_fn(vec![0.0, 1.0, 5.0], vec![0.0, 1.0], |lon, _| lon).unwrap();
        let set = trace(&field, &[3.0]);
        assert_abs_diff_eq!(set.lines[0].points[0].x, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_missing_values_break_lines() {
        let mut values: Vec<f32> = (0..5).flat_map(|_| [0.0, 1.0, 2.0, 3.0]).collect();
        values[9] = f32::NAN;
        let lats = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let field = Field::new(vec![0.0, 1.0, 2.0, 3.0], lats, values).unwrap();
        let set = trace(&field, &[1.5]);
        assert_eq!(set.lines.len(), 2);
    }

    #[test]
    fn test_midpoint_of_straight_line() {
        let line = ContourLine {
            level: 0.0,
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(3.0, 0.0)],
            closed: false,
        };
        let (mid, dir) = line.midpoint().unwrap();
        assert_abs_diff_eq!(mid.x, 1.5);
        assert_abs_diff_eq!(dir.x, 1.0);
        assert_abs_diff_eq!(dir.y, 0.0);
    }

    #[test]
    fn test_dash_parse_and_pattern() {
        assert_eq!("dashed".parse::<Dash>().unwrap(), Dash::Dashed);
        assert_eq!("-.".parse::<Dash>().unwrap(), Dash::DashDot);
        assert!("wavy".parse::<Dash>().is_err());
        assert_eq!(Dash::Solid.dasharray(1.0), None);
        assert_eq!(Dash::Dotted.dasharray(2.0).unwrap(), "2,3.3");
    }

    #[test]
    fn test_line_style_rejects_zero_width() {
        let style = LineStyle::default().width(0.0);
        let err = ContourSet::from_field(&cone(), &Levels::Auto(3), style);
        assert!(matches!(err, Err(Error::InvalidOption(_))));
    }

    #[test]
    fn test_labels_use_precision() {
        let set = trace(&cone(), &[0.35, 0.55, 0.85]);
        let mut axes = cone_axes();
        let format = ContourLabelFormat::default().precision(Precision::Decimals(1));
        let labels = show_contour_labels(&mut axes, &set, &format).unwrap();

        assert_eq!(labels.len(), 3);
        assert_eq!(labels.texts().collect::<Vec<_>>(), vec!["0.3", "0.6", "0.9"]);
        assert_eq!(axes.layers().len(), 1);
    }

    #[test]
    fn test_labels_subset() {
        let set = trace(&cone(), &[0.35, 0.55, 0.85]);
        let mut axes = cone_axes();
        let format = ContourLabelFormat::default().levels(vec![0.55]);
        let labels = show_contour_labels(&mut axes, &set, &format).unwrap();

        assert_eq!(labels.texts().collect::<Vec<_>>(), vec!["0.55"]);
        assert_abs_diff_eq!(labels.labels()[0].level, 0.55);
    }

    #[test]
    fn test_labels_outside_extent_are_skipped() {
        let set = trace(&cone(), &[0.55]);
        let mut axes = Axes::new(MapExtent::new(5.0, 6.0, 5.0, 6.0).unwrap());
        let labels = show_contour_labels(&mut axes, &set, &ContourLabelFormat::default()).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn test_labels_reject_bad_font_size() {
        let set = trace(&cone(), &[0.55]);
        let mut axes = cone_axes();
        let format = ContourLabelFormat::default().font_size(0.0);
        let err = show_contour_labels(&mut axes, &set, &format);
        assert!(matches!(err, Err(Error::InvalidOption(_))));
        assert!(axes.layers().is_empty());
    }
}
