//! Map extents and coordinate tick generation.

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::scale::{LinearScale, Scale};

/// Geographic bounds of a map panel, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapExtent {
    west: f32,
    east: f32,
    south: f32,
    north: f32,
}

impl Default for MapExtent {
    /// The northern Rockies / high plains domain (112°W-103°W, 40°N-46°N).
    fn default() -> Self {
        Self {
            west: -112.0,
            east: -103.0,
            south: 40.0,
            north: 46.0,
        }
    }
}

impl MapExtent {
    /// Create an extent from its west, east, south and north bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExtent`] if a bound is not finite, the bounds
    /// are inverted or empty, or a latitude lies outside `[-90, 90]`.
    pub fn new(west: f32, east: f32, south: f32, north: f32) -> Result<Self> {
        if ![west, east, south, north].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidExtent("bounds must be finite".to_string()));
        }
        if west >= east {
            return Err(Error::InvalidExtent(format!("west {west} must be less than east {east}")));
        }
        if south >= north {
            return Err(Error::InvalidExtent(format!(
                "south {south} must be less than north {north}"
            )));
        }
        if south < -90.0 || north > 90.0 {
            return Err(Error::InvalidExtent(format!(
                "latitudes {south}..{north} outside [-90, 90]"
            )));
        }
        Ok(Self { west, east, south, north })
    }

    /// Western bound.
    #[must_use]
    pub const fn west(&self) -> f32 {
        self.west
    }

    /// Eastern bound.
    #[must_use]
    pub const fn east(&self) -> f32 {
        self.east
    }

    /// Southern bound.
    #[must_use]
    pub const fn south(&self) -> f32 {
        self.south
    }

    /// Northern bound.
    #[must_use]
    pub const fn north(&self) -> f32 {
        self.north
    }

    /// Longitude span divided by latitude span.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        (self.east - self.west) / (self.north - self.south)
    }

    /// Whether a (lon, lat) point falls inside the extent.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        (self.west..=self.east).contains(&point.x) && (self.south..=self.north).contains(&point.y)
    }

    /// Longitude tick positions from the western bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExtent`] if `interval` is not positive and finite.
    pub fn lon_ticks(&self, interval: f32) -> Result<Vec<f32>> {
        arange_inclusive(self.west, self.east, interval)
    }

    /// Latitude tick positions from the southern bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExtent`] if `interval` is not positive and finite.
    pub fn lat_ticks(&self, interval: f32) -> Result<Vec<f32>> {
        arange_inclusive(self.south, self.north, interval)
    }

    /// Projection of this extent onto a pixel box (equirectangular).
    ///
    /// # Errors
    ///
    /// Returns an error if the box has no area.
    pub fn projection(&self, rect: Rect) -> Result<Projection> {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(Error::InvalidDimensions {
                width: rect.width.max(0.0) as u32,
                height: rect.height.max(0.0) as u32,
            });
        }
        Ok(Projection {
            x: LinearScale::new((self.west, self.east), (rect.x, rect.right()))?,
            y: LinearScale::new((self.south, self.north), (rect.bottom(), rect.y))?,
        })
    }
}

/// Longitude/latitude tick intervals, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSpacing {
    /// Longitude tick interval.
    pub lon: f32,
    /// Latitude tick interval.
    pub lat: f32,
}

impl Default for TickSpacing {
    fn default() -> Self {
        Self { lon: 1.0, lat: 1.0 }
    }
}

impl TickSpacing {
    /// Create tick spacing with the given intervals.
    #[must_use]
    pub const fn new(lon: f32, lat: f32) -> Self {
        Self { lon, lat }
    }
}

/// Mapping between (lon, lat) and pixel coordinates for one panel.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    x: LinearScale,
    y: LinearScale,
}

impl Projection {
    /// Geographic point to pixel position.
    #[must_use]
    pub fn to_pixel(&self, lon: f32, lat: f32) -> Point {
        Point::new(self.x.scale(lon), self.y.scale(lat))
    }

    /// Pixel position to geographic point.
    #[must_use]
    pub fn to_geo(&self, px: f32, py: f32) -> Point {
        Point::new(self.x.invert(px), self.y.invert(py))
    }
}

/// Most values [`arange_inclusive`] will produce.
pub(crate) const MAX_STEPS: usize = 10_000;

/// Values `start, start + step, ...` up to and including `stop`.
///
/// Accumulates in `f64` so that steps like `0.1` land on the nearest `f32`.
/// Fails with [`Error::InvalidExtent`] when the step is not positive or the
/// range would hold more than [`MAX_STEPS`] values.
pub(crate) fn arange_inclusive(start: f32, stop: f32, step: f32) -> Result<Vec<f32>> {
    if !(step.is_finite() && step > 0.0) {
        return Err(Error::InvalidExtent(format!("step must be positive, got {step}")));
    }
    if !(start.is_finite() && stop.is_finite()) || stop < start {
        return Ok(Vec::new());
    }

    let (lo, hi, dx) = (f64::from(start), f64::from(stop), f64::from(step));
    let steps = ((hi - lo) / dx + 1e-9).floor();
    if !steps.is_finite() || steps >= MAX_STEPS as f64 {
        return Err(Error::InvalidExtent(format!(
            "step {step} over {start}..{stop} gives more than {MAX_STEPS} values"
        )));
    }
    let count = steps as usize + 1;
    Ok((0..count).map(|i| (lo + i as f64 * dx) as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_extent() {
        let ext = MapExtent::default();
        let bounds = (ext.west(), ext.east(), ext.south(), ext.north());
        assert_eq!(bounds, (-112.0, -103.0, 40.0, 46.0));
        assert_abs_diff_eq!(ext.aspect(), 1.5);
    }

    #[test]
    fn test_extent_validation() {
        assert!(MapExtent::new(-100.0, -110.0, 40.0, 46.0).is_err());
        assert!(MapExtent::new(-110.0, -100.0, 46.0, 40.0).is_err());
        assert!(MapExtent::new(-110.0, -100.0, -95.0, 40.0).is_err());
        assert!(MapExtent::new(f32::NAN, -100.0, 40.0, 46.0).is_err());
        assert!(MapExtent::new(-110.0, -100.0, 40.0, 46.0).is_ok());
    }

    #[test]
    fn test_lon_ticks_include_east_bound() {
        let ticks = MapExtent::default().lon_ticks(1.0).unwrap();
        assert_eq!(ticks.len(), 10);
        assert_eq!(ticks[0], -112.0);
        assert_eq!(ticks[9], -103.0);
    }

    #[test]
    fn test_ticks_never_exceed_bound() {
        let ticks = MapExtent::default().lon_ticks(2.0).unwrap();
        assert_eq!(ticks, vec![-112.0, -110.0, -108.0, -106.0, -104.0]);

        let ticks = MapExtent::default().lat_ticks(0.5).unwrap();
        assert_eq!(ticks.len(), 13);
        assert_eq!(*ticks.last().unwrap(), 46.0);
    }

    #[test]
    fn test_fractional_steps_are_clean() {
        let ticks = arange_inclusive(0.0, 1.0, 0.1).unwrap();
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[3], 0.3);
        assert_eq!(ticks[10], 1.0);
    }

    #[test]
    fn test_invalid_interval() {
        assert!(MapExtent::default().lon_ticks(0.0).is_err());
        assert!(MapExtent::default().lat_ticks(f32::INFINITY).is_err());
    }

    #[test]
    fn test_tiny_interval_is_rejected_before_allocating() {
        let err = MapExtent::default().lon_ticks(f32::MIN_POSITIVE).unwrap_err();
        assert!(matches!(err, Error::InvalidExtent(_)));
        assert!(arange_inclusive(0.0, f32::MAX, 1.0).is_err());
    }

    #[test]
    fn test_step_count_limit_is_inclusive() {
        let ticks = arange_inclusive(0.0, (MAX_STEPS - 1) as f32, 1.0).unwrap();
        assert_eq!(ticks.len(), MAX_STEPS);
        assert!(arange_inclusive(0.0, MAX_STEPS as f32, 1.0).is_err());
    }

    #[test]
    fn test_projection_round_trip() {
        let ext = MapExtent::default();
        let proj = ext.projection(Rect::new(100.0, 50.0, 300.0, 200.0)).unwrap();

        let nw = proj.to_pixel(-112.0, 46.0);
        assert_abs_diff_eq!(nw.x, 100.0);
        assert_abs_diff_eq!(nw.y, 50.0);

        let se = proj.to_pixel(-103.0, 40.0);
        assert_abs_diff_eq!(se.x, 400.0);
        assert_abs_diff_eq!(se.y, 250.0);

        let geo = proj.to_geo(250.0, 150.0);
        assert_abs_diff_eq!(geo.x, -107.5, epsilon = 1e-4);
        assert_abs_diff_eq!(geo.y, 43.0, epsilon = 1e-4);
    }

    #[test]
    fn test_projection_rejects_empty_box() {
        assert!(MapExtent::default().projection(Rect::new(0.0, 0.0, 0.0, 10.0)).is_err());
    }
}
