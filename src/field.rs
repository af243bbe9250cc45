//! Gridded scalar fields on a regular longitude/latitude mesh.

use trueno::Vector;

use crate::error::{Error, Result};

/// Scalar values on a lon/lat grid.
///
/// Values are row-major with latitude as the row: `values[j * nx + i]` sits
/// at `(lons[i], lats[j])`. Both coordinate vectors are stored ascending.
/// `NaN` marks missing data.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    lons: Vec<f32>,
    lats: Vec<f32>,
    values: Vec<f32>,
}

impl Field {
    /// Create a field from its coordinate vectors and row-major values.
    ///
    /// Descending coordinates (north-to-south rows are common in gridded
    /// products) are reversed, together with the values, so the stored
    /// field is always ascending.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyData`] if any input is empty.
    /// - [`Error::InvalidField`] for fewer than two points on an axis or a
    ///   coordinate vector that is not finite and strictly monotonic.
    /// - [`Error::DataLengthMismatch`] if `values.len() != lons.len() * lats.len()`.
    pub fn new(lons: Vec<f32>, lats: Vec<f32>, values: Vec<f32>) -> Result<Self> {
        if lons.is_empty() || lats.is_empty() || values.is_empty() {
            return Err(Error::EmptyData);
        }
        if lons.len() < 2 || lats.len() < 2 {
            return Err(Error::InvalidField(format!(
                "need at least 2x2 points, got {}x{}",
                lons.len(),
                lats.len()
            )));
        }
        let expected = lons.len() * lats.len();
        if values.len() != expected {
            return Err(Error::DataLengthMismatch { expected, actual: values.len() });
        }

        let lon_order = monotonic("longitude", &lons)?;
        let lat_order = monotonic("latitude", &lats)?;

        let mut field = Self { lons, lats, values };
        if lon_order == Order::Descending {
            field.flip_lons();
        }
        if lat_order == Order::Descending {
            field.flip_lats();
        }
        Ok(field)
    }

    /// Evaluate `f(lon, lat)` at every grid point.
    ///
    /// # Errors
    ///
    /// Same coordinate checks as [`Field::new`].
    pub fn from_fn<F>(lons: Vec<f32>, lats: Vec<f32>, mut f: F) -> Result<Self>
    where
        F: FnMut(f32, f32) -> f32,
    {
        let values = lats
            .iter()
            .flat_map(|&lat| lons.iter().map(move |&lon| (lon, lat)))
            .map(|(lon, lat)| f(lon, lat))
            .collect();
        Self::new(lons, lats, values)
    }

    /// Longitudes, ascending.
    #[must_use]
    pub fn lons(&self) -> &[f32] {
        &self.lons
    }

    /// Latitudes, ascending.
    #[must_use]
    pub fn lats(&self) -> &[f32] {
        &self.lats
    }

    /// Row-major values.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of longitude points.
    #[must_use]
    pub fn nx(&self) -> usize {
        self.lons.len()
    }

    /// Number of latitude points.
    #[must_use]
    pub fn ny(&self) -> usize {
        self.lats.len()
    }

    /// Value at longitude index `i`, latitude index `j`.
    #[must_use]
    pub fn value(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.nx() || j >= self.ny() {
            return None;
        }
        self.values.get(j * self.nx() + i).copied()
    }

    /// Smallest and largest finite value, or `None` if every value is missing.
    #[must_use]
    pub fn value_range(&self) -> Option<(f32, f32)> {
        let finite: Vec<f32> = self.values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }

        let vec = Vector::from_vec(finite);
        let min = vec.min().unwrap_or(f32::INFINITY);
        let max = vec.max().unwrap_or(f32::NEG_INFINITY);
        (min <= max).then_some((min, max))
    }

    /// Bilinear interpolation at `(lon, lat)`.
    ///
    /// Returns `None` outside the grid or when a surrounding value is missing.
    #[must_use]
    pub fn sample(&self, lon: f32, lat: f32) -> Option<f32> {
        let (i, tx) = locate(&self.lons, lon)?;
        let (j, ty) = locate(&self.lats, lat)?;

        let v00 = self.value(i, j)?;
        let v10 = self.value(i + 1, j)?;
        let v01 = self.value(i, j + 1)?;
        let v11 = self.value(i + 1, j + 1)?;

        let bottom = v00 + (v10 - v00) * tx;
        let top = v01 + (v11 - v01) * tx;
        let v = bottom + (top - bottom) * ty;
        v.is_finite().then_some(v)
    }

    fn flip_lons(&mut self) {
        let nx = self.nx();
        self.lons.reverse();
        for row in self.values.chunks_exact_mut(nx) {
            row.reverse();
        }
    }

    fn flip_lats(&mut self) {
        let nx = self.nx();
        self.lats.reverse();
        let rows: Vec<Vec<f32>> = self.values.chunks_exact(nx).rev().map(<[f32]>::to_vec).collect();
        self.values = rows.concat();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Ascending,
    Descending,
}

fn monotonic(axis: &str, coords: &[f32]) -> Result<Order> {
    if coords.iter().any(|c| !c.is_finite()) {
        return Err(Error::InvalidField(format!("{axis} coordinates must be finite")));
    }
    if coords.windows(2).all(|w| w[0] < w[1]) {
        Ok(Order::Ascending)
    } else if coords.windows(2).all(|w| w[0] > w[1]) {
        Ok(Order::Descending)
    } else {
        Err(Error::InvalidField(format!("{axis} coordinates must be strictly monotonic")))
    }
}

/// Index of the interval containing `x` and the fractional position inside it.
fn locate(coords: &[f32], x: f32) -> Option<(usize, f32)> {
    let first = *coords.first()?;
    let last = *coords.last()?;
    if !(x >= first && x <= last) {
        return None;
    }

    let upper = coords.partition_point(|&c| c <= x).clamp(1, coords.len() - 1);
    let i = upper - 1;
    let (x0, x1) = (coords[i], coords[upper]);
    Some((i, (x - x0) / (x1 - x0)))
}
