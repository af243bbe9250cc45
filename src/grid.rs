//! Uniform 2-D access to subplot grids.
//!
//! Subplot constructors traditionally hand back a different shape per
//! request: a bare surface for 1×1, a flat sequence for a single row or
//! column, and a nested sequence for M×N. [`RawAxes`] names those shapes
//! explicitly and [`AxesGrid`] normalizes all of them to one row-major grid
//! with bounds-checked `(row, col)` lookup, so callers never branch on shape.

use crate::error::{Error, Result};

/// Surfaces in the shape a subplot constructor natively returns.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAxes<S> {
    /// A single surface (1×1 request).
    Scalar(S),
    /// A flat sequence: one row, one column, or a row-major M×N grid.
    Sequence(Vec<S>),
    /// A nested sequence of rows.
    Nested(Vec<Vec<S>>),
}

impl<S> RawAxes<S> {
    /// Arrange row-major surfaces in the native shape for `rows × cols`.
    ///
    /// 1×1 becomes [`RawAxes::Scalar`], a single row or column becomes
    /// [`RawAxes::Sequence`], anything else [`RawAxes::Nested`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGridSpec`] for a zero dimension or an
    /// overflowing cell count and [`Error::ShapeMismatch`] if
    /// `cells.len() != rows * cols`.
    pub fn squeezed(cells: Vec<S>, rows: usize, cols: usize) -> Result<Self> {
        if cells.len() != cell_count(rows, cols)? {
            return Err(Error::ShapeMismatch { rows, cols, found: cells.len() });
        }

        if rows == 1 && cols == 1 {
            let mut cells = cells;
            let empty = Error::ShapeMismatch { rows, cols, found: 0 };
            return cells.pop().map(Self::Scalar).ok_or(empty);
        }
        if rows == 1 || cols == 1 {
            return Ok(Self::Sequence(cells));
        }

        let mut nested = Vec::with_capacity(rows);
        let mut iter = cells.into_iter();
        for _ in 0..rows {
            nested.push(iter.by_ref().take(cols).collect());
        }
        Ok(Self::Nested(nested))
    }

    /// Total number of surfaces held.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Sequence(v) => v.len(),
            Self::Nested(rows) => rows.iter().map(Vec::len).sum(),
        }
    }
}

/// Position of one cell in a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Row index (0 is the top row).
    pub row: usize,
    /// Column index (0 is the leftmost column).
    pub col: usize,
    rows: usize,
    cols: usize,
}

impl Cell {
    /// Cell `(row, col)` of a `rows × cols` grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CellOutOfBounds`] if the cell lies outside the grid.
    pub fn new(row: usize, col: usize, rows: usize, cols: usize) -> Result<Self> {
        if row >= rows || col >= cols {
            return Err(Error::CellOutOfBounds { row, col, rows, cols });
        }
        Ok(Self { row, col, rows, cols })
    }

    /// Whether the cell is in the first column.
    #[must_use]
    pub const fn is_left_edge(&self) -> bool {
        self.col == 0
    }

    /// Whether the cell is in the last column.
    #[must_use]
    pub const fn is_right_edge(&self) -> bool {
        self.col + 1 == self.cols
    }

    /// Whether the cell is in the first row.
    #[must_use]
    pub const fn is_top_edge(&self) -> bool {
        self.row == 0
    }

    /// Whether the cell is in the last row.
    #[must_use]
    pub const fn is_bottom_edge(&self) -> bool {
        self.row + 1 == self.rows
    }

    /// Row-major index of the cell.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.row * self.cols + self.col
    }
}

/// Row-major `rows × cols` grid of surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct AxesGrid<S> {
    rows: usize,
    cols: usize,
    cells: Vec<S>,
}

impl<S> AxesGrid<S> {
    /// Normalize a raw axes container into a grid.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidGridSpec`] if `rows` or `cols` is zero or their
    ///   product overflows.
    /// - [`Error::ShapeMismatch`] if the container does not hold exactly
    ///   `rows * cols` surfaces, a scalar is given for a larger grid, or a
    ///   nested container is ragged.
    ///
    /// # Example
    ///
    /// ```
    /// use fmap::grid::{AxesGrid, RawAxes};
    ///
    /// let grid = AxesGrid::from_raw(RawAxes::Sequence(vec!['a', 'b', 'c']), 3, 1).unwrap();
    /// assert_eq!(*grid.get(2, 0).unwrap(), 'c');
    /// ```
    pub fn from_raw(raw: RawAxes<S>, rows: usize, cols: usize) -> Result<Self> {
        let count = cell_count(rows, cols)?;
        let mismatch = |found| Error::ShapeMismatch { rows, cols, found };

        let cells = match raw {
            RawAxes::Scalar(surface) => {
                if rows != 1 || cols != 1 {
                    return Err(mismatch(1));
                }
                vec![surface]
            }
            RawAxes::Sequence(cells) => {
                if cells.len() != count {
                    return Err(mismatch(cells.len()));
                }
                cells
            }
            RawAxes::Nested(nested) => {
                let found = nested.iter().map(Vec::len).sum();
                if nested.len() != rows || nested.iter().any(|r| r.len() != cols) {
                    return Err(mismatch(found));
                }
                nested.into_iter().flatten().collect()
            }
        };

        Ok(Self { rows, cols, cells })
    }

    /// Build a grid by calling `f` for every cell in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGridSpec`] if `rows` or `cols` is zero or their
    /// product overflows.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(Cell) -> S,
    {
        let cells = (0..cell_count(rows, cols)?)
            .map(|i| f(Cell { row: i / cols, col: i % cols, rows, cols }))
            .collect();
        Ok(Self { rows, cols, cells })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a grid holds at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell descriptor for `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CellOutOfBounds`] if the cell lies outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Result<Cell> {
        Cell::new(row, col, self.rows, self.cols)
    }

    /// Surface at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CellOutOfBounds`] if the cell lies outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Result<&S> {
        let idx = self.cell(row, col)?.index();
        Ok(&self.cells[idx])
    }

    /// Mutable surface at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CellOutOfBounds`] if the cell lies outside the grid.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut S> {
        let idx = self.cell(row, col)?.index();
        Ok(&mut self.cells[idx])
    }

    /// Iterate over cells and surfaces in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &S)> {
        let (rows, cols) = (self.rows, self.cols);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, s)| (Cell { row: i / cols, col: i % cols, rows, cols }, s))
    }

    /// Iterate mutably over cells and surfaces in row-major order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Cell, &mut S)> {
        let (rows, cols) = (self.rows, self.cols);
        self.cells
            .iter_mut()
            .enumerate()
            .map(move |(i, s)| (Cell { row: i / cols, col: i % cols, rows, cols }, s))
    }

    /// Transform every surface, keeping the shape.
    pub fn map<T, F>(self, mut f: F) -> AxesGrid<T>
    where
        F: FnMut(Cell, S) -> T,
    {
        let (rows, cols) = (self.rows, self.cols);
        let cells = self
            .cells
            .into_iter()
            .enumerate()
            .map(|(i, s)| f(Cell { row: i / cols, col: i % cols, rows, cols }, s))
            .collect();
        AxesGrid { rows, cols, cells }
    }

    /// Fallible [`map`](Self::map); stops at the first error in row-major order.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<T, E, F>(self, mut f: F) -> std::result::Result<AxesGrid<T>, E>
    where
        F: FnMut(Cell, S) -> std::result::Result<T, E>,
    {
        let (rows, cols) = (self.rows, self.cols);
        let cells = self
            .cells
            .into_iter()
            .enumerate()
            .map(|(i, s)| f(Cell { row: i / cols, col: i % cols, rows, cols }, s))
            .collect::<std::result::Result<Vec<_>, E>>()?;
        Ok(AxesGrid { rows, cols, cells })
    }

    /// Row-major surfaces, consuming the grid.
    #[must_use]
    pub fn into_vec(self) -> Vec<S> {
        self.cells
    }

    /// Convert back into the native raw shape.
    #[must_use]
    pub fn into_raw(self) -> RawAxes<S> {
        let (rows, cols) = (self.rows, self.cols);
        // Dimensions and length are already validated.
        match RawAxes::squeezed(self.cells, rows, cols) {
            Ok(raw) => raw,
            Err(_) => RawAxes::Sequence(Vec::new()),
        }
    }
}

/// Number of cells in a `rows × cols` grid.
pub(crate) fn cell_count(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidGridSpec { rows, cols });
    }
    rows.checked_mul(cols).ok_or(Error::InvalidGridSpec { rows, cols })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trip() {
        let grid = AxesGrid::from_raw(RawAxes::Scalar("only"), 1, 1).unwrap();
        assert_eq!(grid.rows(), 1);
        assert_eq!(grid.cols(), 1);
        assert_eq!(*grid.get(0, 0).unwrap(), "only");
    }

    #[test]
    fn test_scalar_for_larger_grid_fails() {
        let err = AxesGrid::from_raw(RawAxes::Scalar(1), 1, 2).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { rows: 1, cols: 2, found: 1 }));
    }

    #[test]
    fn test_single_row_sequence() {
        let grid = AxesGrid::from_raw(RawAxes::Sequence(vec![10, 11, 12]), 1, 3).unwrap();
        assert_eq!(*grid.get(0, 2).unwrap(), 12);
        assert!(grid.get(1, 0).is_err());
    }

    #[test]
    fn test_single_column_sequence() {
        let grid = AxesGrid::from_raw(RawAxes::Sequence(vec![10, 11, 12]), 3, 1).unwrap();
        assert_eq!(*grid.get(2, 0).unwrap(), 12);
        assert!(grid.get(0, 1).is_err());
    }

    #[test]
    fn test_nested_grid() {
        let raw = RawAxes::Nested(vec![vec![0, 1, 2], vec![3, 4, 5]]);
        let grid = AxesGrid::from_raw(raw, 2, 3).unwrap();
        assert_eq!(*grid.get(1, 0).unwrap(), 3);
        assert_eq!(*grid.get(0, 2).unwrap(), 2);
    }

    #[test]
    fn test_ragged_nested_fails() {
        let raw = RawAxes::Nested(vec![vec![0, 1, 2], vec![3, 4], vec![5]]);
        let err = AxesGrid::from_raw(raw, 2, 3).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { found: 6, .. }));
    }

    #[test]
    fn test_count_mismatch_fails() {
        let err = AxesGrid::from_raw(RawAxes::Sequence(vec![1, 2, 3]), 2, 2).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { rows: 2, cols: 2, found: 3 }));
    }

    #[test]
    fn test_zero_dims_fail() {
        assert!(matches!(
            AxesGrid::<u8>::from_raw(RawAxes::Sequence(vec![]), 0, 3),
            Err(Error::InvalidGridSpec { rows: 0, cols: 3 })
        ));
        assert!(AxesGrid::from_fn(2, 0, |_| ()).is_err());
    }

    #[test]
    fn test_overflowing_dims_fail() {
        let huge = usize::MAX / 2 + 1;
        assert!(matches!(cell_count(huge, 2), Err(Error::InvalidGridSpec { cols: 2, .. })));
        assert!(matches!(
            AxesGrid::from_raw(RawAxes::Sequence(vec![1, 2]), huge, 2),
            Err(Error::InvalidGridSpec { .. })
        ));
        assert!(matches!(RawAxes::squeezed(vec![1], 2, huge), Err(Error::InvalidGridSpec { .. })));
        assert!(AxesGrid::from_fn(huge, 2, |_| ()).is_err());
        assert_eq!(cell_count(3, 4).unwrap(), 12);
    }

    #[test]
    fn test_out_of_bounds() {
        let grid = AxesGrid::from_fn(2, 2, |c| c.index()).unwrap();
        let err = grid.get(2, 0).unwrap_err();
        assert!(matches!(err, Error::CellOutOfBounds { row: 2, col: 0, rows: 2, cols: 2 }));
    }

    #[test]
    fn test_squeezed_shapes() {
        assert!(matches!(RawAxes::squeezed(vec![1], 1, 1).unwrap(), RawAxes::Scalar(1)));
        assert!(matches!(RawAxes::squeezed(vec![1, 2], 1, 2).unwrap(), RawAxes::Sequence(_)));
        assert!(matches!(RawAxes::squeezed(vec![1, 2], 2, 1).unwrap(), RawAxes::Sequence(_)));
        match RawAxes::squeezed(vec![1, 2, 3, 4, 5, 6], 2, 3).unwrap() {
            RawAxes::Nested(rows) => assert_eq!(rows, vec![vec![1, 2, 3], vec![4, 5, 6]]),
            other => panic!("expected nested, got {other:?}"),
        }
    }

    #[test]
    fn test_into_raw_matches_squeeze() {
        let grid = AxesGrid::from_fn(2, 2, |c| c.index()).unwrap();
        assert_eq!(grid.into_raw(), RawAxes::Nested(vec![vec![0, 1], vec![2, 3]]));
    }

    #[test]
    fn test_edges() {
        let grid = AxesGrid::from_fn(2, 3, |c| c).unwrap();
        let corner = grid.cell(1, 0).unwrap();
        assert!(corner.is_left_edge() && corner.is_bottom_edge());
        assert!(!corner.is_top_edge() && !corner.is_right_edge());

        let single = Cell::new(0, 0, 1, 1).unwrap();
        assert!(single.is_left_edge() && single.is_right_edge());
        assert!(single.is_top_edge() && single.is_bottom_edge());
    }

    #[test]
    fn test_iter_is_row_major() {
        let grid = AxesGrid::from_fn(2, 3, |c| (c.row, c.col)).unwrap();
        let order: Vec<_> = grid.iter().map(|(cell, v)| {
            assert_eq!((cell.row, cell.col), *v);
            *v
        }).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_map_keeps_shape() {
        let grid = AxesGrid::from_fn(3, 2, |c| c.index()).unwrap();
        let doubled = grid.map(|_, v| v * 2);
        assert_eq!(doubled.rows(), 3);
        assert_eq!(*doubled.get(2, 1).unwrap(), 10);
    }
}
