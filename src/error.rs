//! Error types for fmap operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by a caller-supplied drawing callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in fmap operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// A raw axes container does not hold `rows * cols` surfaces.
    #[error("Shape mismatch: expected {rows}x{cols} surfaces, found {found}")]
    ShapeMismatch {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
        /// Number of surfaces actually present.
        found: usize,
    },

    /// A cell lookup fell outside the grid.
    #[error("Cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    CellOutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Grid row count.
        rows: usize,
        /// Grid column count.
        cols: usize,
    },

    /// Row or column count below one, or a cell count too large to hold.
    #[error("Invalid grid: {rows}x{cols} (need at least one row and column, bounded cell count)")]
    InvalidGridSpec {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },

    /// A per-cell drawing callback failed; composition was aborted.
    #[error("Drawing callback failed at cell ({row}, {col}): {source}")]
    Callback {
        /// Row of the failing cell.
        row: usize,
        /// Column of the failing cell.
        col: usize,
        /// The callback's own error.
        #[source]
        source: BoxError,
    },

    /// Unrecognized style or enumerated option name.
    #[error("Invalid style: {0:?}")]
    InvalidStyle(String),

    /// Numeric option outside its valid range (sizes, offsets, alpha).
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Non-finite tick label rotation.
    #[error("Invalid {axis} rotation: {value}")]
    InvalidRotation {
        /// Which tick axis ("latitude" or "longitude").
        axis: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// Padding values outside their valid ranges.
    #[error("Invalid padding: {0}")]
    InvalidPadding(String),

    /// Map extent or tick spacing is not usable.
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    /// Contour levels are empty, unsorted or non-finite.
    #[error("Invalid levels: {0}")]
    InvalidLevels(String),

    /// Colorbar geometry or anchor is not usable.
    #[error("Invalid colorbar: {0}")]
    InvalidColorbar(String),

    /// Field coordinates are not strictly monotonic or too short.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Data length mismatch between paired arrays.
    #[error("Data length mismatch: expected {expected} elements, found {actual}")]
    DataLengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// Invalid dimensions for a framebuffer or figure.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Scale domain error (e.g., log of non-positive value).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Unrecognized number format specification.
    #[error("Invalid precision: {0:?}")]
    InvalidPrecision(String),

    /// Output format not supported by [`crate::figure::Figure::save`].
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Wrap a callback failure for the given cell.
    pub(crate) fn callback<E>(row: usize, col: usize, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Callback { row, col, source: source.into() }
    }
}
