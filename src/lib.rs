//! # fmap
//!
//! Multi-panel map figures with one call.
//!
//! fmap composes single maps, rows, columns and grids of lon/lat panels,
//! presents every layout through the same `(row, col)` grid, and takes care
//! of the repetitive decorations around them: coordinate tick labels on the
//! outer panels only, shared or per-panel colorbars with thinned tick
//! labels, contour labels and free text annotations.
//!
//! ## Features
//!
//! - **Uniform indexing**: scalar, 1-D and 2-D subplot shapes normalized to an [`grid::AxesGrid`]
//! - **Label policy**: `all` or `outer` tick labels with selectable outer edges
//! - **Decorators**: colorbars with tick-label suppression, inline contour labels
//! - **Pure Rust output**: SVG documents with embedded PNG raster layers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fmap::prelude::*;
//!
//! let padding = Padding::new(0.05, 0.9, 0.9, 0.1, 0.1, 0.2)?;
//! let mut composed = make_plots(
//!     2,
//!     3,
//!     &padding,
//!     LabelStyle::outer(),
//!     RotationSpec::NONE,
//!     &PlotOptions::default(),
//!     |cell, axes| {
//!         axes.contourf(&fields[cell.index()], &Levels::default(), &FillStyle::default())
//!     },
//! )?;
//!
//! let mappable = composed.artifact(0, 0)?.clone();
//! let spec = ColorbarSpec::default();
//! make_colorbar(&mut composed.figure, ColorbarAnchor::Figure, &mappable, &spec)?;
//! composed.figure.save("precip.svg")?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and parsing.
pub mod color;

/// RGBA framebuffer for raster layers.
pub mod framebuffer;

/// Geometric primitives (points, rectangles).
pub mod geometry;

/// Scales, colormaps and norms.
pub mod scale;

/// Number and coordinate label formatting.
pub mod format;

// ============================================================================
// Map Modules
// ============================================================================

/// Map extents, tick generation and projection onto panels.
pub mod extent;

/// Gridded fields sampled on lon/lat coordinates.
pub mod field;

/// Contour levels, lines and labels.
pub mod contour;

/// Map panels and their drawing operations.
pub mod axes;

/// Text annotations.
pub mod text;

// ============================================================================
// Composition Modules
// ============================================================================

/// Uniform 2-D grid access.
pub mod grid;

/// Tick label placement policy.
pub mod labels;

/// Figures, layout and saving.
pub mod figure;

/// Colorbars.
pub mod colorbar;

/// The multi-panel composer.
pub mod compose;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Output encoders (SVG, PNG).
pub mod output;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for fmap operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use fmap::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::axes::{Axes, Extend, FillStyle, Layer, Mappable, ScatterStyle};
    pub use crate::color::Rgba;
    pub use crate::colorbar::{
        make_colorbar, Colorbar, ColorbarAnchor, ColorbarId, ColorbarSpec, Orientation,
        TickSuppression,
    };
    pub use crate::compose::{make_plots, Composition, FigureSize, PlotOptions};
    pub use crate::contour::{
        show_contour_labels, ContourLabelFormat, ContourLabels, ContourSet, Dash, Levels, LineStyle,
    };
    pub use crate::error::{Error, Result};
    pub use crate::extent::{MapExtent, TickSpacing};
    pub use crate::field::Field;
    pub use crate::figure::{Figure, Padding, Suptitle};
    pub use crate::format::Precision;
    pub use crate::geometry::{Point, Rect};
    pub use crate::grid::{AxesGrid, Cell, RawAxes};
    pub use crate::labels::{
        axes_labels, place_labels, LabelDecision, LabelStyle, RotationSpec, XEdge, YEdge,
    };
    pub use crate::scale::{Colormap, Norm};
    pub use crate::text::{plot_text, plot_value, Marker, MarkerShape, TextStyle};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
