//! One entry point for single, row, column and grid map figures.
//!
//! [`make_plots`] builds the figure, normalizes its panels into an
//! [`AxesGrid`], runs the caller's drawing callback once per cell in
//! row-major order, then applies tick-label policy, padding and the
//! figure title. Everything it needs comes in through [`PlotOptions`];
//! there are no module-level defaults to mutate.

use tracing::{debug, info};

use crate::axes::Axes;
use crate::color::Rgba;
use crate::error::{BoxError, Error, Result};
use crate::extent::{MapExtent, TickSpacing};
use crate::figure::{subplots, Figure, Padding, Suptitle};
use crate::grid::{cell_count, AxesGrid, Cell, RawAxes};
use crate::labels::{axes_labels, LabelStyle, RotationSpec};

/// Pixels per panel column (and row) for [`FigureSize::Auto`].
const PANEL_SIZE: u32 = 400;

/// Extra height reserved for titles with [`FigureSize::Auto`].
const TITLE_ALLOWANCE: u32 = 100;

/// Figure size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FigureSize {
    /// 400 px per column by 400 px per row, plus 100 px of title room.
    #[default]
    Auto,
    /// Explicit width and height.
    Pixels {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
}

impl FigureSize {
    /// Width and height for a `rows × cols` grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for a zero or overflowing size.
    pub fn resolve(self, rows: usize, cols: usize) -> Result<(u32, u32)> {
        let (width, height) = match self {
            Self::Pixels { width, height } => (width, height),
            Self::Auto => {
                let scaled =
                    |n: usize| u32::try_from(n).ok().and_then(|n| n.checked_mul(PANEL_SIZE));
                let width = scaled(cols);
                let height = scaled(rows).and_then(|h| h.checked_add(TITLE_ALLOWANCE));
                (width.unwrap_or(0), height.unwrap_or(0))
            }
        };
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok((width, height))
    }
}

/// Composition settings shared by every panel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlotOptions {
    /// Figure size.
    pub size: FigureSize,
    /// Figure background.
    pub background: Rgba,
    /// Map extent of every panel.
    pub extent: MapExtent,
    /// Tick spacing of every panel.
    pub ticks: TickSpacing,
    /// Coordinate tick label font size.
    pub tick_font_size: f32,
    /// Panel title font size.
    pub title_font_size: f32,
    /// Figure-level title.
    pub suptitle: Option<Suptitle>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            size: FigureSize::Auto,
            background: Rgba::WHITE,
            extent: MapExtent::default(),
            ticks: TickSpacing::default(),
            tick_font_size: 16.0,
            title_font_size: 18.0,
            suptitle: None,
        }
    }
}

impl PlotOptions {
    /// Settings for a lone map: smaller tick labels, larger title.
    #[must_use]
    pub fn single() -> Self {
        Self { tick_font_size: 8.0, title_font_size: 20.0, ..Self::default() }
    }

    /// Set the figure size.
    #[must_use]
    pub fn size(mut self, size: FigureSize) -> Self {
        self.size = size;
        self
    }

    /// Set the map extent.
    #[must_use]
    pub fn extent(mut self, extent: MapExtent) -> Self {
        self.extent = extent;
        self
    }

    /// Set the tick spacing.
    #[must_use]
    pub fn ticks(mut self, ticks: TickSpacing) -> Self {
        self.ticks = ticks;
        self
    }

    /// Set the tick label font size.
    #[must_use]
    pub fn tick_font_size(mut self, size: f32) -> Self {
        self.tick_font_size = size;
        self
    }

    /// Set the figure title.
    #[must_use]
    pub fn suptitle(mut self, suptitle: Suptitle) -> Self {
        self.suptitle = Some(suptitle);
        self
    }

    fn validate(&self) -> Result<()> {
        // Tick generation rejects non-positive or non-finite intervals.
        self.extent.lon_ticks(self.ticks.lon)?;
        self.extent.lat_ticks(self.ticks.lat)?;
        for (what, size) in [
            ("tick font size", self.tick_font_size),
            ("title font size", self.title_font_size),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return Err(Error::InvalidOption(format!("{what} must be positive, got {size}")));
            }
        }
        Ok(())
    }

    fn template(&self) -> Axes {
        Axes::new(self.extent)
            .with_ticks(self.ticks)
            .with_tick_font_size(self.tick_font_size)
            .with_title_font_size(self.title_font_size)
    }
}

/// A composed figure and the per-cell artifacts its callback returned.
#[derive(Debug)]
pub struct Composition<A> {
    /// The figure, owning the panel grid.
    pub figure: Figure,
    /// Callback results, one per cell.
    pub artifacts: AxesGrid<A>,
}

impl<A> Composition<A> {
    /// Panel grid.
    #[must_use]
    pub fn axes(&self) -> &AxesGrid<Axes> {
        self.figure.axes()
    }

    /// Artifact at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CellOutOfBounds`] if the cell lies outside the grid.
    pub fn artifact(&self, row: usize, col: usize) -> Result<&A> {
        self.artifacts.get(row, col)
    }
}

/// Compose a `rows × cols` map figure.
///
/// `draw` runs once per cell in row-major order with the cell and its
/// panel; its return values are collected into
/// [`Composition::artifacts`]. The first callback error aborts the whole
/// composition.
///
/// # Errors
///
/// - [`Error::InvalidGridSpec`] if `rows` or `cols` is zero or the grid
///   would exceed [`MAX_PANELS`](crate::figure::MAX_PANELS) panels (checked
///   before anything is built).
/// - [`Error::Callback`] with the failing cell if `draw` fails.
/// - Configuration errors from `options`.
///
/// # Example
///
/// ```
/// use fmap::prelude::*;
///
/// let padding = Padding::new(0.05, 0.95, 0.9, 0.1, 0.1, 0.2).unwrap();
/// let composed = make_plots(
///     2,
///     3,
///     &padding,
///     LabelStyle::outer(),
///     RotationSpec::NONE,
///     &PlotOptions::default(),
///     |cell, axes| {
///         axes.set_title(format!("panel {}", cell.index()));
///         Ok::<_, fmap::Error>(cell.index())
///     },
/// )
/// .unwrap();
/// assert_eq!(*composed.artifact(1, 2).unwrap(), 5);
/// ```
pub fn make_plots<A, E, F>(
    rows: usize,
    cols: usize,
    padding: &Padding,
    style: LabelStyle,
    rotation: RotationSpec,
    options: &PlotOptions,
    mut draw: F,
) -> Result<Composition<A>>
where
    F: FnMut(Cell, &mut Axes) -> std::result::Result<A, E>,
    E: Into<BoxError>,
{
    let count = cell_count(rows, cols)?;
    options.validate()?;
    let (width, height) = options.size.resolve(rows, cols)?;

    let raw = subplots(rows, cols, &options.template())?;
    let grid = AxesGrid::from_raw(raw, rows, cols)?;
    let mut figure = Figure::new(width, height, options.background, grid)?;

    let mut artifacts = Vec::with_capacity(count);
    for (cell, axes) in figure.axes_mut().iter_mut() {
        debug!(row = cell.row, col = cell.col, "drawing cell");
        let artifact = draw(cell, axes).map_err(|e| Error::callback(cell.row, cell.col, e))?;
        artifacts.push(artifact);
    }

    axes_labels(figure.axes_mut(), style, rotation);
    figure.subplots_adjust(padding);
    if let Some(suptitle) = &options.suptitle {
        figure.set_suptitle(suptitle.clone())?;
    }

    let artifacts = AxesGrid::from_raw(RawAxes::Sequence(artifacts), rows, cols)?;
    info!(rows, cols, width, height, style = %style, "composed map figure");
    Ok(Composition { figure, artifacts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::XEdge;

    fn padding() -> Padding {
        Padding::new(0.05, 0.95, 0.9, 0.1, 0.1, 0.2).unwrap()
    }

    fn compose(rows: usize, cols: usize, style: LabelStyle) -> Result<Composition<Cell>> {
        make_plots(
            rows,
            cols,
            &padding(),
            style,
            RotationSpec::NONE,
            &PlotOptions::default(),
            |cell, _| Ok::<_, Error>(cell),
        )
    }

    fn draw_all<A, E>(
        rows: usize,
        cols: usize,
        options: &PlotOptions,
        draw: impl FnMut(Cell, &mut Axes) -> std::result::Result<A, E>,
    ) -> Result<Composition<A>>
    where
        E: Into<BoxError>,
    {
        make_plots(rows, cols, &padding(), LabelStyle::All, RotationSpec::NONE, options, draw)
    }

    #[test]
    fn test_auto_size() {
        assert_eq!(FigureSize::Auto.resolve(2, 3).unwrap(), (1200, 900));
        let fixed = FigureSize::Pixels { width: 640, height: 480 };
        assert_eq!(fixed.resolve(5, 5).unwrap(), (640, 480));
        assert!(FigureSize::Pixels { width: 0, height: 480 }.resolve(1, 1).is_err());
    }

    #[test]
    fn test_callback_sees_row_major_cells() {
        let mut seen = Vec::new();
        draw_all(2, 2, &PlotOptions::default(), |cell, _| {
            seen.push((cell.row, cell.col));
            Ok::<_, Error>(())
        })
        .unwrap();
        assert_eq!(seen, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_artifacts_indexed_by_cell() {
        let composed = compose(3, 2, LabelStyle::All).unwrap();
        for (cell, artifact) in composed.artifacts.iter() {
            assert_eq!(cell, *artifact);
        }
        assert_eq!(composed.axes().len(), 6);
    }

    #[test]
    fn test_zero_rows_rejected_before_drawing() {
        let mut calls = 0;
        let err = draw_all(0, 3, &PlotOptions::default(), |_, _| {
            calls += 1;
            Ok::<_, Error>(())
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidGridSpec { rows: 0, cols: 3 }));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_first_failure_aborts() {
        let mut calls = 0;
        let err = draw_all(2, 2, &PlotOptions::default(), |cell, _| {
            calls += 1;
            if cell.row == 0 && cell.col == 1 {
                return Err("missing data");
            }
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Callback { row: 0, col: 1, .. }));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_labels_applied_after_drawing() {
        let composed = compose(2, 2, "outer-top-left".parse().unwrap()).unwrap();
        let top_right = composed.axes().get(0, 1).unwrap().labels();
        assert!(top_right.show_x);
        assert_eq!(top_right.x_edge, XEdge::Top);
        assert!(!top_right.show_y);
        assert!(!composed.axes().get(1, 0).unwrap().labels().show_x);
    }

    #[test]
    fn test_options_flow_into_panels() {
        let options = PlotOptions::single().suptitle(Suptitle::new("Storm total"));
        let composed = draw_all(1, 1, &options, |_, axes| Ok::<_, Error>(axes.ticks())).unwrap();
        assert_eq!(composed.figure.suptitle().map(|s| s.text.as_str()), Some("Storm total"));
        assert_eq!(*composed.artifact(0, 0).unwrap(), TickSpacing::default());
    }

    fn compose_with(rows: usize, cols: usize, options: &PlotOptions) -> Result<Composition<()>> {
        draw_all(rows, cols, options, |_, _| Ok::<_, Error>(()))
    }

    #[test]
    fn test_invalid_tick_spacing_rejected() {
        let options = PlotOptions::default().ticks(TickSpacing::new(0.0, 1.0));
        assert!(matches!(compose_with(1, 1, &options), Err(Error::InvalidExtent(_))));
    }

    #[test]
    fn test_tiny_tick_spacing_rejected() {
        let options = PlotOptions::default().ticks(TickSpacing::new(f32::MIN_POSITIVE, 1.0));
        assert!(matches!(compose_with(1, 1, &options), Err(Error::InvalidExtent(_))));
    }

    #[test]
    fn test_overflowing_grid_rejected() {
        let options = PlotOptions::default().size(FigureSize::Pixels { width: 800, height: 600 });
        let err = compose_with(usize::MAX / 2 + 1, 2, &options).unwrap_err();
        assert!(matches!(err, Error::InvalidGridSpec { cols: 2, .. }));
        let err = compose_with(1 << 20, 1 << 20, &options).unwrap_err();
        assert!(matches!(err, Error::InvalidGridSpec { .. }));
    }

    #[test]
    fn test_bad_font_size_rejected() {
        let options = PlotOptions::default().tick_font_size(0.0);
        assert!(matches!(compose_with(1, 1, &options), Err(Error::InvalidOption(_))));
    }
}
