//! Figures: a grid of map panels plus figure-level decorations.
//!
//! Layout follows subplots-adjust semantics: [`Padding`] places the grid in
//! figure fractions and each panel keeps its lon/lat aspect, centered in its
//! slot. Rendering produces a single SVG document.

use std::path::Path;

use batuta_common::display::WithDimensions;
use tracing::info;

use crate::axes::Axes;
use crate::color::Rgba;
use crate::colorbar::{Colorbar, ColorbarAnchor, ColorbarId};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::grid::{cell_count, AxesGrid, RawAxes};
use crate::output::{SvgElement, SvgEncoder, TextAnchor};

/// Grid placement in figure fractions.
///
/// `left`/`right` are measured from the left edge, `bottom`/`top` from the
/// bottom edge. `wspace`/`hspace` are gaps between panels as a fraction of
/// the average panel width/height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    wspace: f32,
    hspace: f32,
}

/// Placement used until the caller supplies padding.
const INITIAL_PADDING: Padding = Padding {
    left: 0.125,
    right: 0.9,
    top: 0.88,
    bottom: 0.11,
    wspace: 0.2,
    hspace: 0.2,
};

/// Most panels one figure may hold.
pub const MAX_PANELS: usize = 10_000;

impl Padding {
    /// Validated padding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPadding`] unless all values are finite,
    /// `0 <= left < right <= 1`, `0 <= bottom < top <= 1` and both spacings
    /// are non-negative.
    pub fn new(
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        wspace: f32,
        hspace: f32,
    ) -> Result<Self> {
        let all = [left, right, top, bottom, wspace, hspace];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidPadding(format!("values must be finite, got {all:?}")));
        }
        if !(0.0 <= left && left < right && right <= 1.0) {
            return Err(Error::InvalidPadding(format!(
                "need 0 <= left < right <= 1, got left={left} right={right}"
            )));
        }
        if !(0.0 <= bottom && bottom < top && top <= 1.0) {
            return Err(Error::InvalidPadding(format!(
                "need 0 <= bottom < top <= 1, got bottom={bottom} top={top}"
            )));
        }
        if wspace < 0.0 || hspace < 0.0 {
            return Err(Error::InvalidPadding(format!(
                "spacing must be non-negative, got wspace={wspace} hspace={hspace}"
            )));
        }
        Ok(Self {
            left,
            right,
            top,
            bottom,
            wspace,
            hspace,
        })
    }

    /// Left edge of the grid.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.left
    }

    /// Right edge of the grid.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.right
    }

    /// Top edge of the grid.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.top
    }

    /// Bottom edge of the grid.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    /// Horizontal gap between panels.
    #[must_use]
    pub fn wspace(&self) -> f32 {
        self.wspace
    }

    /// Vertical gap between panels.
    #[must_use]
    pub fn hspace(&self) -> f32 {
        self.hspace
    }
}

/// A figure-level title.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Suptitle {
    /// Title text.
    pub text: String,
    /// Horizontal center, figure fraction from the left.
    pub x: f32,
    /// Top of the text, figure fraction from the bottom.
    pub y: f32,
    /// Font size in pixels.
    pub font_size: f32,
}

impl Suptitle {
    /// Centered title near the top of the figure.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), x: 0.5, y: 0.98, font_size: 20.0 }
    }

    /// Set the position in figure fractions.
    #[must_use]
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the font size.
    #[must_use]
    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(Error::InvalidOption(format!(
                "suptitle position ({}, {}) must be finite",
                self.x, self.y
            )));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(Error::InvalidOption(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        Ok(())
    }
}

/// Create `rows × cols` copies of `template` in the squeezed shape a
/// plotting host hands back: a scalar for 1×1, a sequence for one row or
/// column, nested rows otherwise.
///
/// # Errors
///
/// Returns [`Error::InvalidGridSpec`] if either count is zero or the grid
/// would hold more than [`MAX_PANELS`] panels.
pub fn subplots(rows: usize, cols: usize, template: &Axes) -> Result<RawAxes<Axes>> {
    let count = cell_count(rows, cols)?;
    if count > MAX_PANELS {
        return Err(Error::InvalidGridSpec { rows, cols });
    }
    RawAxes::squeezed(vec![template.clone(); count], rows, cols)
}

/// A rendered-on-demand figure.
#[derive(Debug, Clone)]
pub struct Figure {
    width: u32,
    height: u32,
    background: Rgba,
    axes: AxesGrid<Axes>,
    padding: Padding,
    suptitle: Option<Suptitle>,
    colorbars: Vec<Colorbar>,
}

impl Figure {
    /// A figure of `width × height` pixels holding `axes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32, background: Rgba, axes: AxesGrid<Axes>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let mut figure = Self {
            width,
            height,
            background,
            axes,
            padding: INITIAL_PADDING,
            suptitle: None,
            colorbars: Vec::new(),
        };
        figure.layout();
        Ok(figure)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Background color.
    #[must_use]
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// The panel grid.
    #[must_use]
    pub fn axes(&self) -> &AxesGrid<Axes> {
        &self.axes
    }

    /// The panel grid, mutably.
    pub fn axes_mut(&mut self) -> &mut AxesGrid<Axes> {
        &mut self.axes
    }

    /// Current grid placement.
    #[must_use]
    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Place the grid and recompute every panel box.
    pub fn subplots_adjust(&mut self, padding: &Padding) {
        self.padding = *padding;
        self.layout();
    }

    /// Figure-level title.
    #[must_use]
    pub fn suptitle(&self) -> Option<&Suptitle> {
        self.suptitle.as_ref()
    }

    /// Set the figure-level title.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for a non-finite position or a
    /// non-positive font size.
    pub fn set_suptitle(&mut self, suptitle: Suptitle) -> Result<()> {
        suptitle.validate()?;
        self.suptitle = Some(suptitle);
        Ok(())
    }

    /// Look up a colorbar.
    #[must_use]
    pub fn colorbar(&self, id: ColorbarId) -> Option<&Colorbar> {
        self.colorbars.get(id.index())
    }

    /// All colorbars in creation order.
    #[must_use]
    pub fn colorbars(&self) -> &[Colorbar] {
        &self.colorbars
    }

    pub(crate) fn push_colorbar(&mut self, colorbar: Colorbar) -> ColorbarId {
        self.colorbars.push(colorbar);
        ColorbarId::new(self.colorbars.len() - 1)
    }

    /// Pixel box a colorbar attaches to.
    pub(crate) fn anchor_rect(&self, anchor: ColorbarAnchor) -> Result<Rect> {
        match anchor {
            ColorbarAnchor::Cell { row, col } => Ok(self.axes.get(row, col)?.position()),
            ColorbarAnchor::Figure => self
                .axes
                .iter()
                .map(|(_, axes)| axes.position())
                .reduce(|a, b| a.union(&b))
                .ok_or(Error::EmptyData),
        }
    }

    fn layout(&mut self) {
        let (w, h) = (self.width as f32, self.height as f32);
        let p = self.padding;
        let rows = self.axes.rows() as f32;
        let cols = self.axes.cols() as f32;

        let left = p.left * w;
        let top = (1.0 - p.top) * h;
        let cell_w = (p.right - p.left) * w / (cols + (cols - 1.0) * p.wspace);
        let cell_h = (p.top - p.bottom) * h / (rows + (rows - 1.0) * p.hspace);

        for (cell, axes) in self.axes.iter_mut() {
            let slot = Rect::new(
                left + cell.col as f32 * cell_w * (1.0 + p.wspace),
                top + cell.row as f32 * cell_h * (1.0 + p.hspace),
                cell_w,
                cell_h,
            );
            axes.set_position(slot.fit_aspect(axes.extent().aspect()));
        }
    }

    /// Build the SVG document for the figure.
    ///
    /// # Errors
    ///
    /// Returns an error if a raster layer cannot be encoded.
    pub fn to_svg_encoder(&self) -> Result<SvgEncoder> {
        let mut encoder =
            SvgEncoder::new(self.width, self.height).background(Some(self.background));

        for (_, axes) in self.axes.iter() {
            encoder.extend(axes.render(self.background)?);
        }
        for colorbar in &self.colorbars {
            encoder.extend(colorbar.render(self.anchor_rect(colorbar.anchor())?));
        }
        if let Some(title) = &self.suptitle {
            encoder.add_element(SvgElement::text(
                title.x * self.width as f32,
                (1.0 - title.y) * self.height as f32 + title.font_size * 0.5,
                title.text.as_str(),
                title.font_size,
                Rgba::BLACK,
                TextAnchor::Middle,
            ));
        }
        Ok(encoder)
    }

    /// Render the figure to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns an error if a raster layer cannot be encoded.
    pub fn render_svg(&self) -> Result<String> {
        Ok(self.to_svg_encoder()?.render())
    }

    /// Write the figure to `path`. Only `.svg` is supported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for any other extension, or an
    /// I/O error if writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if !ext.eq_ignore_ascii_case("svg") {
            let shown = if ext.is_empty() { path.display().to_string() } else { ext.to_string() };
            return Err(Error::UnsupportedFormat(shown));
        }

        self.to_svg_encoder()?.write_to_file(path)?;
        info!(path = %path.display(), width = self.width, height = self.height, "figure saved");
        Ok(())
    }
}

impl WithDimensions for Figure {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.layout();
    }
}
