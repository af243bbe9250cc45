//! Coordinate tick-label placement across a grid of map panels.
//!
//! Longitude labels run along the x axis and latitude labels along the y
//! axis. [`LabelStyle::All`] labels every panel; [`LabelStyle::Outer`] only
//! labels the panels on one chosen edge per axis, which keeps dense grids
//! readable.

use std::fmt;
use std::str::FromStr;

use crate::axes::Axes;
use crate::error::{Error, Result};
use crate::grid::{AxesGrid, Cell};

/// Side of a panel that carries longitude (x) labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum XEdge {
    /// Below the panel.
    #[default]
    Bottom,
    /// Above the panel.
    Top,
}

/// Side of a panel that carries latitude (y) labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum YEdge {
    /// Left of the panel.
    #[default]
    Left,
    /// Right of the panel.
    Right,
}

/// Which panels receive coordinate tick labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LabelStyle {
    /// Every panel is labeled on both axes.
    #[default]
    All,
    /// Only panels on the given outer edges are labeled.
    Outer {
        /// Grid edge whose panels get longitude labels.
        x_edge: XEdge,
        /// Grid edge whose panels get latitude labels.
        y_edge: YEdge,
    },
}

impl LabelStyle {
    /// Outer labeling on the bottom row and left column.
    #[must_use]
    pub const fn outer() -> Self {
        Self::Outer { x_edge: XEdge::Bottom, y_edge: YEdge::Left }
    }
}

impl FromStr for LabelStyle {
    type Err = Error;

    /// Parse `all`, `outer`, or `outer-<top|bottom>-<left|right>`.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase().replace('_', "-");
        let (x_edge, y_edge) = match name.as_str() {
            "all" => return Ok(Self::All),
            "outer" | "outer-bottom-left" => (XEdge::Bottom, YEdge::Left),
            "outer-bottom-right" => (XEdge::Bottom, YEdge::Right),
            "outer-top-left" => (XEdge::Top, YEdge::Left),
            "outer-top-right" => (XEdge::Top, YEdge::Right),
            _ => return Err(Error::InvalidStyle(s.to_string())),
        };
        Ok(Self::Outer { x_edge, y_edge })
    }
}

impl fmt::Display for LabelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Outer { x_edge, y_edge } => {
                let x = match x_edge {
                    XEdge::Bottom => "bottom",
                    XEdge::Top => "top",
                };
                let y = match y_edge {
                    YEdge::Left => "left",
                    YEdge::Right => "right",
                };
                write!(f, "outer-{x}-{y}")
            }
        }
    }
}

/// Tick-label rotation in degrees, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RotationSpec {
    lat: f32,
    lon: f32,
}

impl RotationSpec {
    /// No rotation on either axis.
    pub const NONE: Self = Self { lat: 0.0, lon: 0.0 };

    /// Rotation for latitude and longitude tick labels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRotation`] if either angle is not finite.
    pub fn new(lat: f32, lon: f32) -> Result<Self> {
        if !lat.is_finite() {
            return Err(Error::InvalidRotation { axis: "latitude", value: lat });
        }
        if !lon.is_finite() {
            return Err(Error::InvalidRotation { axis: "longitude", value: lon });
        }
        Ok(Self { lat, lon })
    }

    /// Latitude (y) label rotation.
    #[must_use]
    pub const fn lat(&self) -> f32 {
        self.lat
    }

    /// Longitude (x) label rotation.
    #[must_use]
    pub const fn lon(&self) -> f32 {
        self.lon
    }
}

/// Label visibility and rotation for one panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelDecision {
    /// Draw longitude labels.
    pub show_x: bool,
    /// Draw latitude labels.
    pub show_y: bool,
    /// Side the longitude labels are drawn on.
    pub x_edge: XEdge,
    /// Side the latitude labels are drawn on.
    pub y_edge: YEdge,
    /// Rotation for longitude labels, when shown.
    pub x_rotation: Option<f32>,
    /// Rotation for latitude labels, when shown.
    pub y_rotation: Option<f32>,
}

impl Default for LabelDecision {
    /// Both axes labeled, unrotated, on the bottom and left sides.
    fn default() -> Self {
        Self {
            show_x: true,
            show_y: true,
            x_edge: XEdge::Bottom,
            y_edge: YEdge::Left,
            x_rotation: Some(0.0),
            y_rotation: Some(0.0),
        }
    }
}

/// Decide which coordinate labels a panel shows.
///
/// Pure function of the cell position, style and rotation.
#[must_use]
pub fn place_labels(cell: &Cell, style: LabelStyle, rotation: RotationSpec) -> LabelDecision {
    let (show_x, show_y, x_edge, y_edge) = match style {
        LabelStyle::All => (true, true, XEdge::Bottom, YEdge::Left),
        LabelStyle::Outer { x_edge, y_edge } => {
            let show_x = match x_edge {
                XEdge::Bottom => cell.is_bottom_edge(),
                XEdge::Top => cell.is_top_edge(),
            };
            let show_y = match y_edge {
                YEdge::Left => cell.is_left_edge(),
                YEdge::Right => cell.is_right_edge(),
            };
            (show_x, show_y, x_edge, y_edge)
        }
    };

    LabelDecision {
        show_x,
        show_y,
        x_edge,
        y_edge,
        x_rotation: show_x.then_some(rotation.lon()),
        y_rotation: show_y.then_some(rotation.lat()),
    }
}

/// Apply the label policy to every panel of a grid.
pub fn axes_labels(grid: &mut AxesGrid<Axes>, style: LabelStyle, rotation: RotationSpec) {
    for (cell, axes) in grid.iter_mut() {
        axes.set_labels(place_labels(&cell, style, rotation));
    }
}
