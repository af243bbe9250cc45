//! Scale functions for data-to-visual mappings.
//!
//! Scales transform data values to visual properties: longitude/latitude to
//! pixel position, and field values to colors.

use std::str::FromStr;

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain_min: f32,
    domain_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if domain_min equals domain_max.
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Result<Self> {
        if (domain.0 - domain.1).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }

    /// Invert the scale (range to domain).
    #[must_use]
    pub fn invert(&self, value: f32) -> f32 {
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }
}

impl Scale<f32, f32> for LinearScale {
    fn scale(&self, value: f32) -> f32 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

/// Logarithmic scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy)]
pub struct LogScale {
    domain_min: f32,
    domain_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LogScale {
    /// Create a new base-10 logarithmic scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain contains non-positive values or is empty.
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Result<Self> {
        if domain.0 <= 0.0 || domain.1 <= 0.0 {
            return Err(Error::ScaleDomain("Log scale domain must be positive".to_string()));
        }
        if (domain.0 - domain.1).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }
}

impl Scale<f32, f32> for LogScale {
    fn scale(&self, value: f32) -> f32 {
        let log_min = self.domain_min.log10();
        let log_max = self.domain_max.log10();
        let log_val = value.max(f32::MIN_POSITIVE).log10();

        let t = (log_val - log_min) / (log_max - log_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

/// Color scale for mapping values to colors by interpolating color stops.
#[derive(Debug, Clone)]
pub struct ColorScale {
    colors: Vec<Rgba>,
    domain_min: f32,
    domain_max: f32,
}

impl ColorScale {
    /// Create a new color scale.
    ///
    /// # Errors
    ///
    /// Returns an error if colors is empty or domain is invalid.
    pub fn new(colors: Vec<Rgba>, domain: (f32, f32)) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::ScaleDomain("Color scale requires at least one color".to_string()));
        }

        if (domain.0 - domain.1).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self { colors, domain_min: domain.0, domain_max: domain.1 })
    }
}

impl Scale<f32, Rgba> for ColorScale {
    fn scale(&self, value: f32) -> Rgba {
        let t = ((value - self.domain_min) / (self.domain_max - self.domain_min)).clamp(0.0, 1.0);

        if self.colors.len() == 1 {
            return self.colors[0];
        }

        let segment_count = self.colors.len() - 1;
        let segment = (t * segment_count as f32).floor() as usize;
        let segment = segment.min(segment_count - 1);

        let local_t = t * segment_count as f32 - segment as f32;

        self.colors[segment].lerp(self.colors[segment + 1], local_t)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (Rgba, Rgba) {
        (*self.colors.first().unwrap_or(&Rgba::BLACK), *self.colors.last().unwrap_or(&Rgba::WHITE))
    }
}

/// Named colormaps for filled fields and scatter layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Colormap {
    /// Purple-blue-green-yellow-red rainbow.
    #[default]
    Rainbow,
    /// Viridis (perceptually uniform, colorblind-safe).
    Viridis,
    /// Sequential blues.
    Blues,
    /// Diverging red-blue.
    RedBlue,
    /// Magma (perceptually uniform).
    Magma,
    /// Heat (black-red-yellow-white).
    Heat,
    /// Greyscale.
    Greyscale,
}

impl Colormap {
    /// Color stops from the low end to the high end.
    #[must_use]
    pub fn stops(self) -> Vec<Rgba> {
        match self {
            Self::Rainbow => vec![
                Rgba::rgb(128, 0, 255),
                Rgba::rgb(40, 120, 245),
                Rgba::rgb(0, 210, 210),
                Rgba::rgb(130, 255, 125),
                Rgba::rgb(255, 200, 70),
                Rgba::rgb(255, 0, 0),
            ],
            Self::Viridis => vec![
                Rgba::rgb(68, 1, 84),
                Rgba::rgb(59, 82, 139),
                Rgba::rgb(33, 145, 140),
                Rgba::rgb(94, 201, 98),
                Rgba::rgb(253, 231, 37),
            ],
            Self::Blues => vec![
                Rgba::rgb(247, 251, 255),
                Rgba::rgb(198, 219, 239),
                Rgba::rgb(107, 174, 214),
                Rgba::rgb(33, 113, 181),
                Rgba::rgb(8, 48, 107),
            ],
            Self::RedBlue => vec![
                Rgba::rgb(178, 24, 43),
                Rgba::rgb(239, 138, 98),
                Rgba::rgb(247, 247, 247),
                Rgba::rgb(103, 169, 207),
                Rgba::rgb(33, 102, 172),
            ],
            Self::Magma => vec![
                Rgba::rgb(0, 0, 4),
                Rgba::rgb(81, 18, 124),
                Rgba::rgb(183, 55, 121),
                Rgba::rgb(252, 137, 97),
                Rgba::rgb(252, 253, 191),
            ],
            Self::Heat => vec![
                Rgba::rgb(0, 0, 0),
                Rgba::rgb(128, 0, 0),
                Rgba::rgb(255, 0, 0),
                Rgba::rgb(255, 128, 0),
                Rgba::rgb(255, 255, 0),
                Rgba::rgb(255, 255, 255),
            ],
            Self::Greyscale => vec![Rgba::BLACK, Rgba::WHITE],
        }
    }

    /// A color scale over the unit interval `[0, 1]`.
    #[must_use]
    pub fn unit_scale(self) -> ColorScale {
        ColorScale { colors: self.stops(), domain_min: 0.0, domain_max: 1.0 }
    }

    /// Color at position `t` in `[0, 1]` (clamped).
    #[must_use]
    pub fn at(self, t: f32) -> Rgba {
        self.unit_scale().scale(t)
    }
}

impl FromStr for Colormap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rainbow" => Ok(Self::Rainbow),
            "viridis" => Ok(Self::Viridis),
            "blues" => Ok(Self::Blues),
            "rdbu" | "redblue" | "red-blue" => Ok(Self::RedBlue),
            "magma" => Ok(Self::Magma),
            "heat" | "hot" => Ok(Self::Heat),
            "greys" | "gray" | "grey" | "greyscale" | "grayscale" => Ok(Self::Greyscale),
            _ => Err(Error::InvalidColor(format!("unknown colormap {s:?}"))),
        }
    }
}

/// How level boundaries are placed along a colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Norm {
    /// Linear placement between the first and last level.
    #[default]
    Linear,
    /// Base-10 logarithmic placement; levels must be positive.
    Log,
}

impl Norm {
    /// Build the value-to-unit scale for a `(min, max)` domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty, or non-positive for [`Norm::Log`].
    pub fn unit(self, domain: (f32, f32)) -> Result<UnitNorm> {
        match self {
            Self::Linear => LinearScale::new(domain, (0.0, 1.0)).map(UnitNorm::Linear),
            Self::Log => LogScale::new(domain, (0.0, 1.0)).map(UnitNorm::Log),
        }
    }
}

/// A resolved [`Norm`] mapping values onto `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub enum UnitNorm {
    /// Linear mapping.
    Linear(LinearScale),
    /// Logarithmic mapping.
    Log(LogScale),
}

impl UnitNorm {
    /// Map a value to its (unclamped) position on the unit interval.
    #[must_use]
    pub fn apply(&self, value: f32) -> f32 {
        match self {
            Self::Linear(s) => s.scale(value),
            Self::Log(s) => s.scale(value),
        }
    }
}
