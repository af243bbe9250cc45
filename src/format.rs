//! Number and coordinate formatting for tick and contour labels.
//!
//! Longitudes print with a `W`/`E` hemisphere suffix and latitudes with
//! `S`/`N`, always as absolute values, so `-105` reads `105°W`. The prime
//! meridian, the antimeridian and the equator print without a suffix.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// How numeric labels (colorbar ticks, contour labels) are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    /// Shortest form that round-trips the value (`0.5`, `2`, `0.25`).
    #[default]
    Default,
    /// Fixed number of decimals.
    Decimals(u8),
    /// Truncate toward zero and print as an integer.
    Integer,
}

impl Precision {
    /// Format a value.
    #[must_use]
    pub fn format(self, value: f32) -> String {
        match self {
            Self::Default => format_value(value),
            Self::Decimals(n) => {
                let s = format!("{value:.prec$}", prec = usize::from(n));
                negative_zero_fix(s)
            }
            Self::Integer => format!("{}", value.trunc() as i64),
        }
    }
}

impl FromStr for Precision {
    type Err = Error;

    /// Accepts `""`, `"int"`, `"precision, N"` and `"N"`.
    fn from_str(s: &str) -> Result<Self> {
        let spec = s.trim().to_ascii_lowercase();
        if spec.is_empty() || spec == "default" {
            return Ok(Self::Default);
        }
        if spec == "int" || spec == "integer" {
            return Ok(Self::Integer);
        }

        let digits = spec.strip_prefix("precision").map_or(spec.as_str(), |rest| {
            rest.trim_start().trim_start_matches(',').trim()
        });
        digits
            .parse::<u8>()
            .ok()
            .filter(|&n| n <= 12)
            .map(Self::Decimals)
            .ok_or_else(|| Error::InvalidPrecision(s.to_string()))
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str(""),
            Self::Decimals(n) => write!(f, "precision, {n}"),
            Self::Integer => f.write_str("int"),
        }
    }
}

/// Shortest decimal form of a value, without a trailing `.0`.
#[must_use]
pub fn format_value(value: f32) -> String {
    negative_zero_fix(format!("{value}"))
}

fn negative_zero_fix(s: String) -> String {
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

/// Longitude tick label, e.g. `105°W`, `12.5°E`, `0°`, `180°`.
///
/// Only `+180` is bare; `-180` keeps its hemisphere as `180°W`.
#[must_use]
pub fn format_lon(lon: f32) -> String {
    let abs = format_value(lon.abs());
    if lon == 0.0 || lon == 180.0 {
        format!("{abs}°")
    } else if lon < 0.0 {
        format!("{abs}°W")
    } else {
        format!("{abs}°E")
    }
}

/// Latitude tick label, e.g. `40°N`, `33.5°S`, `0°`.
#[must_use]
pub fn format_lat(lat: f32) -> String {
    let abs = format_value(lat.abs());
    if lat == 0.0 {
        format!("{abs}°")
    } else if lat < 0.0 {
        format!("{abs}°S")
    } else {
        format!("{abs}°N")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_lon() {
        assert_eq!(format_lon(-105.0), "105°W");
        assert_eq!(format_lon(12.5), "12.5°E");
        assert_eq!(format_lon(0.0), "0°");
        assert_eq!(format_lon(-0.0), "0°");
        assert_eq!(format_lon(180.0), "180°");
        assert_eq!(format_lon(-180.0), "180°W");
        assert_eq!(format_lon(-179.5), "179.5°W");
    }

    #[test]
    fn test_format_lat() {
        assert_eq!(format_lat(40.0), "40°N");
        assert_eq!(format_lat(-33.5), "33.5°S");
        assert_eq!(format_lat(0.0), "0°");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(2.0), "2");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!(format_value(-0.0), "0");
    }

    #[test]
    fn test_precision_format() {
        assert_eq!(Precision::Default.format(0.5), "0.5");
        assert_eq!(Precision::Decimals(2).format(0.5), "0.50");
        assert_eq!(Precision::Decimals(0).format(2.6), "3");
        assert_eq!(Precision::Integer.format(2.6), "2");
        assert_eq!(Precision::Integer.format(-2.6), "-2");
        assert_eq!(Precision::Decimals(1).format(-0.01), "0.0");
    }

    #[test]
    fn test_precision_parse() {
        assert_eq!("".parse::<Precision>().unwrap(), Precision::Default);
        assert_eq!("int".parse::<Precision>().unwrap(), Precision::Integer);
        assert_eq!("precision, 2".parse::<Precision>().unwrap(), Precision::Decimals(2));
        assert_eq!("precision,3".parse::<Precision>().unwrap(), Precision::Decimals(3));
        assert_eq!("1".parse::<Precision>().unwrap(), Precision::Decimals(1));
        assert!("precision, x".parse::<Precision>().is_err());
        assert!("scientific".parse::<Precision>().is_err());
    }

    #[test]
    fn test_precision_display_round_trips() {
        for p in [Precision::Default, Precision::Integer, Precision::Decimals(4)] {
            assert_eq!(p.to_string().parse::<Precision>().unwrap(), p);
        }
    }
}
