//! Coordinate: a point on the map in degrees.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude, `-90..=90`.
    pub lat: f64,

    /// Longitude, `-180..=180`.
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and within their valid ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Parses `"LAT,LNG"`, the form used on the command line, in config,
/// and on the stdout of a locate command.
impl FromStr for Coordinate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .trim()
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG but got '{}'", s.trim()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|e| format!("invalid latitude '{}': {e}", lat.trim()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|e| format!("invalid longitude '{}': {e}", lng.trim()))?;

        let coordinate = Self { lat, lng };
        if !coordinate.is_valid() {
            return Err(format!("coordinate out of range: {coordinate}"));
        }
        Ok(coordinate)
    }
}
