//! Curbside configuration.
//!
//! Loaded from `~/.curbside/config.toml` (or `$CURBSIDE_HOME/config.toml`).
//! A missing file means defaults.

use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

use crate::model::Coordinate;
use crate::source::{DEFAULT_LIMIT, DEFAULT_RADIUS_METERS};

/// Environment variable overriding the data and config root.
pub const HOME_ENV: &str = "CURBSIDE_HOME";

/// Curbside configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Where `near` goes in `browse` when no coordinate is given.
    pub default_center: [f64; 2],

    /// Radius for nearby queries, in meters.
    pub search_radius: f64,

    /// Result cap for queries.
    pub limit: usize,

    /// Fixed `"LAT,LNG"` used when nothing better is available.
    pub location: Option<String>,

    /// Shell command printing `LAT,LNG` on stdout.
    pub locate_command: Option<String>,

    pub locate_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_center: [40.7128, -74.0060],
            search_radius: DEFAULT_RADIUS_METERS,
            limit: DEFAULT_LIMIT,
            location: None,
            locate_command: None,
            locate_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load config from the curbside home directory.
    ///
    /// Returns defaults when the file does not exist, and an error naming the
    /// path when it cannot be read or parsed.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        Self::from_toml_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// The config file path: `<home>/config.toml`.
    pub fn path() -> Option<PathBuf> {
        home_dir().map(|h| h.join("config.toml"))
    }

    pub fn default_center(&self) -> Coordinate {
        Coordinate::new(self.default_center[0], self.default_center[1])
    }

    fn validate(&self) -> Result<(), String> {
        if !self.default_center().is_valid() {
            return Err(format!(
                "default-center {} is out of range",
                self.default_center()
            ));
        }
        if !self.search_radius.is_finite() || self.search_radius <= 0.0 {
            return Err("search-radius must be a positive number of meters".to_string());
        }
        if self.limit == 0 {
            return Err("limit must be at least 1".to_string());
        }
        if let Some(location) = &self.location {
            location
                .parse::<Coordinate>()
                .map_err(|e| format!("location: {e}"))?;
        }
        Ok(())
    }
}

/// The curbside home directory: `$CURBSIDE_HOME` or `~/.curbside/`.
pub fn home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var(HOME_ENV)
        && !home.is_empty()
    {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|h| h.join(".curbside"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn reads_kebab_case_keys() {
        let config = Config::from_toml_str(
            r#"
            default-center = [51.5074, -0.1278]
            search-radius = 1200.0
            limit = 10
            location = "51.5,-0.12"
            locate-command = "whereami --csv"
            locate-timeout-secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.default_center(), Coordinate::new(51.5074, -0.1278));
        assert!((config.search_radius - 1200.0).abs() < f64::EPSILON);
        assert_eq!(config.limit, 10);
        assert_eq!(config.location.as_deref(), Some("51.5,-0.12"));
        assert_eq!(config.locate_command.as_deref(), Some("whereami --csv"));
        assert_eq!(config.locate_timeout_secs, 3);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml_str("limit = 5").unwrap();
        assert_eq!(config.limit, 5);
        assert_eq!(config.locate_timeout_secs, 10);
        assert_eq!(config.default_center(), Coordinate::new(40.7128, -74.0060));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = Config::from_toml_str("radius = 5").unwrap_err();
        assert!(err.contains("radius"), "{err}");
    }

    #[test]
    fn bad_values_are_rejected() {
        for contents in [
            "default-center = [91.0, 0.0]",
            "search-radius = -1.0",
            "limit = 0",
            "location = \"north pole\"",
        ] {
            assert!(Config::from_toml_str(contents).is_err(), "{contents}");
        }
    }
}
