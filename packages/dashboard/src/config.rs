//! Dashboard configuration.
//!
//! Settings come from an optional TOML file, then `BIND_ADDR` / `PORT`
//! environment variables, then command-line flags, each layer overriding
//! the one before.

use std::path::{Path, PathBuf};

use crash_impact_statistics::output::DEFAULT_OUTPUT_PATH;
use serde::Deserialize;

use crate::DashboardError;

/// Where the statistics table is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    /// A CSV file on disk, typically the statistics pipeline's output.
    File {
        /// Path to the CSV file.
        path: PathBuf,
    },
    /// A published CSV fetched over HTTP.
    Remote {
        /// URL of the CSV.
        url: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::File {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

/// Map display settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Initial map center latitude.
    pub center_lat: f64,
    /// Initial map center longitude.
    pub center_lon: f64,
    /// Initial zoom level.
    pub zoom: u8,
    /// Douglas-Peucker tolerance in degrees applied before serialization.
    pub simplify_tolerance: f64,
    /// Maximum number of features returned by the map endpoint.
    pub max_features: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 30.2672,
            center_lon: -97.7431,
            zoom: 10,
            simplify_tolerance: 0.0001,
            max_features: 500,
        }
    }
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Address to bind the HTTP server to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Page title.
    pub title: String,
    /// Statistics source.
    pub source: SourceConfig,
    /// Map settings.
    pub map: MapConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8050,
            title: "Component Analysis (Pre/Post)".to_string(),
            source: SourceConfig::default(),
            map: MapConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Parses a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] if the TOML is invalid.
    pub fn from_toml_str(text: &str) -> Result<Self, DashboardError> {
        toml::from_str(text).map_err(|e| DashboardError::Config(e.to_string()))
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Applies `BIND_ADDR` and `PORT` from the environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_overrides(
            std::env::var("BIND_ADDR").ok(),
            std::env::var("PORT").ok().and_then(|p| p.parse().ok()),
        )
    }

    /// Replaces the bind address and port where an override is given.
    #[must_use]
    pub fn with_overrides(mut self, bind: Option<String>, port: Option<u16>) -> Self {
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.port, 8050);
        assert_eq!(config.map.max_features, 500);
        assert_eq!(
            config.source,
            SourceConfig::File {
                path: PathBuf::from("output/annualized_statistics.csv")
            }
        );
    }

    #[test]
    fn remote_source_and_partial_map_section() {
        let config = DashboardConfig::from_toml_str(
            r#"
            port = 8010
            title = "Map Visualization"

            [source]
            type = "remote"
            url = "https://data.example.org/statistics.csv"

            [map]
            simplify_tolerance = 0.01
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 8010);
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.title, "Map Visualization");
        assert_eq!(
            config.source,
            SourceConfig::Remote {
                url: "https://data.example.org/statistics.csv".to_string()
            }
        );
        assert!((config.map.simplify_tolerance - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.map.zoom, 10);
    }

    #[test]
    fn unknown_source_type_is_rejected() {
        let err = DashboardConfig::from_toml_str("[source]\ntype = \"ftp\"\n").unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let config = DashboardConfig::default().with_overrides(None, Some(9000));
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.port, 9000);

        let config = config.with_overrides(Some("0.0.0.0".to_string()), None);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }
}
