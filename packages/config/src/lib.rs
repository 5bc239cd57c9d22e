#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Application configuration.
//!
//! The defaults in `config/default.toml` are baked into the binary with
//! [`include_str!`]. A user-supplied file replaces them entirely. Either
//! way the document is validated on load and turned into [`Settings`],
//! whose fields are ready to hand to the pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use covid_map_projection::{CanvasSize, GeoBounds, GeoProjector, ProjectionError};
use covid_map_render::MarkerStyle;
use covid_map_selector::{DateRules, FeedUrls};
use image::Rgba;
use serde::{Deserialize, Serialize};

/// Embedded default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown timezone '{0}'")]
    InvalidTimezone(String),

    #[error("Invalid marker color '{0}', expected #RRGGBB")]
    InvalidColor(String),

    #[error("Publication hour {0} is not between 0 and 23")]
    InvalidPublicationHour(u32),

    #[error("Marker scale factor {0} must be a finite number greater than 0")]
    InvalidScaleFactor(f64),

    #[error("HTTP timeout must be at least one second")]
    ZeroTimeout,

    #[error("Invalid map bounds: {0}")]
    Projection(#[from] ProjectionError),
}

/// Base map location and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub image_url: String,
    pub width: u32,
    pub height: u32,
    pub bounds: GeoBounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub scale_factor: f64,
    /// `#RRGGBB`.
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatesConfig {
    pub earliest: NaiveDate,
    /// IANA zone name.
    pub timezone: String,
    pub publication_hour: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where the rendered PNG is written.
    pub path: PathBuf,
}

/// The raw configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub feeds: FeedUrls,
    pub map: MapConfig,
    pub markers: MarkerConfig,
    pub dates: DatesConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub feeds: FeedUrls,
    pub map_url: String,
    pub projector: GeoProjector,
    pub marker_style: MarkerStyle,
    pub date_rules: DateRules,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub output_path: PathBuf,
}

impl AppConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed or a field
    /// is missing.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path` if given, otherwise the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid document.
    pub fn read(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            log::debug!("Using embedded default configuration");
            return Self::from_toml_str(DEFAULT_CONFIG);
        };

        log::info!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reads and validates configuration in one step.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::read`] and [`AppConfig::validate`].
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        Self::read(path)?.validate()
    }

    /// Checks every field that can be wrong without touching the network.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found, checking bounds and canvas
    /// size first and the HTTP timeout last.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let projector = GeoProjector::new(
            self.map.bounds,
            CanvasSize {
                width: self.map.width,
                height: self.map.height,
            },
        )?;

        let timezone: Tz = self
            .dates
            .timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(self.dates.timezone.clone()))?;

        if self.dates.publication_hour > 23 {
            return Err(ConfigError::InvalidPublicationHour(
                self.dates.publication_hour,
            ));
        }

        let scale_factor = self.markers.scale_factor;
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return Err(ConfigError::InvalidScaleFactor(scale_factor));
        }

        let color = parse_hex_color(&self.markers.color)
            .ok_or_else(|| ConfigError::InvalidColor(self.markers.color.clone()))?;

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Settings {
            feeds: self.feeds.clone(),
            map_url: self.map.image_url.clone(),
            projector,
            marker_style: MarkerStyle {
                scale_factor,
                color,
            },
            date_rules: DateRules {
                earliest: self.dates.earliest,
                timezone,
                publication_hour: self.dates.publication_hour,
            },
            http_timeout: Duration::from_secs(self.http.timeout_secs),
            user_agent: self.http.user_agent.clone(),
            output_path: self.output.path.clone(),
        })
    }
}

/// Parses `#RRGGBB` (the `#` is optional) into an opaque color.
#[must_use]
pub fn parse_hex_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

#[cfg(test)]
mod tests {
    use covid_map_render::marker::DEFAULT_COLOR;

    use super::*;

    fn defaults() -> AppConfig {
        AppConfig::from_toml_str(DEFAULT_CONFIG).unwrap()
    }

    #[test]
    fn embedded_defaults_validate() {
        let settings = defaults().validate().unwrap();

        assert_eq!(
            settings.projector.canvas(),
            CanvasSize {
                width: 930,
                height: 1096
            }
        );
        assert_eq!(settings.marker_style.color, DEFAULT_COLOR);
        assert!((settings.marker_style.scale_factor - 100.0).abs() < f64::EPSILON);
        assert_eq!(settings.date_rules.timezone, chrono_tz::Europe::Rome);
        assert_eq!(settings.date_rules.publication_hour, 17);
        assert_eq!(
            settings.date_rules.earliest,
            NaiveDate::from_ymd_opt(2020, 2, 24).unwrap()
        );
        assert_eq!(settings.http_timeout, Duration::from_secs(60));
        assert_eq!(settings.output_path, PathBuf::from("covid_map.png"));
        assert!(settings.feeds.region_daily_prefix.ends_with("regioni-"));
    }

    #[test]
    fn read_without_path_uses_defaults() {
        assert_eq!(AppConfig::read(None).unwrap(), defaults());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::read(Some(Path::new("/nonexistent/covid_map.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn truncated_document_is_parse_error() {
        let err = AppConfig::from_toml_str("[feeds]\nprovince_latest = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let mut config = defaults();
        config.map.bounds.min_lat = 50.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Projection(ProjectionError::DegenerateSpan { .. }))
        ));
    }

    #[test]
    fn rejects_zero_sized_canvas() {
        let mut config = defaults();
        config.map.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Projection(ProjectionError::EmptyCanvas { .. }))
        ));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let mut config = defaults();
        config.dates.timezone = "Europe/Atlantis".to_owned();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimezone(name)) if name == "Europe/Atlantis"
        ));
    }

    #[test]
    fn rejects_out_of_range_publication_hour() {
        let mut config = defaults();
        config.dates.publication_hour = 24;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPublicationHour(24))
        ));
    }

    #[test]
    fn rejects_bad_color() {
        let mut config = defaults();
        config.markers.color = "blue".to_owned();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidColor(_))));
    }

    #[test]
    fn rejects_bad_scale_factor() {
        for value in [0.0, -100.0, f64::NAN, f64::INFINITY] {
            let mut config = defaults();
            config.markers.scale_factor = value;
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidScaleFactor(_))),
                "scale factor {value} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_infinite_scale_factor_in_document() {
        let text = DEFAULT_CONFIG.replace("scale_factor = 100.0", "scale_factor = inf");
        let config = AppConfig::from_toml_str(&text).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidScaleFactor(v)) if v.is_infinite()
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = defaults();
        config.http.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#007BFF"), Some(DEFAULT_COLOR));
        assert_eq!(parse_hex_color("ff0000"), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }
}
