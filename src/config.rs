//! Configuration file support for GeoDesk.
//!
//! Settings are stored as JSON. Every section and field has a default, so a
//! partial file only overrides what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{solver as solver_const, zoom as zoom_const};
use crate::format::SampleBuffer;
use crate::session::GeoreferencingSession;
use crate::transform::AffineSolver;
use crate::viewport::ZoomSettings;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::all()
            .iter()
            .copied()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown log level '{}'", s))
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Affine solver settings
    #[serde(default)]
    pub solver: SolverPreferences,

    /// How numbers are written to output files
    #[serde(default)]
    pub output: OutputPreferences,

    /// Zoom steps and limits
    #[serde(default)]
    pub view: ViewPreferences,
}

fn default_app_name() -> String {
    "GeoDesk".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Solver section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverPreferences {
    /// Control point triangles flatter than this (sine of the smallest angle) are rejected
    #[serde(default = "default_singular_epsilon")]
    pub singular_epsilon: f64,
}

fn default_singular_epsilon() -> f64 {
    solver_const::DEFAULT_SINGULAR_EPSILON
}

impl Default for SolverPreferences {
    fn default() -> Self {
        Self {
            singular_epsilon: default_singular_epsilon(),
        }
    }
}

/// Output section of the config.
///
/// A precision of `None` writes the shortest decimal that reads back exactly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputPreferences {
    /// Fractional digits in world files
    #[serde(default)]
    pub world_file_precision: Option<usize>,

    /// Fractional digits in data files
    #[serde(default)]
    pub sample_precision: Option<usize>,
}

/// View section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewPreferences {
    /// Scale multiplier for one zoom-in step
    #[serde(default = "default_zoom_in_factor")]
    pub zoom_in_factor: f64,

    /// Scale multiplier for one zoom-out step
    #[serde(default = "default_zoom_out_factor")]
    pub zoom_out_factor: f64,

    /// Zooming in stops once the scale factor reaches this
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,

    /// Zooming out stops once the scale factor reaches this
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
}

fn default_zoom_in_factor() -> f64 {
    zoom_const::IN_FACTOR
}

fn default_zoom_out_factor() -> f64 {
    zoom_const::OUT_FACTOR
}

fn default_max_zoom() -> f64 {
    zoom_const::MAX
}

fn default_min_zoom() -> f64 {
    zoom_const::MIN
}

impl Default for ViewPreferences {
    fn default() -> Self {
        Self {
            zoom_in_factor: default_zoom_in_factor(),
            zoom_out_factor: default_zoom_out_factor(),
            max_zoom: default_max_zoom(),
            min_zoom: default_min_zoom(),
        }
    }
}

impl From<&ViewPreferences> for ZoomSettings {
    fn from(view: &ViewPreferences) -> Self {
        Self {
            in_factor: view.zoom_in_factor,
            out_factor: view.zoom_out_factor,
            max: view.max_zoom,
            min: view.min_zoom,
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            solver: SolverPreferences::default(),
            output: OutputPreferences::default(),
            view: ViewPreferences::default(),
        }
    }

    /// Solver configured from the solver section.
    pub fn affine_solver(&self) -> AffineSolver {
        AffineSolver::new().with_epsilon(self.solver.singular_epsilon)
    }

    /// Empty session using the configured solver and sample precision.
    pub fn new_session(&self) -> GeoreferencingSession {
        GeoreferencingSession::new()
            .with_solver(self.affine_solver())
            .with_samples(SampleBuffer::new().with_precision(self.output.sample_precision))
    }

    /// Zoom settings for a [`ViewState`](crate::viewport::ViewState).
    pub fn zoom_settings(&self) -> ZoomSettings {
        ZoomSettings::from(&self.view)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Load configuration from an explicit path.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "geodesk-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("geodesk").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("geodesk")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(path)
    }

    /// Save configuration to `path`, creating parent directories if needed.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
