//! Command line and config file settings.
//!
//! Precedence is CLI flag (or its environment variable) over the TOML file
//! over built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::map::{Easing, ZoomOptions};

/// World population 1970-2022 feature layer
pub const DEFAULT_SERVICE_URL: &str = "https://services3.arcgis.com/UDCw00RKDRKPqASe/arcgis/rest/services/WorldPopulationFrom_1970_To_2022/FeatureServer/0";

const APP_DIR: &str = "popmap";
const CONFIG_FILENAME: &str = "config.toml";
const STATE_FILENAME: &str = "state.json";
const LOG_FILENAME: &str = "popmap.log";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Feature layer URL (without the trailing /query)
    #[arg(long, env = "POPMAP_SERVICE_URL")]
    pub service_url: Option<String>,

    /// Directory holding Natural Earth coastline GeoJSON files
    #[arg(long, env = "POPMAP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: <config dir>/popmap/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log file; the terminal belongs to the dashboard
    #[arg(long, env = "POPMAP_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Optional keys of the TOML config file
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub service_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    /// Geometry generalization for the map layer, in degrees
    pub max_allowable_offset: Option<f64>,
    /// Length of the zoom-to-country animation
    pub zoom_duration_ms: Option<u64>,
    /// `ease-in-out` or `linear`
    pub zoom_easing: Option<Easing>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub service_url: String,
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub state_file: PathBuf,
    pub request_timeout: Duration,
    pub max_allowable_offset: Option<f64>,
    pub zoom: ZoomOptions,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR);

        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            data_dir: PathBuf::from("data"),
            log_file: cache_dir.join(LOG_FILENAME),
            state_file: config_dir.join(STATE_FILENAME),
            request_timeout: Duration::from_secs(30),
            max_allowable_offset: Some(0.05),
            zoom: ZoomOptions::default(),
            verbose: false,
        }
    }
}

impl Settings {
    /// Default config file location
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILENAME))
    }

    /// Resolve settings from the CLI, reading the config file it names
    /// (or the default one, if present)
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => FileConfig::load(&path)?,
                _ => FileConfig::default(),
            },
        };
        Ok(Self::merge(cli, file))
    }

    /// Layer CLI values over file values over defaults
    pub fn merge(cli: &Cli, file: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            service_url: cli
                .service_url
                .clone()
                .or(file.service_url)
                .unwrap_or(defaults.service_url),
            data_dir: cli
                .data_dir
                .clone()
                .or(file.data_dir)
                .unwrap_or(defaults.data_dir),
            log_file: cli
                .log_file
                .clone()
                .or(file.log_file)
                .unwrap_or(defaults.log_file),
            state_file: file.state_file.unwrap_or(defaults.state_file),
            request_timeout: cli
                .timeout_secs
                .or(file.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_allowable_offset: file.max_allowable_offset.or(defaults.max_allowable_offset),
            zoom: ZoomOptions {
                duration: file
                    .zoom_duration_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.zoom.duration),
                easing: file.zoom_easing.unwrap_or(defaults.zoom.easing),
                ..defaults.zoom
            },
            verbose: cli.verbose,
        }
    }
}
