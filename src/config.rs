//! Run configuration: an optional TOML file layered under command line flags

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use streetpoints_core::{Error, PipelineConfig};

/// Contents of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub services: ServiceConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Reads `path`, or returns the defaults when no file is given.
    ///
    /// # Errors
    ///
    /// I/O failures and malformed TOML
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Endpoints and HTTP settings of the geocoding and network services
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub nominatim_url: String,
    pub overpass_url: String,
    pub user_agent: String,
    /// Per request timeout, also passed to Overpass as its query timeout
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            user_agent: concat!("streetpoints/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Geojson,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// Inferred from the file extension when unset
    pub format: Option<OutputFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("osm_points.csv"),
            format: None,
        }
    }
}

impl OutputConfig {
    pub fn resolved_format(&self) -> OutputFormat {
        if let Some(format) = self.format {
            return format;
        }
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("geojson") || ext.eq_ignore_ascii_case("json") => {
                OutputFormat::Geojson
            }
            _ => OutputFormat::Csv,
        }
    }
}
