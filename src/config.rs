//! Configuration management for embargo.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pipeline::PipelineOptions;

/// Countries selected when neither the config file nor the command line names any
pub const DEFAULT_COUNTRY_CODES: &[&str] = &["CU", "IR", "KP", "SD", "SY"];

/// GeoLite2 Country CSV archive
pub const DEFAULT_URL: &str = "http://bit.ly/20wcmhv";

pub const DEFAULT_EXTRACT_DIR: &str = "/tmp/embargo_cache";

pub const DEFAULT_OUTPUT_FILE: &str = "blocked_ipv4.txt";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Source archive URL
    pub url: String,

    /// Directory the archive is extracted into
    pub extract_dir: PathBuf,

    /// Destination of the CIDR list
    pub output_file: PathBuf,

    /// ISO 3166-1 alpha-2 country codes to block
    pub country_codes: Vec<String>,

    /// Emit largest blocks first
    pub cidr_sorting: bool,

    /// Merge contiguous networks
    pub aggregate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            extract_dir: PathBuf::from(DEFAULT_EXTRACT_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            country_codes: DEFAULT_COUNTRY_CODES.iter().map(|c| c.to_string()).collect(),
            cidr_sorting: false,
            aggregate: false,
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.country_codes.is_empty() {
            anyhow::bail!("At least one country code is required");
        }

        for code in &self.country_codes {
            if !is_valid_country_code(code) {
                anyhow::bail!(
                    "Invalid country code '{}'. Use two uppercase letters, e.g. 'CU'",
                    code
                );
            }
        }

        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            anyhow::bail!("Dataset URL must be http(s): {}", self.url);
        }

        Ok(())
    }

    /// Pipeline options for the configured selection
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions::new(self.country_codes.iter().cloned())
            .group_by_prefix(self.cidr_sorting)
            .aggregate(self.aggregate)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

/// Two ASCII uppercase letters
pub fn is_valid_country_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase())
}
