//! `schedc.toml` loading and flag overrides.

use std::path::{Path, PathBuf};

use schedc_report::{UnmappedPolicy, DEFAULT_MAPPING_FILE};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const CONFIG_FILE: &str = "schedc.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Contents of `schedc.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub tax_mapping: Option<PathBuf>,
    pub rules_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub unmapped_categories: Option<UnmappedPolicy>,
}

impl AppConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a config file; relative paths inside it are anchored to the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content, path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        debug!("Loaded config from {}", path.display());
        Ok(config.anchored_at(base))
    }

    /// `--config` when given, else `./schedc.toml` when present, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(CONFIG_FILE);
                if local.is_file() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn anchored_at(self, base: &Path) -> Self {
        let anchor = |p: Option<PathBuf>| {
            p.map(|p| if p.is_relative() { base.join(p) } else { p })
        };
        AppConfig {
            tax_mapping: anchor(self.tax_mapping),
            rules_file: anchor(self.rules_file),
            output_dir: anchor(self.output_dir),
            unmapped_categories: self.unmapped_categories,
        }
    }
}

/// Values given on the command line; each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tax_mapping: Option<PathBuf>,
    pub rules_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub unmapped: Option<UnmappedPolicy>,
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tax_mapping: PathBuf,
    pub rules_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub unmapped: UnmappedPolicy,
}

impl Settings {
    pub fn resolve(config: AppConfig, overrides: Overrides) -> Self {
        Settings {
            tax_mapping: overrides
                .tax_mapping
                .or(config.tax_mapping)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MAPPING_FILE)),
            rules_file: overrides.rules_file.or(config.rules_file),
            output_dir: overrides
                .output_dir
                .or(config.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            unmapped: overrides
                .unmapped
                .or(config.unmapped_categories)
                .unwrap_or_default(),
        }
    }
}
