//! Configuration management for the harness

use crate::error::{HarnessError, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "harness.toml";

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct HarnessConfig {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub deployment: DeploymentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How to launch the host process.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HostConfig {
    #[serde(default = "default_host_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            command: default_host_command(),
            args: Vec::new(),
            working_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_host_command() -> String {
    "clarity-host".to_string()
}

fn default_filter() -> String {
    "warn".to_string()
}

/// Load `path`, falling back to defaults when the file does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<HarnessConfig> {
    let path = path.as_ref();
    let config: HarnessConfig = match fs::read_to_string(path) {
        Ok(text) => toml::from_str(&text)?,
        Err(e) if e.kind() == ErrorKind::NotFound => HarnessConfig::default(),
        Err(e) => return Err(e.into()),
    };

    // Validate critical values
    if config.host.command.trim().is_empty() {
        return Err(HarnessError::Config(format!(
            "host.command must be set in {}",
            path.display()
        )));
    }

    if matches!(&config.deployment.path, Some(p) if p.trim().is_empty()) {
        return Err(HarnessError::Config(format!(
            "deployment.path must not be empty in {}",
            path.display()
        )));
    }

    Ok(config)
}
