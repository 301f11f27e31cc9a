//! Configuration Loader
//!
//! Layered loading of [`FlowConfig`](super::FlowConfig). Precedence (highest to lowest):
//! 1. Environment variables prefixed `PROJECTFLOW_`, `__` separating nested keys
//!    (e.g. `PROJECTFLOW_API__BASE_URL`, `PROJECTFLOW_UI__VISIBILITY_TIMEOUT_MS`)
//! 2. TOML config file (explicit path, or `./projectflow.toml`, `./config/projectflow.toml`)
//! 3. Compiled defaults

use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::FlowConfig;
use crate::constants;
use crate::error::{FlowError, FlowResult};

const SEARCH_PATHS: [&str; 2] = ["./projectflow.toml", "./config/projectflow.toml"];

/// Builder-style loader for [`FlowConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_source: Option<HashMap<String, String>>,
    skip_file_search: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this file instead of searching the default locations; it must exist
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Use `vars` in place of the process environment
    ///
    /// Keys are full variable names, e.g. `PROJECTFLOW_UI__BASE_URL`.
    pub fn with_env_source(mut self, vars: HashMap<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    /// Do not look for a config file in the default locations
    pub fn without_file_search(mut self) -> Self {
        self.skip_file_search = true;
        self
    }

    /// Merge all layers, deserialize and validate
    pub fn load(self) -> FlowResult<FlowConfig> {
        let mut builder = Config::builder().add_source(Config::try_from(&FlowConfig::default())?);

        match self.file {
            Some(ref path) => {
                if !path.is_file() {
                    return Err(FlowError::config_error(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                debug!("Loading flow config from: {}", path.display());
                builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
            }
            None if !self.skip_file_search => {
                if let Some(path) = Self::find_config_file() {
                    debug!("Loading flow config from: {}", path.display());
                    builder = builder.add_source(File::from(path).format(FileFormat::Toml));
                }
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix(constants::env::CONFIG_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(self.env_source),
        );

        let config: FlowConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(config = %config.sanitized(), "Loaded flow configuration");
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        SEARCH_PATHS
            .iter()
            .map(Path::new)
            .find(|path| path.is_file())
            .map(Path::to_path_buf)
    }
}
