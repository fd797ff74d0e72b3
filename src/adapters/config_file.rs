//! TOML session file adapter.
//!
//! Missing file fields fall back to the rig defaults in
//! [`SessionConfig::default`]; the loaded config is validated before it is
//! handed out.

use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::ConfigPort;
use crate::config::SessionConfig;
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone)]
pub struct TomlConfigFile {
    path: PathBuf,
}

impl TomlConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for TomlConfigFile {
    fn load(&self) -> Result<SessionConfig> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            ConfigError::Unreadable(format!("{}: {e}", self.path.display()))
        })?;
        let config = SessionConfig::from_toml(&text)?;
        config.validate()?;
        info!("loaded session config from {}", self.path.display());
        Ok(config)
    }
}
