//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over a file on disk.  A missing file is
//! not an error: the stock configuration is used.  Anything that is
//! read is validated before it is returned.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::MonitorConfig;

#[derive(Debug, Clone)]
pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "JsonConfigFile: {} not found, using defaults",
                    self.path.display()
                );
                return Ok(MonitorConfig::default());
            }
            Err(e) => {
                warn!("JsonConfigFile: read {} failed: {e}", self.path.display());
                return Err(ConfigError::IoError);
            }
        };

        let cfg: MonitorConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("JsonConfigFile: {} is not valid: {e}", self.path.display());
            ConfigError::Corrupted
        })?;
        cfg.validate()?;
        info!(
            "JsonConfigFile: loaded {} ({} bands)",
            self.path.display(),
            cfg.battery_levels.len()
        );
        Ok(cfg)
    }
}
