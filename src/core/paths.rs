//! Path management for cloudls
//!
//! - Root directory: ~/.cloudls/
//! - Config file: ~/.cloudls/config.toml (or the file given by `--config` /
//!   `CLOUDLS_CONFIG`)

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// cloudls paths manager
#[derive(Debug, Clone)]
pub struct CloudlsPaths {
    /// Config file location
    config_file: PathBuf,
}

impl CloudlsPaths {
    /// Create paths rooted in the user's home directory
    #[allow(dead_code)]
    pub fn new() -> Result<Self> {
        Self::new_with_custom_config(None)
    }

    /// Create paths, optionally pointing at a custom config file
    pub fn new_with_custom_config(custom_config: Option<PathBuf>) -> Result<Self> {
        let config_file = match custom_config {
            Some(path) => path,
            None => Self::user_root_path()?.join("config.toml"),
        };

        Ok(Self { config_file })
    }

    /// Get the user-level root path (~/.cloudls/)
    fn user_root_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(".cloudls"))
    }

    /// Path to config.toml
    pub fn config_toml(&self) -> &Path {
        &self.config_file
    }
}
