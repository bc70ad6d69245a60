//! User preferences management
//!
//! This module handles the persistent profiles stored in config.toml

use super::deprecation::{self, Diagnostics};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One named set of connection settings
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Profile {
    /// Base URL of the service (e.g., "https://storage.example.com/v1")
    pub endpoint: Option<String>,

    /// Region sent with every request
    pub region: Option<String>,

    /// Bearer token used to authenticate
    pub token: Option<String>,

    /// Default page size hint for list commands
    pub page_size: Option<u32>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Preferences stored in config.toml
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Preferences {
    /// Profile used when `--profile` is not given
    pub default_profile: Option<String>,

    /// Named profiles
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Preferences {
    /// Load preferences from config.toml
    ///
    /// Returns default preferences if the file doesn't exist. Deprecated
    /// profile keys are renamed and reported through `diagnostics`.
    pub fn load(config_path: &Path, diagnostics: &mut Diagnostics) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::parse(&content, diagnostics)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    /// Parse config.toml content
    pub fn parse(content: &str, diagnostics: &mut Diagnostics) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(content)?;

        if let Some(toml::Value::Table(profiles)) = table.get_mut("profiles") {
            for (name, profile) in profiles.iter_mut() {
                if let toml::Value::Table(profile) = profile {
                    deprecation::migrate_keys(
                        profile,
                        &format!("profile '{}'", name),
                        diagnostics,
                    );
                }
            }
        }

        let prefs: Preferences = toml::Value::Table(table).try_into()?;
        Ok(prefs)
    }

    /// Generate a default config.toml with helpful comments
    pub fn generate_default_file(config_path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let template = r#"# cloudls Configuration File
# Edit with: cloudls config edit
#
# Each [profiles.<name>] table holds one set of connection settings.
# Select a profile with --profile <name> or CLOUDLS_PROFILE.
# Command-line flags and CLOUDLS_* environment variables override these values.

# Profile used when none is selected
default_profile = "default"

[profiles.default]
# Base URL of the storage / fleet service
endpoint = "https://storage.example.com/v1"

# Region sent with every request (optional)
# region = "eu-west-1"

# Bearer token (optional, prefer CLOUDLS_TOKEN)
# token = ""

# Default number of items requested per page (optional).
# The service may return fewer; each operation has its own maximum.
# page_size = 100

# Per-request timeout in seconds (default: 30)
# timeout_secs = 30
"#;

        fs::write(config_path, template)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))
    }

    /// Validate preferences
    ///
    /// Checks that:
    /// - the default profile, if set, exists
    /// - every endpoint is an http(s) URL
    /// - page sizes and timeouts are positive
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.default_profile {
            if !self.profiles.contains_key(name) {
                anyhow::bail!("Default profile '{}' is not defined", name);
            }
        }

        for (name, profile) in &self.profiles {
            if let Some(ref endpoint) = profile.endpoint {
                validate_endpoint(endpoint)
                    .with_context(|| format!("Invalid endpoint in profile '{}'", name))?;
            }
            if profile.page_size == Some(0) {
                anyhow::bail!("Profile '{}': page_size must be positive", name);
            }
            if profile.timeout_secs == Some(0) {
                anyhow::bail!("Profile '{}': timeout_secs must be positive", name);
            }
        }

        Ok(())
    }
}

/// Check that an endpoint is an absolute http(s) URL
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = reqwest::Url::parse(endpoint)
        .with_context(|| format!("'{}' is not a valid URL", endpoint))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => anyhow::bail!("Unsupported URL scheme '{}' in '{}'", other, endpoint),
    }
}
