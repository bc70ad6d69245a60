//! Configuration management for cloudls
//!
//! Settings are resolved per invocation, highest precedence first:
//! - command-line flags (and their CLOUDLS_* environment variables)
//! - the selected profile in config.toml
//! - built-in defaults
//!
//! The result is a [`ClientSettings`] value handed to whatever builds the
//! HTTP client. Nothing here is stored globally.

use super::deprecation::Diagnostics;
use super::paths::CloudlsPaths;
use super::preferences::{validate_endpoint, Preferences, Profile};
use anyhow::{Context, Result};
use std::time::Duration;

/// Profile used when neither `--profile` nor `default_profile` is set
pub const DEFAULT_PROFILE: &str = "default";

/// Request timeout used when the profile does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub token: Option<String>,
}

/// Fully resolved connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub profile: String,
    pub endpoint: String,
    pub region: Option<String>,
    pub token: Option<String>,
    pub page_size: Option<u32>,
    pub timeout: Duration,
}

/// Configuration manager
pub struct Config {
    paths: CloudlsPaths,
}

impl Config {
    /// Create a new Config instance
    pub fn new(paths: CloudlsPaths) -> Self {
        Self { paths }
    }

    /// Get the paths manager
    pub fn paths(&self) -> &CloudlsPaths {
        &self.paths
    }

    /// Load config.toml (defaults when it does not exist)
    pub fn load_preferences(&self, diagnostics: &mut Diagnostics) -> Result<Preferences> {
        let prefs = Preferences::load(self.paths.config_toml(), diagnostics)?;
        prefs.validate().with_context(|| {
            format!(
                "Invalid configuration in {}",
                self.paths.config_toml().display()
            )
        })?;
        Ok(prefs)
    }

    /// Resolve the settings for this invocation
    pub fn resolve(
        &self,
        overrides: &Overrides,
        diagnostics: &mut Diagnostics,
    ) -> Result<ClientSettings> {
        let prefs = self.load_preferences(diagnostics)?;
        resolve_settings(&prefs, overrides)
    }
}

/// Merge overrides with the selected profile
pub fn resolve_settings(prefs: &Preferences, overrides: &Overrides) -> Result<ClientSettings> {
    let name = overrides
        .profile
        .clone()
        .or_else(|| prefs.default_profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

    let profile = match prefs.profiles.get(&name) {
        Some(profile) => profile.clone(),
        // An explicitly requested profile must exist
        None if overrides.profile.is_some() => {
            anyhow::bail!("Profile '{}' is not defined in config.toml", name)
        }
        None => Profile::default(),
    };

    let endpoint = overrides
        .endpoint
        .clone()
        .or(profile.endpoint)
        .with_context(|| {
            format!(
                "No endpoint configured for profile '{}' (use --endpoint, CLOUDLS_ENDPOINT or 'cloudls config init')",
                name
            )
        })?;
    validate_endpoint(&endpoint)?;

    log::debug!("Using profile '{}' with endpoint {}", name, endpoint);

    Ok(ClientSettings {
        profile: name,
        endpoint,
        region: overrides.region.clone().or(profile.region),
        token: overrides.token.clone().or(profile.token),
        page_size: profile.page_size,
        timeout: Duration::from_secs(profile.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    })
}
