//! Config command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use std::env;
use std::process::Command;

use crate::cli::ConfigCommands;
use crate::core::config::resolve_settings;
use crate::core::{Config, Diagnostics, Overrides, Preferences};
use crate::utils::confirm_no_default;

/// Run a config subcommand
pub fn run(command: ConfigCommands, config: &Config, overrides: &Overrides) -> Result<()> {
    match command {
        ConfigCommands::Show => show(config, overrides),
        ConfigCommands::Path => {
            println!("{}", config.paths().config_toml().display());
            Ok(())
        }
        ConfigCommands::Init { yes } => init(config, yes),
        ConfigCommands::Edit => edit(config),
    }
}

/// Print profiles and the settings the next command would use
fn show(config: &Config, overrides: &Overrides) -> Result<()> {
    let config_path = config.paths().config_toml();
    let mut diagnostics = Diagnostics::new();
    let prefs = config.load_preferences(&mut diagnostics)?;
    diagnostics.emit();

    println!("{} {}", "Config file:".bold(), config_path.display());
    if !config_path.exists() {
        println!("  {} not created yet, run 'cloudls config init'", "ℹ".cyan());
    }
    println!();

    if prefs.profiles.is_empty() {
        println!("{}", "No profiles defined".yellow());
    } else {
        println!("{}", "Profiles".bold());
        for (name, profile) in &prefs.profiles {
            let marker = if prefs.default_profile.as_deref() == Some(name.as_str()) {
                " (default)".green().to_string()
            } else {
                String::new()
            };
            println!(
                "  {}{}  {}",
                name,
                marker,
                profile.endpoint.as_deref().unwrap_or("-").dimmed()
            );
        }
    }
    println!();

    match resolve_settings(&prefs, overrides) {
        Ok(settings) => {
            println!("{}", "Active settings".bold());
            println!("  {:<12} {}", "profile:", settings.profile);
            println!("  {:<12} {}", "endpoint:", settings.endpoint);
            println!("  {:<12} {}", "region:", settings.region.as_deref().unwrap_or("-"));
            println!("  {:<12} {}", "token:", mask(settings.token.as_deref()));
            println!(
                "  {:<12} {}",
                "page size:",
                settings
                    .page_size
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "service default".to_string())
            );
            println!("  {:<12} {}s", "timeout:", settings.timeout.as_secs());
        }
        Err(e) => {
            println!("{} {}", "⚠".yellow().bold(), e.to_string().yellow());
        }
    }

    Ok(())
}

/// Hide all but the last four characters of a secret
fn mask(token: Option<&str>) -> String {
    match token {
        None => "-".to_string(),
        Some(token) => {
            let chars: Vec<char> = token.chars().collect();
            if chars.len() <= 4 {
                "****".to_string()
            } else {
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("****{}", tail)
            }
        }
    }
}

/// Write the default config file
fn init(config: &Config, yes: bool) -> Result<()> {
    let config_path = config.paths().config_toml();

    if config_path.exists()
        && !yes
        && !confirm_no_default(&format!("Overwrite {}?", config_path.display()))?
    {
        println!("{}", "Aborted, existing config kept".yellow());
        return Ok(());
    }

    Preferences::generate_default_file(config_path)?;
    println!(
        "{} Wrote default config to {}",
        "✓".green().bold(),
        config_path.display()
    );
    println!("  {} Edit it with: cloudls config edit", "ℹ".cyan());

    Ok(())
}

/// Open config.toml in an editor and validate the result
fn edit(config: &Config) -> Result<()> {
    let config_path = config.paths().config_toml();

    // Generate default config file if it doesn't exist
    if !config_path.exists() {
        println!("{} Generating default config file...", "✓".green().bold());
        Preferences::generate_default_file(config_path)?;
    }

    // Detect editor
    let editor = detect_editor();

    println!(
        "{} Opening config file: {}",
        "ℹ".cyan(),
        config_path.display().to_string().dimmed()
    );
    println!("  {} Using editor: {}", "ℹ".cyan(), editor.dimmed());

    // Open editor
    let status = Command::new(&editor)
        .arg(config_path)
        .status()
        .with_context(|| format!("Failed to launch editor: {}", editor))?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status: {}", status);
    }

    // Validate config after editing
    println!("{} Validating config...", "ℹ".cyan());
    let mut diagnostics = Diagnostics::new();
    match config.load_preferences(&mut diagnostics) {
        Ok(_) => {
            diagnostics.emit();
            println!("{} Configuration is valid", "✓".green().bold());
        }
        Err(e) => {
            println!("{} {}", "✗".red().bold(), format!("{:#}", e).red());
            println!(
                "  {} Commands will fail until the errors are fixed",
                "ℹ".cyan()
            );
        }
    }

    Ok(())
}

/// Detect the appropriate editor to use
///
/// Priority:
/// 1. $EDITOR environment variable
/// 2. Platform-specific defaults:
///    - Unix: nano (fallback to vim, then vi)
///    - Windows: notepad.exe
fn detect_editor() -> String {
    // Check $EDITOR environment variable
    if let Ok(editor) = env::var("EDITOR") {
        if !editor.is_empty() {
            return editor;
        }
    }

    // Platform-specific defaults
    #[cfg(windows)]
    {
        "notepad.exe".to_string()
    }

    #[cfg(not(windows))]
    {
        if which("nano") {
            "nano".to_string()
        } else if which("vim") {
            "vim".to_string()
        } else {
            "vi".to_string()
        }
    }
}

/// Check if a command exists in PATH
#[cfg(not(windows))]
fn which(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
