//! User interaction utilities for cloudls

use anyhow::Result;
use std::io::{self, BufRead, Write};

/// Prompt the user for confirmation with a no as default.
///
/// Returns `true` if the user explicitly confirms (Y/y/yes),
/// `false` otherwise (including empty input).
///
/// # Arguments
/// * `message` - The prompt message to display (without the [y/N] suffix)
pub fn confirm_no_default(message: &str) -> Result<bool> {
    print!("{} [y/N] ", message);
    io::stdout().flush()?;

    read_answer(io::stdin().lock())
}

/// Read one answer line; anything but an explicit yes is a no
fn read_answer(mut input: impl BufRead) -> Result<bool> {
    let mut response = String::new();
    input.read_line(&mut response)?;
    let response = response.trim().to_lowercase();

    Ok(response == "y" || response == "yes")
}
