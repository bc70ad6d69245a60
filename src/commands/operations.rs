//! Operations command implementation

use crate::providers::catalog::{Operation, OPERATIONS};
use anyhow::Result;
use colored::Colorize;

/// Print the operations that can be listed
pub fn run() -> Result<()> {
    println!("{}", "Available operations".bold());
    println!();
    println!(
        "{:<20} {:<10} {:<18} {}",
        "NAME".bold(),
        "MAX PAGE".bold(),
        "REQUIRED FILTERS".bold(),
        "DESCRIPTION".bold()
    );
    println!("{}", "─".repeat(100));

    for op in OPERATIONS {
        println!(
            "{:<20} {:<10} {:<18} {}",
            op.name.green(),
            op.max_page_size,
            required_filters(op),
            op.description
        );
    }

    println!();
    println!("Total: {} operation(s)", OPERATIONS.len());
    println!("List one with: cloudls list <name> [--filter NAME=VALUE]...");

    Ok(())
}

/// Comma-separated path filters, or "-" when there are none
fn required_filters(op: &Operation) -> String {
    let params: Vec<_> = op.path_params().collect();
    if params.is_empty() {
        "-".to_string()
    } else {
        params.join(",")
    }
}
