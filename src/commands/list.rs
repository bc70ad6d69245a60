//! List command implementation

use crate::cli::ListArgs;
use crate::core::deprecation::{self, Diagnostics, LIMIT_FLAG, MARKER_FLAG};
use crate::core::{ClientSettings, Config, Overrides};
use crate::output::{self, Layout, OutputFormat, PageRenderer};
use crate::paginator::{FinalStatus, ListRequest, PaginatedListInvoker, StopReason};
use crate::providers::{catalog, HttpListService};
use crate::utils::HttpClient;
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// List every page of an operation, printing records as pages arrive
pub async fn run(args: ListArgs, config: &Config, overrides: &Overrides) -> Result<()> {
    let operation = catalog::find(&args.operation).with_context(|| {
        format!(
            "Unknown operation '{}' (run 'cloudls operations' to see them all)",
            args.operation
        )
    })?;

    let mut diagnostics = Diagnostics::new();
    let settings = config.resolve(overrides, &mut diagnostics)?;
    let request = build_request(&args, &settings, &mut diagnostics);
    diagnostics.emit();

    let http = HttpClient::new(&settings)?;
    let service = HttpListService::new(&http, operation);

    let (layout, project) = match args.select {
        Some(ref path) => (Layout::Selected(path.clone()), output::field(path)),
        None => (
            Layout::Columns(operation.columns.iter().map(|c| c.to_string()).collect()),
            output::whole_record(),
        ),
    };
    let mut renderer = PageRenderer::new(io::stdout().lock(), args.output, layout, project);

    let spinner = create_spinner(args.output);

    // Ctrl-C stops the listing; records already printed stay printed
    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let stop = cancel.clone();
    let mut received = 0u64;
    let mut write_error: Option<io::Error> = None;

    let invoker = PaginatedListInvoker::new(&service).with_cancellation(cancel);
    let status = invoker
        .invoke(request, |items, is_last| {
            received += items.len() as u64;
            spinner.set_message(format!("{} item(s) received", received));

            if let Err(e) = spinner.suspend(|| renderer.render_page(&items)) {
                write_error = Some(e);
                stop.cancel();
            }
            if is_last {
                log::debug!("Last page of {} received", operation.name);
            }
        })
        .await;

    ctrl_c.abort();
    spinner.finish_and_clear();

    if let Some(e) = write_error {
        // The reader went away (e.g. piped into `head`)
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(e).context("Failed to write output");
    }

    report(status, operation.name)
}

/// Build the paginator request from command-line arguments and settings
fn build_request(
    args: &ListArgs,
    settings: &ClientSettings,
    diagnostics: &mut Diagnostics,
) -> ListRequest {
    let item_limit = deprecation::prefer(args.max_items, args.limit, &LIMIT_FLAG, diagnostics);
    let starting_token = deprecation::prefer(
        args.starting_token.clone(),
        args.marker.clone(),
        &MARKER_FLAG,
        diagnostics,
    );

    if let Some(limit) = item_limit.filter(|limit| *limit <= 0) {
        log::warn!("--max-items {} is not positive, listing without a limit", limit);
    }

    ListRequest {
        filters: args.filters.iter().cloned().collect(),
        page_size: args.page_size.or(settings.page_size),
        starting_token,
        item_limit,
        manual: args.no_paginate,
    }
}

/// Spinner on stderr, hidden when stderr is not a terminal or output is JSON
fn create_spinner(format: OutputFormat) -> ProgressBar {
    if format == OutputFormat::Json || !console::Term::stderr().is_term() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Listing...");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Lines describing how a listing ended
fn summary(status: &FinalStatus, name: &str) -> Vec<String> {
    let mut lines = Vec::new();

    match status {
        FinalStatus::Completed { items: 0, .. } => {
            lines.push(format!("No {} found", name));
        }
        FinalStatus::Completed { pages, items, .. } => {
            lines.push(format!("Total: {} item(s) in {} page(s)", items, pages));
        }
        FinalStatus::Cancelled { pages, items, .. } => {
            lines.push(format!(
                "Cancelled after {} item(s) in {} page(s)",
                items, pages
            ));
        }
        FinalStatus::Failed {
            pages,
            items,
            error,
            ..
        } => {
            lines.push(format!(
                "Retrieved {} item(s) in {} page(s) before a {} failure",
                items,
                pages,
                error.kind()
            ));
        }
    }

    let more_available = match status {
        FinalStatus::Completed { reason, .. } => *reason != StopReason::EndOfList,
        _ => true,
    };
    if more_available {
        if let Some(token) = status.resume_token() {
            lines.push(format!("Resume with: --starting-token {}", token));
        }
    }

    lines
}

/// Print the summary and turn failures into errors
fn report(status: FinalStatus, name: &str) -> Result<()> {
    let lines = summary(&status, name);

    match status {
        FinalStatus::Completed { .. } => {
            eprintln!();
            for line in &lines {
                eprintln!("{}", line);
            }
            Ok(())
        }
        FinalStatus::Cancelled { .. } => {
            for line in &lines {
                eprintln!("{} {}", "⚠".yellow().bold(), line.yellow());
            }
            anyhow::bail!("Listing of {} cancelled", name)
        }
        FinalStatus::Failed { error, .. } => {
            for line in &lines {
                eprintln!("{} {}", "✗".red().bold(), line);
            }
            Err(anyhow::Error::new(error).context(format!("Failed to list {}", name)))
        }
    }
}
