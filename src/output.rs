//! Rendering of listed records
//!
//! Pages are written as they arrive, so table output uses fixed-width
//! columns instead of measuring the whole listing first.

use clap::ValueEnum;
use colored::Colorize;
use serde_json::Value;
use std::io::{self, Write};

/// Width of every table column except the last
const COLUMN_WIDTH: usize = 24;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns with a header
    #[default]
    Table,
    /// One JSON document per record
    Json,
    /// Tab-separated values, no header
    Text,
}

/// Turns a listed record into what gets printed
pub type Projection = Box<dyn Fn(&Value) -> Value>;

/// Print records unchanged
pub fn whole_record() -> Projection {
    Box::new(|record| record.clone())
}

/// Print one field, addressed with a dotted path (e.g. "Owner.DisplayName")
pub fn field(path: &str) -> Projection {
    let pointer = json_pointer(path);
    Box::new(move |record| record.pointer(&pointer).cloned().unwrap_or(Value::Null))
}

/// Convert a dotted path into a JSON pointer
fn json_pointer(path: &str) -> String {
    path.split('.')
        .map(|part| format!("/{}", part.replace('~', "~0").replace('/', "~1")))
        .collect()
}

/// Which cells a table or text row has
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Named fields of the whole record
    Columns(Vec<String>),
    /// The projected value alone, under this header
    Selected(String),
}

/// Writes pages of records in the chosen format
pub struct PageRenderer<W: Write> {
    out: W,
    format: OutputFormat,
    layout: Layout,
    project: Projection,
    header_written: bool,
}

impl<W: Write> PageRenderer<W> {
    pub fn new(out: W, format: OutputFormat, layout: Layout, project: Projection) -> Self {
        Self {
            out,
            format,
            layout,
            project,
            header_written: false,
        }
    }

    /// Write one page
    pub fn render_page(&mut self, items: &[Value]) -> io::Result<()> {
        for record in items {
            let projected = (self.project)(record);
            match self.format {
                OutputFormat::Json => {
                    writeln!(self.out, "{}", projected)?;
                }
                OutputFormat::Text => {
                    let cells = self.cells(&projected);
                    writeln!(self.out, "{}", cells.join("\t"))?;
                }
                OutputFormat::Table => {
                    if !self.header_written {
                        self.write_header()?;
                    }
                    let cells = self.cells(&projected);
                    self.write_row(&cells)?;
                }
            }
        }
        self.out.flush()
    }

    /// Give back the writer
    #[allow(dead_code)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn headers(&self) -> Vec<String> {
        match &self.layout {
            Layout::Columns(columns) => columns.clone(),
            Layout::Selected(name) => vec![name.clone()],
        }
    }

    fn cells(&self, projected: &Value) -> Vec<String> {
        match &self.layout {
            Layout::Columns(columns) => columns
                .iter()
                .map(|column| display(projected.get(column).unwrap_or(&Value::Null)))
                .collect(),
            Layout::Selected(_) => vec![display(projected)],
        }
    }

    fn write_header(&mut self) -> io::Result<()> {
        let headers: Vec<String> = self
            .headers()
            .iter()
            .map(|h| h.to_uppercase())
            .collect();
        let width = COLUMN_WIDTH * headers.len().saturating_sub(1) + 16;

        let line = pad_row(&headers);
        writeln!(self.out, "{}", line.bold())?;
        writeln!(self.out, "{}", "─".repeat(width))?;
        self.header_written = true;
        Ok(())
    }

    fn write_row(&mut self, cells: &[String]) -> io::Result<()> {
        writeln!(self.out, "{}", pad_row(cells))
    }
}

/// Pad every cell but the last to the column width
fn pad_row(cells: &[String]) -> String {
    let last = cells.len().saturating_sub(1);
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            if i == last {
                cell.clone()
            } else {
                format!("{:<width$}", truncate(cell, COLUMN_WIDTH - 1), width = COLUMN_WIDTH)
            }
        })
        .collect()
}

/// Render a JSON value as a table cell
fn display(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Truncate string to max length
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
