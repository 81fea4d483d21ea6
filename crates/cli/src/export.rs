//! Rendering adapters: JSON envelope and console tables.

use clap::ValueEnum;
use serde::Serialize;

use xlcompare_recon::model::{CellResult, MetricReport, ReconciliationResult};
use xlcompare_recon::ReconConfig;

use crate::util::{render_grid, Align};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Console,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    pub tool_version: String,
    pub run_at: String,
}

impl Meta {
    pub fn now() -> Self {
        Meta {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsOutput<'a> {
    pub meta: Meta,
    pub config: &'a ReconConfig,
    #[serde(flatten)]
    pub report: &'a MetricReport,
}

#[derive(Debug, Serialize)]
pub struct TableOutput<'a> {
    pub meta: Meta,
    pub config: &'a ReconConfig,
    pub key_columns: usize,
    #[serde(flatten)]
    pub result: &'a ReconciliationResult,
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization error: {e}"))
}

pub fn metrics_console(report: &MetricReport) -> String {
    let headers: Vec<String> = ["Metric", "A", "B", "A-B", "Diff %", "Result"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let align = [
        Align::Left,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Left,
    ];

    let rows: Vec<Vec<String>> = report
        .records
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.value_a.to_string(),
                r.value_b.to_string(),
                r.difference.to_string(),
                r.percentage.to_string(),
                r.classification.as_str().to_uppercase(),
            ]
        })
        .collect();

    render_grid(&headers, &align, &rows)
}

pub fn table_console(result: &ReconciliationResult) -> String {
    let key_count = result.key_headers.len();
    let mut headers = result.key_headers.clone();
    headers.push("Origin".to_string());
    headers.extend(result.indicator_columns.iter().cloned());

    let mut align = vec![Align::Left; key_count + 1];
    align.extend(std::iter::repeat(Align::Right).take(result.indicator_columns.len()));

    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.key_values.iter().map(|k| k.to_string()).collect();
            cells.push(row.origin.as_str().to_string());
            cells.extend(row.cells.iter().map(cell_text));
            cells
        })
        .collect();

    render_grid(&headers, &align, &rows)
}

/// Mismatched differences are flagged with `*`, missing cells name the side.
fn cell_text(cell: &CellResult) -> String {
    match cell {
        CellResult::Diff { value, classification } => match classification {
            xlcompare_recon::Classification::Match => value.to_string(),
            _ => format!("*{value}"),
        },
        CellResult::Missing { side } => format!("ERR({side})"),
    }
}
