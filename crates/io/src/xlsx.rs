// Excel file import (xlsx, xlsm, xls, xlsb, ods) and result export (xlsx only)
//
// Import: the first worksheet (or a named one) becomes a dense grid of
// CellValue, addressed from A1 regardless of where the used range starts.
// Export: presentation snapshot of a reconciliation. Not a round-trip format.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use xlcompare_recon::model::{CellResult, Measure, MetricReport, ReconciliationResult, RowOrigin};
use xlcompare_recon::{parse_number, CellValue, Classification, ReconConfig, Table};

use crate::Grid;

const GREEN: u32 = 0x90EE90;
const RED: u32 = 0xFF6B6B;
const HEADER_GREY: u32 = 0xDCDCDC;
const LEGEND_GREY: u32 = 0xF0F0F0;
const UNMATCHED_AMBER: u32 = 0xFFD966;

// ============================================================================
// Import
// ============================================================================

/// Read one worksheet into a grid. `sheet = None` reads the first sheet.
pub fn read_grid(path: &Path, sheet: Option<&str>) -> Result<Grid, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file {}: {}", path.display(), e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|n| n == name) {
                return Err(format!(
                    "Sheet '{}' not found in {} (available: {})",
                    name,
                    path.display(),
                    sheet_names.join(", ")
                ));
            }
            name.to_string()
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| format!("Excel file {} contains no sheets", path.display()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Grid = vec![Vec::new(); start_row as usize];

    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(convert_cell));
        grid.push(cells);
    }

    log::debug!(
        "{} [{}]: {} row(s) read",
        path.display(),
        sheet_name,
        grid.len()
    );
    Ok(grid)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(n) => CellValue::from_f64(*n),
        Data::Int(n) => CellValue::from(*n),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        // Kept as text so the number parser treats it as unparsable
        Data::Error(e) => CellValue::text(e.to_string()),
        // Date cells compare by serial number
        Data::DateTime(dt) => CellValue::from_f64(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::text(s.as_str()),
        Data::DurationIso(s) => CellValue::text(s.as_str()),
    }
}

// ============================================================================
// Export
// ============================================================================

struct Styles {
    header: Format,
    plain: Format,
    number: Format,
    green_number: Format,
    red_number: Format,
    green_text: Format,
    red_text: Format,
    legend: Format,
    unmatched: Format,
}

impl Styles {
    fn new(decimal_places: u32) -> Self {
        let bordered = Format::new().set_border(FormatBorder::Thin);
        let pattern = if decimal_places == 0 {
            "0".to_string()
        } else {
            format!("0.{}", "0".repeat(decimal_places as usize))
        };
        let number = bordered.clone().set_num_format(&pattern);

        Styles {
            header: bordered
                .clone()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(Color::RGB(HEADER_GREY)),
            plain: bordered.clone(),
            green_number: number.clone().set_background_color(Color::RGB(GREEN)),
            red_number: number.clone().set_background_color(Color::RGB(RED)),
            number,
            green_text: bordered.clone().set_background_color(Color::RGB(GREEN)),
            red_text: bordered.clone().set_background_color(Color::RGB(RED)),
            legend: bordered
                .clone()
                .set_font_size(10)
                .set_background_color(Color::RGB(LEGEND_GREY)),
            unmatched: bordered.set_background_color(Color::RGB(UNMATCHED_AMBER)),
        }
    }

    fn for_class(&self, class: Classification, numeric: bool) -> &Format {
        match (class, numeric) {
            (Classification::Match, true) => &self.green_number,
            (Classification::Match, false) => &self.green_text,
            (_, true) => &self.red_number,
            (_, false) => &self.red_text,
        }
    }
}

/// Write a metric reconciliation: name, A, B, A−B, percentage, with the
/// percentage cell filled green (match) or red (mismatch / error) and a
/// legend at G1:H2.
pub fn write_metric_workbook(
    path: &Path,
    report: &MetricReport,
    config: &ReconConfig,
) -> Result<(), String> {
    let styles = Styles::new(config.decimal_places);
    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name("Comparison")
        .map_err(|e| format!("Failed to create sheet: {}", e))?;

    let headers = ["Metric", "A", "B", "Difference (A-B)", "Difference %"];
    for (col, h) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *h, &styles.header)
            .map_err(xlsx_err)?;
    }

    for (i, record) in report.records.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet
            .write_string_with_format(row, 0, &record.name, &styles.plain)
            .map_err(xlsx_err)?;
        write_operand(worksheet, row, 1, &record.value_a, &styles)?;
        write_operand(worksheet, row, 2, &record.value_b, &styles)?;

        match record.difference {
            Measure::Value(d) => write_decimal(worksheet, row, 3, d, &styles.number)?,
            Measure::Error => {
                worksheet
                    .write_string_with_format(row, 3, "#VALUE!", &styles.plain)
                    .map_err(xlsx_err)?;
            }
        }

        let pct_text = match record.percentage {
            Measure::Value(p) => format!("{p}%"),
            Measure::Error => "#VALUE!".to_string(),
        };
        worksheet
            .write_string_with_format(row, 4, &pct_text, styles.for_class(record.classification, false))
            .map_err(xlsx_err)?;
    }

    let legend_match = format!("A=B or |diff %| < {}%", config.match_threshold);
    write_legend(worksheet, 0, 6, &legend_match, &styles)?;

    for (col, width) in [22.0, 18.0, 18.0, 18.0, 16.0, 4.0, 26.0, 10.0].iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *width)
            .map_err(xlsx_err)?;
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file {}: {}", path.display(), e))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Write a table reconciliation: a comparison sheet (key columns, origin,
/// one column per indicator) and both source tables with unmatched rows
/// highlighted.
pub fn write_table_workbook(
    path: &Path,
    result: &ReconciliationResult,
    left: &Table,
    right: &Table,
    config: &ReconConfig,
) -> Result<(), String> {
    let styles = Styles::new(config.decimal_places);
    let mut workbook = Workbook::new();

    {
        let worksheet = workbook
            .add_worksheet()
            .set_name("Comparison")
            .map_err(|e| format!("Failed to create sheet: {}", e))?;

        let key_count = result.key_headers.len();
        let mut col = 0u16;
        for h in &result.key_headers {
            worksheet
                .write_string_with_format(0, col, h, &styles.header)
                .map_err(xlsx_err)?;
            col += 1;
        }
        worksheet
            .write_string_with_format(0, col, "Origin", &styles.header)
            .map_err(xlsx_err)?;
        for h in &result.indicator_columns {
            col += 1;
            worksheet
                .write_string_with_format(0, col, h, &styles.header)
                .map_err(xlsx_err)?;
        }

        for (i, row) in result.rows.iter().enumerate() {
            let r = i as u32 + 1;
            for (c, key) in row.key_values.iter().enumerate() {
                worksheet
                    .write_string_with_format(r, c as u16, key.to_string(), &styles.plain)
                    .map_err(xlsx_err)?;
            }
            let origin_format = match row.origin {
                RowOrigin::Matched => &styles.plain,
                RowOrigin::OnlyLeft | RowOrigin::OnlyRight => &styles.unmatched,
            };
            worksheet
                .write_string_with_format(r, key_count as u16, row.origin.as_str(), origin_format)
                .map_err(xlsx_err)?;

            for (c, cell) in row.cells.iter().enumerate() {
                let c = (key_count + 1 + c) as u16;
                match cell {
                    CellResult::Diff { value, classification } => {
                        write_decimal(worksheet, r, c, *value, styles.for_class(*classification, true))?;
                    }
                    CellResult::Missing { side } => {
                        worksheet
                            .write_string_with_format(r, c, format!("missing in {side}"), &styles.red_text)
                            .map_err(xlsx_err)?;
                    }
                }
            }
        }

        let legend_col = (key_count + 2 + result.indicator_columns.len()) as u16;
        let legend_match = format!("|A-B| < {}", config.diff_threshold);
        write_legend(worksheet, 0, legend_col, &legend_match, &styles)?;

        worksheet
            .set_column_width(legend_col, 26.0)
            .map_err(xlsx_err)?;
        for c in 0..legend_col.saturating_sub(1) {
            worksheet.set_column_width(c, 16.0).map_err(xlsx_err)?;
        }
    }

    write_source_sheet(&mut workbook, "A", left, &result.unmatched_left, &styles)?;
    write_source_sheet(&mut workbook, "B", right, &result.unmatched_right, &styles)?;

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file {}: {}", path.display(), e))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn write_source_sheet(
    workbook: &mut Workbook,
    name: &str,
    table: &Table,
    unmatched: &[usize],
    styles: &Styles,
) -> Result<(), String> {
    let worksheet = workbook
        .add_worksheet()
        .set_name(name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", name, e))?;

    for (c, h) in table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, c as u16, h, &styles.header)
            .map_err(xlsx_err)?;
    }

    for (i, cells) in table.rows.iter().enumerate() {
        let r = i as u32 + 1;
        let format = if unmatched.binary_search(&i).is_ok() {
            &styles.unmatched
        } else {
            &styles.plain
        };
        for (c, cell) in cells.iter().enumerate() {
            match cell {
                CellValue::Number(d) => write_decimal(worksheet, r, c as u16, *d, format)?,
                other => {
                    worksheet
                        .write_string_with_format(r, c as u16, other.to_string(), format)
                        .map_err(xlsx_err)?;
                }
            }
        }
    }
    Ok(())
}

/// Parsed operands are written as numbers; anything else as "error".
fn write_operand(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    styles: &Styles,
) -> Result<(), String> {
    match parse_number(value) {
        Some(d) => {
            worksheet
                .write_number_with_format(row, col, d.to_f64().unwrap_or(f64::NAN), &styles.plain)
                .map_err(xlsx_err)?;
        }
        None => {
            worksheet
                .write_string_with_format(row, col, "error", &styles.plain)
                .map_err(xlsx_err)?;
        }
    }
    Ok(())
}

fn write_decimal(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Decimal,
    format: &Format,
) -> Result<(), String> {
    match value.to_f64() {
        Some(f) => worksheet.write_number_with_format(row, col, f, format),
        None => worksheet.write_string_with_format(row, col, value.to_string(), format),
    }
    .map_err(xlsx_err)?;
    Ok(())
}

fn write_legend(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    match_text: &str,
    styles: &Styles,
) -> Result<(), String> {
    worksheet
        .write_string_with_format(row, col, match_text, &styles.legend)
        .map_err(xlsx_err)?;
    worksheet
        .write_string_with_format(row, col + 1, "green", &styles.green_text)
        .map_err(xlsx_err)?;
    worksheet
        .write_string_with_format(row + 1, col, "otherwise", &styles.legend)
        .map_err(xlsx_err)?;
    worksheet
        .write_string_with_format(row + 1, col + 1, "red", &styles.red_text)
        .map_err(xlsx_err)?;
    Ok(())
}

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> String {
    format!("XLSX write error: {}", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::tempdir;
    use xlcompare_recon::{reconcile_metrics, reconcile_tables, NamedValues, PercentageBase};

    fn config() -> ReconConfig {
        ReconConfig {
            decimal_places: 4,
            percentage_base: PercentageBase::Right,
            match_threshold: Decimal::ONE,
            diff_threshold: Decimal::from_str("0.01").unwrap(),
        }
    }

    #[test]
    fn test_metric_workbook_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.xlsx");

        let a: NamedValues = [("x".to_string(), CellValue::from(101i64))].into_iter().collect();
        let b: NamedValues = [("x".to_string(), CellValue::from(100i64))].into_iter().collect();
        let report = reconcile_metrics(&["x", "y"], &a, &b, &config()).unwrap();
        write_metric_workbook(&path, &report, &config()).unwrap();

        let grid = read_grid(&path, Some("Comparison")).unwrap();
        assert_eq!(grid[0][0], CellValue::from("Metric"));
        assert_eq!(grid[1][0], CellValue::from("x"));
        assert_eq!(grid[1][1], CellValue::from(101i64));
        assert_eq!(grid[1][4], CellValue::from("1.0000%"));
        assert_eq!(grid[2][1], CellValue::from("error"));
        assert_eq!(grid[2][3], CellValue::from("#VALUE!"));
        // legend
        assert_eq!(grid[1][6], CellValue::from("otherwise"));
    }

    #[test]
    fn test_table_workbook_has_three_sheets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.xlsx");

        let left = Table::new(
            vec!["k".into(), "v".into()],
            vec![
                vec!["x".into(), CellValue::from(1i64)],
                vec!["z".into(), CellValue::from(2i64)],
            ],
        );
        let right = Table::new(vec!["k".into(), "v".into()], vec![vec!["x".into(), CellValue::from(3i64)]]);
        let result = reconcile_tables(&left, &right, 1, &config()).unwrap();
        write_table_workbook(&path, &result, &left, &right, &config()).unwrap();

        let comparison = read_grid(&path, None).unwrap();
        assert_eq!(comparison[0][..3], [CellValue::from("k"), CellValue::from("Origin"), CellValue::from("v")]);
        assert_eq!(comparison[1][1], CellValue::from("matched"));
        assert_eq!(comparison[1][2], CellValue::from(-2i64));
        assert_eq!(comparison[2][2], CellValue::from("missing in B"));

        let a = read_grid(&path, Some("A")).unwrap();
        assert_eq!(a.len(), 3);
        assert!(read_grid(&path, Some("nope")).is_err());
    }
}
