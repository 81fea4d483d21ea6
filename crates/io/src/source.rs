// Shaping grids into what the reconcilers consume: a baseline name list, a
// horizontal named-value mapping, or a table.
//
// Row and column numbers in this module are 1-based, as a spreadsheet user
// would count them.

use std::path::Path;

use xlcompare_recon::{CellValue, NamedValues, Table};

use crate::{csv, xlsx, Grid};

/// How a file is read, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Tsv,
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Delimited),
            "tsv" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            "" => Err(format!("{}: no file extension; expected .csv, .tsv or .xlsx", path.display())),
            other => Err(format!("{}: unsupported file type '.{other}'", path.display())),
        }
    }
}

/// Read any supported file into a grid. `sheet` only applies to
/// spreadsheets.
pub fn read_grid(path: &Path, sheet: Option<&str>) -> Result<Grid, String> {
    let format = SourceFormat::from_path(path)?;
    if sheet.is_some() && format != SourceFormat::Spreadsheet {
        log::warn!("{}: sheet name ignored for delimited text", path.display());
    }

    let grid = match format {
        SourceFormat::Delimited => csv::read_grid(path)?,
        SourceFormat::Tsv => csv::read_grid_with_delimiter(path, b'\t')?,
        SourceFormat::Spreadsheet => xlsx::read_grid(path, sheet)?,
    };
    log::info!("loaded {} ({} row(s))", path.display(), grid.len());
    Ok(grid)
}

/// Vertical list of metric names: column `column`, from row `start_row`
/// down. Blank cells are skipped; names are trimmed.
pub fn read_baseline(
    path: &Path,
    sheet: Option<&str>,
    column: usize,
    start_row: usize,
) -> Result<Vec<String>, String> {
    check_index("column", column)?;
    check_index("start row", start_row)?;

    let grid = read_grid(path, sheet)?;
    Ok(baseline_from_grid(&grid, column - 1, start_row - 1))
}

/// Horizontal mapping: names along `header_row`, values along `data_row`.
/// Blank names are skipped. A repeated name keeps its first position and
/// takes the later value.
pub fn read_horizontal(
    path: &Path,
    sheet: Option<&str>,
    header_row: usize,
    data_row: usize,
) -> Result<NamedValues, String> {
    check_index("header row", header_row)?;
    check_index("data row", data_row)?;

    let grid = read_grid(path, sheet)?;
    Ok(horizontal_from_grid(&grid, header_row - 1, data_row - 1))
}

/// Table with headers on `header_row` and data in every following row.
/// Entirely blank rows are dropped.
pub fn read_table(path: &Path, sheet: Option<&str>, header_row: usize) -> Result<Table, String> {
    check_index("header row", header_row)?;

    let grid = read_grid(path, sheet)?;
    let table = table_from_grid(grid, header_row - 1);
    if table.headers.is_empty() {
        return Err(format!(
            "{}: header row {} is empty",
            path.display(),
            header_row
        ));
    }
    Ok(table)
}

fn check_index(what: &str, value: usize) -> Result<(), String> {
    if value == 0 {
        return Err(format!("{what} is 1-based; got 0"));
    }
    Ok(())
}

fn cell_at(grid: &Grid, row: usize, col: usize) -> &CellValue {
    const EMPTY: &CellValue = &CellValue::Empty;
    grid.get(row).and_then(|r| r.get(col)).unwrap_or(EMPTY)
}

fn baseline_from_grid(grid: &Grid, col: usize, start: usize) -> Vec<String> {
    grid.iter()
        .skip(start)
        .filter_map(|row| row.get(col))
        .filter(|cell| !cell.is_empty())
        .map(|cell| cell.as_raw_string().trim().to_string())
        .collect()
}

fn horizontal_from_grid(grid: &Grid, header_row: usize, data_row: usize) -> NamedValues {
    let mut values = NamedValues::new();
    let Some(headers) = grid.get(header_row) else {
        return values;
    };

    for (col, header) in headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        let name = header.as_raw_string().trim().to_string();
        let value = cell_at(grid, data_row, col).clone();
        if values.insert(name.clone(), value).is_some() {
            log::debug!("repeated header '{name}' at column {}; later value kept", col + 1);
        }
    }
    values
}

fn table_from_grid(mut grid: Grid, header_row: usize) -> Table {
    if header_row >= grid.len() {
        return Table::default();
    }
    let rows: Vec<Vec<CellValue>> = grid
        .drain(header_row + 1..)
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();

    let header_cells = &grid[header_row];
    // Trailing blank header cells are not columns
    let width = header_cells
        .iter()
        .rposition(|c| !c.is_empty())
        .map_or(0, |p| p + 1);
    let headers = header_cells[..width]
        .iter()
        .map(|c| c.as_raw_string().trim().to_string())
        .collect();

    Table::new(headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn format_by_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.CSV")).unwrap(), SourceFormat::Delimited);
        assert_eq!(SourceFormat::from_path(Path::new("a.tsv")).unwrap(), SourceFormat::Tsv);
        assert_eq!(SourceFormat::from_path(Path::new("a.xlsx")).unwrap(), SourceFormat::Spreadsheet);
        assert_eq!(SourceFormat::from_path(Path::new("a.ods")).unwrap(), SourceFormat::Spreadsheet);
        assert!(SourceFormat::from_path(Path::new("a.pdf")).is_err());
        assert!(SourceFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn baseline_skips_header_and_blanks() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "base.csv", "指标名称,备注\n 收入 ,x\n,\n成本,y\n");
        let names = read_baseline(&path, None, 1, 2).unwrap();
        assert_eq!(names, vec!["收入".to_string(), "成本".to_string()]);

        let notes = read_baseline(&path, None, 2, 1).unwrap();
        assert_eq!(notes, vec!["备注".to_string(), "x".to_string(), "y".to_string()]);
    }

    #[test]
    fn horizontal_pairs_header_and_value_rows() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.csv", "收入,,成本,收入\n100,9,,300\n");
        let values = read_horizontal(&path, None, 1, 2).unwrap();

        let keys: Vec<&str> = values.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["收入", "成本"]);
        assert_eq!(values["收入"], CellValue::from("300"));
        assert_eq!(values["成本"], CellValue::Empty);
    }

    #[test]
    fn horizontal_missing_data_row_reads_empty() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.csv", "x,y\n");
        let values = read_horizontal(&path, None, 1, 2).unwrap();
        assert_eq!(values.len(), 2);
        assert!(values.values().all(CellValue::is_empty));
    }

    #[test]
    fn table_drops_blank_rows_and_trailing_headers() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "t.csv", "title,,\nk,v,\nx,1,\n,,\ny,2,extra\n");
        let table = read_table(&path, None, 2).unwrap();
        assert_eq!(table.headers, vec!["k".to_string(), "v".to_string()]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][2], CellValue::from("extra"));
    }

    #[test]
    fn zero_based_indices_rejected() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "t.csv", "k,v\n");
        assert!(read_table(&path, None, 0).is_err());
        assert!(read_baseline(&path, None, 0, 1).is_err());
    }

    #[test]
    fn empty_header_row_is_an_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "t.csv", "k,v\n");
        let err = read_table(&path, None, 5).unwrap_err();
        assert!(err.contains("header row 5 is empty"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_table(Path::new("/nonexistent/dir/t.csv"), None, 1).unwrap_err();
        assert!(err.contains("/nonexistent/dir/t.csv"));
    }
}
