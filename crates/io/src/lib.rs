// File I/O around the reconciliation engine: CSV/TSV and Excel readers,
// xlsx result writers, sample inputs.

pub mod csv;
pub mod sample;
pub mod source;
pub mod xlsx;

use xlcompare_recon::CellValue;

/// Raw worksheet contents, row-major, addressed from A1. Rows may differ in
/// length.
pub type Grid = Vec<Vec<CellValue>>;

pub use sample::write_sample;
pub use source::{read_baseline, read_grid, read_horizontal, read_table, SourceFormat};
pub use xlsx::{write_metric_workbook, write_table_workbook};
