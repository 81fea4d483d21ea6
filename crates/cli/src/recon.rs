//! `xlcompare metrics` / `xlcompare table` / `xlcompare validate`.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use xlcompare_recon::{PercentageBase, ReconConfig};

use crate::exit_codes::EXIT_MISMATCH;
use crate::export::{self, Meta, MetricsOutput, OutputFormat, TableOutput};
use crate::CliError;

// ============================================================================
// Shared arguments
// ============================================================================

// Used when no --config is given.
const DEFAULT_DECIMAL_PLACES: u32 = 6;
const DEFAULT_BASE: PercentageBase = PercentageBase::Right;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BaseArg {
    /// Divide by the A value
    #[value(alias = "a")]
    Left,
    /// Divide by the B value
    #[value(alias = "b")]
    Right,
}

impl From<BaseArg> for PercentageBase {
    fn from(arg: BaseArg) -> Self {
        match arg {
            BaseArg::Left => PercentageBase::Left,
            BaseArg::Right => PercentageBase::Right,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Reconciliation config (.toml); flags below override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Decimal places for differences and percentages [default: 6]
    #[arg(long, value_name = "N")]
    pub decimal_places: Option<u32>,

    /// Percentage denominator: left/a or right/b [default: right]
    #[arg(long, value_name = "SIDE")]
    pub percentage_base: Option<BaseArg>,

    /// Percentage below which a metric matches, e.g. 1.0 = 1% [default: 1.0]
    #[arg(long, value_name = "PCT", value_parser = parse_decimal_arg)]
    pub match_threshold: Option<Decimal>,

    /// Absolute difference below which a table cell matches [default: 0.0001]
    #[arg(long, value_name = "AMOUNT", value_parser = parse_decimal_arg)]
    pub diff_threshold: Option<Decimal>,
}

#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Report format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Write the JSON report to a file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a highlighted workbook (.xlsx)
    #[arg(long, value_name = "FILE")]
    pub xlsx: Option<PathBuf>,

    /// Exit 1 if any mismatch or ERROR is present
    #[arg(long)]
    pub strict: bool,
}

fn parse_decimal_arg(s: &str) -> Result<Decimal, String> {
    xlcompare_recon::number::parse_number_str(s).ok_or_else(|| format!("'{s}' is not a decimal number"))
}

/// Load the config file (if any), then apply flag overrides.
pub fn resolve_config(args: &ConfigArgs) -> Result<ReconConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ReconConfig {
            decimal_places: DEFAULT_DECIMAL_PLACES,
            percentage_base: DEFAULT_BASE,
            match_threshold: Decimal::ONE,
            diff_threshold: Decimal::new(1, 4),
        },
    };

    if let Some(dp) = args.decimal_places {
        config.decimal_places = dp;
    }
    if let Some(base) = args.percentage_base {
        config.percentage_base = base.into();
    }
    if let Some(t) = args.match_threshold {
        config.match_threshold = t;
    }
    if let Some(t) = args.diff_threshold {
        config.diff_threshold = t;
    }

    config.validate().map_err(CliError::recon)?;
    log::debug!("config: {config:?}");
    Ok(config)
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(CliError::recon)
}

/// Print or write the JSON / console report.
fn emit(
    json: &str,
    console: impl FnOnce() -> String,
    out: &OutputArgs,
) -> Result<(), CliError> {
    if let Some(path) = &out.output {
        std::fs::write(path, json)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    match out.format {
        OutputFormat::Json => println!("{json}"),
        OutputFormat::Console => print!("{}", console()),
    }
    Ok(())
}

// ============================================================================
// metrics
// ============================================================================

#[derive(Debug, Clone, Args)]
pub struct MetricsArgs {
    /// File listing the metric names to compare, one per row
    #[arg(long, value_name = "FILE")]
    pub base: PathBuf,

    /// Source A: names across one row, values across the next
    #[arg(long, value_name = "FILE")]
    pub left: PathBuf,

    /// Source B, same layout as A
    #[arg(long, value_name = "FILE")]
    pub right: PathBuf,

    /// Sheet of the baseline workbook [default: first sheet]
    #[arg(long)]
    pub base_sheet: Option<String>,

    /// Column holding the baseline names (1-based)
    #[arg(long, default_value_t = 1)]
    pub base_column: usize,

    /// First baseline row (1-based; row 1 is usually a header)
    #[arg(long, default_value_t = 2)]
    pub base_start_row: usize,

    /// Sheet of source A [default: first sheet]
    #[arg(long)]
    pub left_sheet: Option<String>,

    /// Sheet of source B [default: first sheet]
    #[arg(long)]
    pub right_sheet: Option<String>,

    /// Row holding metric names in A and B (1-based)
    #[arg(long, default_value_t = 1)]
    pub header_row: usize,

    /// Row holding values in A and B (1-based)
    #[arg(long, default_value_t = 2)]
    pub data_row: usize,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn cmd_metrics(args: MetricsArgs) -> Result<(), CliError> {
    if args.base_column == 0 || args.base_start_row == 0 || args.header_row == 0 || args.data_row == 0 {
        return Err(CliError::args("row and column numbers are 1-based")
            .with_hint("the first row and the first column are 1"));
    }
    let config = resolve_config(&args.config)?;

    let baseline = xlcompare_io::read_baseline(
        &args.base,
        args.base_sheet.as_deref(),
        args.base_column,
        args.base_start_row,
    )
    .map_err(CliError::io)?;
    let source_a =
        xlcompare_io::read_horizontal(&args.left, args.left_sheet.as_deref(), args.header_row, args.data_row)
            .map_err(CliError::io)?;
    let source_b =
        xlcompare_io::read_horizontal(&args.right, args.right_sheet.as_deref(), args.header_row, args.data_row)
            .map_err(CliError::io)?;

    if baseline.is_empty() {
        log::warn!("{}: no baseline names found", args.base.display());
    }

    let report = xlcompare_recon::reconcile_metrics(&baseline, &source_a, &source_b, &config)
        .map_err(CliError::recon)?;

    let json = export::to_json(&MetricsOutput {
        meta: Meta::now(),
        config: &config,
        report: &report,
    })
    .map_err(CliError::parse)?;

    if let Some(path) = &args.output.xlsx {
        xlcompare_io::write_metric_workbook(path, &report, &config).map_err(CliError::io)?;
        eprintln!("wrote {}", path.display());
    }

    emit(&json, || export::metrics_console(&report), &args.output)?;

    let s = &report.summary;
    eprintln!(
        "metrics: {} compared ({} in A, {} in B) - {} matched, {} mismatched, {} errors",
        s.total,
        source_a.len(),
        source_b.len(),
        s.matched,
        s.mismatched,
        s.errors
    );

    if args.output.strict && (s.mismatched > 0 || s.errors > 0) {
        return Err(CliError {
            code: EXIT_MISMATCH,
            message: "mismatches found".to_string(),
            hint: None,
        });
    }
    Ok(())
}

// ============================================================================
// table
// ============================================================================

#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// Table A
    #[arg(long, value_name = "FILE")]
    pub left: PathBuf,

    /// Table B (its row order and columns drive the report)
    #[arg(long, value_name = "FILE")]
    pub right: PathBuf,

    /// Number of leading key columns
    #[arg(long, short = 'k', default_value_t = 1)]
    pub keys: usize,

    /// Sheet of table A [default: first sheet]
    #[arg(long)]
    pub left_sheet: Option<String>,

    /// Sheet of table B [default: first sheet]
    #[arg(long)]
    pub right_sheet: Option<String>,

    /// Header row in both tables (1-based); data starts below it
    #[arg(long, default_value_t = 1)]
    pub header_row: usize,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn cmd_table(args: TableArgs) -> Result<(), CliError> {
    if args.header_row == 0 {
        return Err(CliError::args("--header-row is 1-based"));
    }
    let config = resolve_config(&args.config)?;

    let left = xlcompare_io::read_table(&args.left, args.left_sheet.as_deref(), args.header_row)
        .map_err(CliError::io)?;
    let right = xlcompare_io::read_table(&args.right, args.right_sheet.as_deref(), args.header_row)
        .map_err(CliError::io)?;

    let result = xlcompare_recon::reconcile_tables(&left, &right, args.keys, &config)
        .map_err(CliError::recon)?;

    for c in &result.collisions {
        log::warn!(
            "table {}: rows {:?} share key [{}] with row {}; the later row is used",
            c.side,
            c.overwritten_rows,
            c.key,
            c.kept_row
        );
    }

    let json = export::to_json(&TableOutput {
        meta: Meta::now(),
        config: &config,
        key_columns: args.keys,
        result: &result,
    })
    .map_err(CliError::parse)?;

    if let Some(path) = &args.output.xlsx {
        xlcompare_io::write_table_workbook(path, &result, &left, &right, &config).map_err(CliError::io)?;
        eprintln!("wrote {}", path.display());
    }

    emit(&json, || export::table_console(&result), &args.output)?;

    let s = &result.summary;
    eprintln!(
        "table: {} row(s) - {} matched, {} only in A, {} only in B; cells: {} matched, {} mismatched, {} errors",
        result.rows.len(),
        s.matched_rows,
        s.only_left_rows,
        s.only_right_rows,
        s.cell_matches,
        s.cell_mismatches,
        s.cell_errors
    );

    if args.output.strict && (s.cell_mismatches > 0 || s.cell_errors > 0) {
        return Err(CliError {
            code: EXIT_MISMATCH,
            message: "mismatches found".to_string(),
            hint: None,
        });
    }
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&path)?;
    eprintln!(
        "{}: ok (decimal_places={}, percentage_base={}, match_threshold={}, diff_threshold={})",
        path.display(),
        config.decimal_places,
        config.percentage_base,
        config.match_threshold,
        config.diff_threshold
    );
    Ok(())
}

// ============================================================================
// sample
// ============================================================================

pub fn cmd_sample(dir: PathBuf) -> Result<(), CliError> {
    let paths = xlcompare_io::write_sample(&dir).map_err(CliError::io)?;
    for p in &paths {
        eprintln!("wrote {}", p.display());
    }
    eprintln!(
        "try: xlcompare metrics --base {} --left {} --right {}",
        dir.join(xlcompare_io::sample::BASE_FILE).display(),
        dir.join(xlcompare_io::sample::A_FILE).display(),
        dir.join(xlcompare_io::sample::B_FILE).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides() -> ConfigArgs {
        ConfigArgs {
            config: None,
            decimal_places: None,
            percentage_base: None,
            match_threshold: None,
            diff_threshold: None,
        }
    }

    #[test]
    fn defaults_without_config_file() {
        let config = resolve_config(&no_overrides()).unwrap();
        assert_eq!(config.decimal_places, 6);
        assert_eq!(config.percentage_base, PercentageBase::Right);
        assert_eq!(config.match_threshold, Decimal::ONE);
        assert_eq!(config.diff_threshold, Decimal::new(1, 4));
    }

    #[test]
    fn flags_override() {
        let mut args = no_overrides();
        args.decimal_places = Some(2);
        args.percentage_base = Some(BaseArg::Left);
        args.match_threshold = Some(Decimal::new(5, 1));
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.decimal_places, 2);
        assert_eq!(config.percentage_base, PercentageBase::Left);
        assert_eq!(config.match_threshold, Decimal::new(5, 1));
    }

    #[test]
    fn invalid_override_rejected() {
        let mut args = no_overrides();
        args.decimal_places = Some(40);
        let err = resolve_config(&args).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_INVALID_CONFIG);
    }

    #[test]
    fn decimal_arg_parser() {
        assert_eq!(parse_decimal_arg("0.5").unwrap(), Decimal::new(5, 1));
        assert_eq!(parse_decimal_arg("1,000").unwrap(), Decimal::from(1000));
        assert!(parse_decimal_arg("abc").is_err());
    }
}
