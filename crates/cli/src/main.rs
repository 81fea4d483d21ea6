// xlcompare CLI - reconcile metric sheets and keyed tables from CSV/Excel files

mod exit_codes;
mod export;
mod recon;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;

use exit_codes::{recon_exit_code, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use xlcompare_recon::ReconError;

#[derive(Parser)]
#[command(name = "xlcompare")]
#[command(about = "Reconcile two spreadsheets: named metrics or keyed tables")]
#[command(version)]
struct Cli {
    /// More logging on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare named metrics from two sources against a baseline list
    #[command(after_help = "\
Examples:
  xlcompare metrics --base names.xlsx --left a.xlsx --right b.xlsx
  xlcompare metrics --base names.csv --left a.csv --right b.csv --percentage-base a
  xlcompare metrics --base names.xlsx --base-column 2 --left a.xlsx --right b.xlsx \\
      --match-threshold 0.5 --xlsx result.xlsx --strict

Layout:
  baseline   one metric name per row in --base-column, from --base-start-row down
  A and B    metric names across --header-row, values across --data-row

Classification (per metric):
  match      |percentage| < match threshold
  mismatch   |percentage| >= match threshold
  error      a value is blank or not numeric, or the percentage base is zero")]
    Metrics(recon::MetricsArgs),

    /// Compare two tables row by row on their leading key columns
    #[command(after_help = "\
Examples:
  xlcompare table --left a.xlsx --right b.xlsx --keys 2
  xlcompare table --left a.csv --right b.csv -k 1 --diff-threshold 0.01 --format json
  xlcompare table --left a.xlsx --left-sheet Q3 --right b.xlsx --xlsx diff.xlsx

Matching:
  keys       trimmed, lower-cased, whitespace and brackets removed: '华北 (地区)' = '华北地区'
  columns    B's non-key headers, matched exactly against A's
  duplicates in A the last row with a given key wins; every B row is reported

Each cell holds A - B, or ERR(A|B|A+B) naming the side that is blank or unparsable.")]
    Table(recon::TableArgs),

    /// Check a reconciliation config file
    #[command(after_help = "\
Example config:
  decimal_places  = 6
  percentage_base = \"b\"     # or \"a\"
  match_threshold = 1.0     # percent, metrics
  diff_threshold  = 0.0001  # absolute, table cells")]
    Validate {
        /// Config file (.toml)
        config: PathBuf,
    },

    /// Write a demo dataset to try the other commands on
    Sample {
        /// Output directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Metrics(args) => recon::cmd_metrics(args),
        Commands::Table(args) => recon::cmd_table(args),
        Commands::Validate { config } => recon::cmd_validate(config),
        Commands::Sample { dir } => recon::cmd_sample(dir),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::ConfigParse(_) => {
                Some("run `xlcompare validate <config>` to check the file".to_string())
            }
            ReconError::InvalidKeyColumnCount(_) | ReconError::TableTooNarrow { .. } => {
                Some("check --keys and --header-row".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
