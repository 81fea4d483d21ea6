//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | Success                                                    |
//! | 1    | Mismatches or ERROR cells present (only with `--strict`)   |
//! | 2    | CLI usage error (bad args, 0-based row/column numbers)     |
//! | 3    | I/O error (missing file, unreadable sheet, write failure)  |
//! | 4    | Parse error (malformed TOML, JSON serialization)           |
//! | 5    | Invalid config (negative threshold, precision too large)   |
//! | 6    | Input shape (key column count vs table width)              |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError` or the relevant command

use xlcompare_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// `--strict` run found at least one MISMATCH or ERROR.
/// Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_MISMATCH: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Reading an input or writing an output failed.
pub const EXIT_IO: u8 = 3;

/// Config TOML could not be parsed, or output could not be serialized.
pub const EXIT_PARSE: u8 = 4;

/// Config parsed but failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Tables do not fit the requested key: zero key columns, or a table
/// narrower than the key.
pub const EXIT_INPUT_SHAPE: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) => EXIT_PARSE,
        ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::InvalidKeyColumnCount(_) | ReconError::TableTooNarrow { .. } => EXIT_INPUT_SHAPE,
    }
}
