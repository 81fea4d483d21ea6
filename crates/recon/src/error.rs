use std::fmt;

use crate::model::Side;

/// Fatal failures. Unparsable cells and missing lookups are never errors:
/// they travel through the result as `Measure::Error` / `CellResult::Missing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (negative threshold, precision out of range).
    ConfigValidation(String),
    /// Key column count must be at least 1.
    InvalidKeyColumnCount(usize),
    /// A table has fewer columns than the configured key column count.
    TableTooNarrow {
        side: Side,
        columns: usize,
        required: usize,
    },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidKeyColumnCount(count) => {
                write!(f, "key column count must be at least 1, got {count}")
            }
            Self::TableTooNarrow { side, columns, required } => {
                write!(
                    f,
                    "table {side} has {columns} column(s), but {required} key column(s) are required"
                )
            }
        }
    }
}

impl std::error::Error for ReconError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_table_message_names_side() {
        let err = ReconError::TableTooNarrow {
            side: Side::Right,
            columns: 1,
            required: 2,
        };
        assert_eq!(
            err.to_string(),
            "table B has 1 column(s), but 2 key column(s) are required"
        );
    }
}
