use rust_decimal::Decimal;
use serde::Serialize;

/// Outcome of comparing a difference against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Match,
    Mismatch,
    Error,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Mismatch => "mismatch",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a difference (or percentage) against `threshold`.
///
/// - `None` (an operand was unparsable) → `Error`
/// - exactly zero → `Match`, whatever the threshold
/// - `|value| < threshold` → `Match`
/// - `|value| >= threshold` → `Mismatch`
pub fn classify(value: Option<Decimal>, threshold: Decimal) -> Classification {
    match value {
        None => Classification::Error,
        Some(v) if v.is_zero() => Classification::Match,
        Some(v) if v.abs() < threshold => Classification::Match,
        Some(_) => Classification::Mismatch,
    }
}
