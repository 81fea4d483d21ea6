use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::error::ReconError;

/// Largest scale a `Decimal` can carry.
pub const MAX_DECIMAL_PLACES: u32 = 28;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Per-call reconciliation settings. Every field is required: the engine has
/// no built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    /// Rounding precision for differences and percentages (round half up).
    pub decimal_places: u32,
    /// Which operand the percentage is computed against.
    pub percentage_base: PercentageBase,
    /// Percentage threshold for metric classification, e.g. `1.0` = 1 %.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub match_threshold: Decimal,
    /// Absolute threshold for table cell classification.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub diff_threshold: Decimal,
}

// ---------------------------------------------------------------------------
// Percentage base
// ---------------------------------------------------------------------------

/// Denominator of `difference / base * 100`.
///
/// Both conventions exist in the field (one tool divides by B, another by A),
/// so callers must choose explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageBase {
    #[serde(alias = "a", alias = "A")]
    Left,
    #[serde(alias = "b", alias = "B")]
    Right,
}

impl std::fmt::Display for PercentageBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ReconError::ConfigValidation(format!(
                "decimal_places must be at most {MAX_DECIMAL_PLACES}, got {}",
                self.decimal_places
            )));
        }

        if self.match_threshold.is_sign_negative() && !self.match_threshold.is_zero() {
            return Err(ReconError::ConfigValidation(format!(
                "match_threshold must be non-negative, got {}",
                self.match_threshold
            )));
        }

        if self.diff_threshold.is_sign_negative() && !self.diff_threshold.is_zero() {
            return Err(ReconError::ConfigValidation(format!(
                "diff_threshold must be non-negative, got {}",
                self.diff_threshold
            )));
        }

        Ok(())
    }
}

/// Accept TOML integers, floats, or decimal strings, converting floats through
/// their shortest text form so `1.01` is exactly `1.01`.
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let text = match Raw::deserialize(deserializer)? {
        Raw::Int(i) => return Ok(Decimal::from(i)),
        Raw::Float(f) => f.to_string(),
        Raw::Text(s) => s,
    };
    crate::number::parse_number_str(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid decimal value '{text}'")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
