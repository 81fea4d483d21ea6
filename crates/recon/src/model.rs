use std::fmt;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::classify::Classification;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single cell as delivered by a reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Number(Decimal),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// Text cell; blank or whitespace-only input becomes `Empty`.
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }

    /// Numeric cell from a spreadsheet float, converted through its shortest
    /// decimal representation so `0.1` stays `0.1`.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::Text(value.to_string());
        }
        let repr = value.to_string();
        match crate::number::parse_number_str(&repr) {
            Some(d) => Self::Number(d),
            None => Self::Text(repr),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Raw string form, used for key normalization and display.
    pub fn as_raw_string(&self) -> String {
        match self {
            Self::Number(d) => d.to_string(),
            Self::Text(s) => s.clone(),
            Self::Empty => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(d) => write!(f, "{d}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Empty => Ok(()),
        }
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Named values in the source's native order (header row → value row).
pub type NamedValues = IndexMap<String, CellValue>;

/// A fully materialized table. Header and row order are preserved through
/// reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Cell at (row, col); ragged rows read as `Empty` past their end.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// Which input table. `Left` is table/source A, `Right` is B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "A"),
            Self::Right => write!(f, "B"),
        }
    }
}

/// Which table an error cell blames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSide {
    Left,
    Right,
    Both,
}

impl fmt::Display for MissingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "A"),
            Self::Right => write!(f, "B"),
            Self::Both => write!(f, "A+B"),
        }
    }
}

// ---------------------------------------------------------------------------
// Metric reconciliation
// ---------------------------------------------------------------------------

/// A computed figure, or ERROR when an operand was unparsable or the
/// divisor was zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Value(Decimal),
    Error,
}

impl Measure {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Value(d) => Some(*d),
            Self::Error => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl From<Option<Decimal>> for Measure {
    fn from(value: Option<Decimal>) -> Self {
        value.map(Self::Value).unwrap_or(Self::Error)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(d) => write!(f, "{d}"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(d) => Serialize::serialize(d, serializer),
            Self::Error => serializer.serialize_str("ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRecord {
    pub name: String,
    pub value_a: CellValue,
    pub value_b: CellValue,
    /// `A - B`, rounded half up to the configured decimal places.
    pub difference: Measure,
    /// `difference / base * 100`, rounded like `difference`.
    pub percentage: Measure,
    /// Taken from the unrounded percentage, so a record showing exactly the
    /// threshold (e.g. `1.0000`) can still be a match.
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricSummary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricReport {
    pub records: Vec<MetricRecord>,
    pub summary: MetricSummary,
}

// ---------------------------------------------------------------------------
// Table reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrigin {
    Matched,
    OnlyLeft,
    OnlyRight,
}

impl RowOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::OnlyLeft => "only_left",
            Self::OnlyRight => "only_right",
        }
    }
}

impl fmt::Display for RowOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellResult {
    /// `A − B`, rounded to the configured decimal places.
    Diff {
        value: Decimal,
        classification: Classification,
    },
    /// The value is absent, blank, or unparsable on `side`.
    Missing { side: MissingSide },
}

impl CellResult {
    pub fn classification(&self) -> Classification {
        match self {
            Self::Diff { classification, .. } => *classification,
            Self::Missing { .. } => Classification::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub key_values: Vec<CellValue>,
    pub origin: RowOrigin,
    pub cells: Vec<CellResult>,
    /// Source row index in table A, when the row came from or matched A.
    pub left_row: Option<usize>,
    /// Source row index in table B, when the row came from B.
    pub right_row: Option<usize>,
}

/// Rows of one table that normalized to the same key. The last row wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCollision {
    pub side: Side,
    pub key: crate::key::CanonicalKey,
    pub kept_row: usize,
    pub overwritten_rows: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub matched_rows: usize,
    pub only_left_rows: usize,
    pub only_right_rows: usize,
    pub cell_matches: usize,
    pub cell_mismatches: usize,
    pub cell_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// Table B's first k headers.
    pub key_headers: Vec<String>,
    /// Table B's non-key headers, in B's order.
    pub indicator_columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    /// Table A rows never matched by any B row.
    pub unmatched_left: Vec<usize>,
    /// Table B rows with no counterpart in A.
    pub unmatched_right: Vec<usize>,
    pub collisions: Vec<KeyCollision>,
    pub summary: TableSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn blank_text_is_empty() {
        assert_eq!(CellValue::text("   "), CellValue::Empty);
        assert_eq!(CellValue::text(""), CellValue::Empty);
        assert_eq!(CellValue::text(" x "), CellValue::Text(" x ".into()));
        assert_eq!(CellValue::from(None::<&str>), CellValue::Empty);
    }

    #[test]
    fn float_cells_keep_short_decimal_form() {
        assert_eq!(
            CellValue::from_f64(0.1),
            CellValue::Number(Decimal::from_str("0.1").unwrap())
        );
        assert_eq!(CellValue::from_f64(1000000.0), CellValue::from(1000000i64));
        assert!(matches!(CellValue::from_f64(f64::NAN), CellValue::Text(_)));
    }

    #[test]
    fn ragged_rows_read_as_empty() {
        let t = Table::new(
            vec!["k".into(), "a".into()],
            vec![vec![CellValue::from("x")]],
        );
        assert_eq!(t.cell(0, 1), &CellValue::Empty);
        assert_eq!(t.cell(5, 0), &CellValue::Empty);
    }

    #[test]
    fn measure_serializes_error_tag() {
        let json = serde_json::to_string(&Measure::Error).unwrap();
        assert_eq!(json, "\"ERROR\"");
        let json = serde_json::to_string(&Measure::Value(Decimal::from_str("1.50").unwrap())).unwrap();
        assert_eq!(json, "\"1.50\"");
    }

    #[test]
    fn cell_result_tags() {
        let cell = CellResult::Missing { side: MissingSide::Left };
        assert_eq!(cell.classification(), Classification::Error);
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, r#"{"kind":"missing","side":"left"}"#);
    }
}
