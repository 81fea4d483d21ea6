// Key normalization for fuzzy row and metric-name matching.
//
// Normalization is lossy on purpose: "地区_B", "地区 B" and "地区B" collapse to
// one key, and so can two genuinely different labels. Callers decide what a
// collision means (see matcher.rs).

use serde::Serialize;

use crate::model::CellValue;

/// Glyphs deleted during normalization. Bracket contents are kept.
const STRIPPED: &[char] = &[' ', '_', '(', ')', '[', ']', '（', '）', '【', '】'];

/// Ordered tuple of normalized key components. Used for equality only,
/// never for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalKey(Vec<String>);

impl CanonicalKey {
    pub fn components(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" | "))
    }
}

/// Normalize one raw component: delete spaces, underscores and bracket
/// glyphs, trim, then case-fold.
///
/// Trimming after the deletion keeps the function idempotent for inputs like
/// `"_\tx"`, where removing the underscore exposes leading whitespace.
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Normalize an ordered list of key cells. Position is significant.
pub fn normalize_key<'a, I>(components: I) -> CanonicalKey
where
    I: IntoIterator<Item = &'a CellValue>,
{
    CanonicalKey(
        components
            .into_iter()
            .map(|cell| normalize_name(&cell.as_raw_string()))
            .collect(),
    )
}

/// Normalize raw strings directly (baseline names, header labels).
pub fn normalize_strs<I, S>(components: I) -> CanonicalKey
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    CanonicalKey(components.into_iter().map(|s| normalize_name(s.as_ref())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscore_space_and_brackets_collapse() {
        assert_eq!(normalize_strs(["地区_B"]), normalize_strs(["地区B"]));
        assert_eq!(normalize_strs(["指标(2)"]), normalize_strs(["指标_2"]));
        assert_eq!(normalize_strs(["a b"]), normalize_strs(["a_b"]));
        assert_eq!(normalize_strs(["a_b"]), normalize_strs(["ab"]));
        assert_eq!(normalize_strs(["地区(C)"]), normalize_strs(["地区【C】"]));
        assert_eq!(normalize_strs(["类型（Z）"]), normalize_strs(["类型Z"]));
        assert_eq!(normalize_strs(["[x]"]), normalize_strs(["X"]));
    }

    #[test]
    fn case_folds_and_trims() {
        assert_eq!(normalize_name("  Revenue_Total "), "revenuetotal");
        assert_eq!(normalize_name("REVENUE total"), "revenuetotal");
    }

    #[test]
    fn component_order_is_significant() {
        assert_ne!(normalize_strs(["a", "b"]), normalize_strs(["b", "a"]));
    }

    #[test]
    fn blanks_and_numbers() {
        let key = normalize_key(&[CellValue::Empty, CellValue::from(42i64), CellValue::text("  ")]);
        assert_eq!(key.components(), &["", "42", ""]);
    }

    #[test]
    fn idempotent() {
        for raw in ["地区_B", " A (b) [c] ", "x__y", "Ü_ber", "（全角）【括号】"] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn distinct_labels_can_collide() {
        // "a_b" and "ab" are different labels in a source but one key here.
        assert_eq!(normalize_name("a_b"), normalize_name("(ab)"));
    }
}
