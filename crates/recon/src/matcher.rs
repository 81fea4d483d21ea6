// Lookup and indexing by normalized key.
//
// The two reconcilers resolve collisions differently and both policies are
// observable in output:
// - metric lookup: exact name first, then the FIRST normalized match in the
//   source's own order
// - table index: LAST row wins for a repeated key, at the position where the
//   key first appeared

use indexmap::IndexMap;

use crate::key::{normalize_key, normalize_name, CanonicalKey};
use crate::model::{CellValue, KeyCollision, NamedValues, Side, Table};

/// Find `name` in `source`: exact match, else the first entry whose
/// normalized name equals the normalized target. Linear on a miss.
pub fn fuzzy_lookup<'a>(source: &'a NamedValues, name: &str) -> Option<&'a CellValue> {
    if let Some(value) = source.get(name) {
        return Some(value);
    }

    let target = normalize_name(name);
    source
        .iter()
        .find(|(key, _)| normalize_name(key) == target)
        .map(|(_, value)| value)
}

/// Row index of one table keyed by the canonical form of its first k cells.
#[derive(Debug, Clone)]
pub struct KeyIndex {
    /// Canonical key → row index of the last row carrying it. Iteration
    /// order is the order in which each key first appeared.
    pub entries: IndexMap<CanonicalKey, usize>,
    pub collisions: Vec<KeyCollision>,
}

impl KeyIndex {
    pub fn build(table: &Table, key_columns: usize, side: Side) -> Self {
        let mut all_rows: IndexMap<CanonicalKey, Vec<usize>> = IndexMap::new();

        for row_idx in 0..table.rows.len() {
            let key = row_key(table, row_idx, key_columns);
            all_rows.entry(key).or_default().push(row_idx);
        }

        let mut entries = IndexMap::with_capacity(all_rows.len());
        let mut collisions = Vec::new();

        for (key, mut rows) in all_rows {
            // Non-empty: every entry was created by a push.
            let Some(kept_row) = rows.pop() else { continue };
            if !rows.is_empty() {
                log::debug!(
                    "table {side}: key [{key}] appears {} times, keeping row {kept_row}",
                    rows.len() + 1
                );
                collisions.push(KeyCollision {
                    side,
                    key: key.clone(),
                    kept_row,
                    overwritten_rows: rows,
                });
            }
            entries.insert(key, kept_row);
        }

        Self { entries, collisions }
    }
}

/// Canonical key of one row; missing trailing cells count as blank.
pub fn row_key(table: &Table, row_idx: usize, key_columns: usize) -> CanonicalKey {
    normalize_key((0..key_columns).map(|col| table.cell(row_idx, col)))
}

/// Raw key cells of one row, for display.
pub fn row_key_values(table: &Table, row_idx: usize, key_columns: usize) -> Vec<CellValue> {
    (0..key_columns).map(|col| table.cell(row_idx, col).clone()).collect()
}
