// Two-dimensional reconciliation: two tables aligned on their first k
// columns (row key) and on B's indicator headers (columns).
//
// Emitted row order: every B row in B's order (MATCHED or ONLY_RIGHT), then
// A's unconsumed keys in the order they first appear in A (ONLY_LEFT).
//
// Only A is indexed. A repeated key in A keeps its last row; a repeated key
// in B yields one result row per B row, all matched against that A row.

use crate::classify::classify;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::summarize_table;
use crate::key::CanonicalKey;
use crate::matcher::{row_key, row_key_values, KeyIndex};
use crate::metric::round_half_up;
use crate::model::{
    CellResult, MissingSide, ReconciliationResult, ResultRow, RowOrigin, Side, Table,
};
use crate::number::parse_number;

/// One of B's indicator columns and, when A carries the same header, its
/// position in A.
#[derive(Debug, Clone, Copy)]
struct Column {
    right: usize,
    left: Option<usize>,
}

/// Reconcile `left` (A) against `right` (B) keyed on the first
/// `key_columns` columns of each.
///
/// Fails before any row is processed when `key_columns` is zero, when
/// either table is narrower than the key, or when `config` is invalid.
pub fn reconcile_tables(
    left: &Table,
    right: &Table,
    key_columns: usize,
    config: &ReconConfig,
) -> Result<ReconciliationResult, ReconError> {
    config.validate()?;
    validate_shape(left, right, key_columns)?;

    log::debug!(
        "table recon: A {}x{}, B {}x{}, {} key column(s)",
        left.rows.len(),
        left.width(),
        right.rows.len(),
        right.width(),
        key_columns
    );

    let left_index = KeyIndex::build(left, key_columns, Side::Left);

    let columns = align_columns(left, right, key_columns);
    let indicator_columns: Vec<String> = columns
        .iter()
        .map(|c| right.headers[c.right].clone())
        .collect();

    let mut consumed = vec![false; left_index.entries.len()];
    let mut rows = Vec::with_capacity(right.rows.len() + left_index.entries.len());
    let mut unmatched_right = Vec::new();

    // B-origin rows
    for right_row in 0..right.rows.len() {
        let key = row_key(right, right_row, key_columns);
        let key_values = row_key_values(right, right_row, key_columns);

        match left_index.entries.get_full(&key) {
            Some((slot, _, &left_row)) => {
                consumed[slot] = true;
                let cells = columns
                    .iter()
                    .map(|col| diff_cell(left, left_row, right, right_row, *col, config))
                    .collect();
                rows.push(ResultRow {
                    key_values,
                    origin: RowOrigin::Matched,
                    cells,
                    left_row: Some(left_row),
                    right_row: Some(right_row),
                });
            }
            None => {
                unmatched_right.push(right_row);
                rows.push(ResultRow {
                    key_values,
                    origin: RowOrigin::OnlyRight,
                    cells: vec![CellResult::Missing { side: MissingSide::Left }; columns.len()],
                    left_row: None,
                    right_row: Some(right_row),
                });
            }
        }
    }

    // Residual A rows
    let mut unmatched_left = Vec::new();
    for (slot, (key, &left_row)) in left_index.entries.iter().enumerate() {
        if consumed[slot] {
            continue;
        }
        unmatched_left.extend(source_rows(&left_index, key, left_row));

        let cells = columns
            .iter()
            .map(|col| {
                let side = if col.left.is_some() {
                    MissingSide::Right
                } else {
                    MissingSide::Both
                };
                CellResult::Missing { side }
            })
            .collect();
        rows.push(ResultRow {
            key_values: row_key_values(left, left_row, key_columns),
            origin: RowOrigin::OnlyLeft,
            cells,
            left_row: Some(left_row),
            right_row: None,
        });
    }

    unmatched_left.sort_unstable();
    let collisions = left_index.collisions;

    let summary = summarize_table(&rows);
    log::debug!(
        "table recon: {} matched, {} only in A, {} only in B",
        summary.matched_rows,
        summary.only_left_rows,
        summary.only_right_rows
    );

    Ok(ReconciliationResult {
        key_headers: right.headers[..key_columns].to_vec(),
        indicator_columns,
        rows,
        unmatched_left,
        unmatched_right,
        collisions,
        summary,
    })
}

fn validate_shape(left: &Table, right: &Table, key_columns: usize) -> Result<(), ReconError> {
    if key_columns == 0 {
        return Err(ReconError::InvalidKeyColumnCount(key_columns));
    }
    for (side, table) in [(Side::Left, left), (Side::Right, right)] {
        if table.width() < key_columns {
            return Err(ReconError::TableTooNarrow {
                side,
                columns: table.width(),
                required: key_columns,
            });
        }
    }
    Ok(())
}

/// B's non-key headers in B's order, each paired with the first A non-key
/// header of exactly the same text.
fn align_columns(left: &Table, right: &Table, key_columns: usize) -> Vec<Column> {
    (key_columns..right.width())
        .map(|r| {
            let header = &right.headers[r];
            let left_pos = left.headers[key_columns..]
                .iter()
                .position(|h| h == header)
                .map(|p| p + key_columns);
            Column {
                right: r,
                left: left_pos,
            }
        })
        .collect()
}

fn diff_cell(
    left: &Table,
    left_row: usize,
    right: &Table,
    right_row: usize,
    col: Column,
    config: &ReconConfig,
) -> CellResult {
    let Some(left_col) = col.left else {
        return CellResult::Missing { side: MissingSide::Left };
    };

    let a = parse_number(left.cell(left_row, left_col));
    let b = parse_number(right.cell(right_row, col.right));

    match (a, b) {
        (Some(a), Some(b)) => match a.checked_sub(b) {
            Some(raw) => CellResult::Diff {
                value: round_half_up(raw, config.decimal_places),
                classification: classify(Some(raw), config.diff_threshold),
            },
            // A difference outside Decimal's range cannot be reported.
            None => CellResult::Missing { side: MissingSide::Both },
        },
        (None, Some(_)) => CellResult::Missing { side: MissingSide::Left },
        (Some(_), None) => CellResult::Missing { side: MissingSide::Right },
        (None, None) => CellResult::Missing { side: MissingSide::Both },
    }
}

/// Every source row that carried `key`: the kept row plus any it overwrote.
fn source_rows(index: &KeyIndex, key: &CanonicalKey, kept_row: usize) -> Vec<usize> {
    let mut rows = vec![kept_row];
    if let Some(collision) = index.collisions.iter().find(|c| &c.key == key) {
        rows.extend_from_slice(&collision.overwritten_rows);
    }
    rows
}
