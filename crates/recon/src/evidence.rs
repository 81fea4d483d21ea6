use crate::classify::Classification;
use crate::model::{MetricRecord, MetricSummary, ResultRow, RowOrigin, TableSummary};

/// Count metric records per classification.
pub fn summarize_metrics(records: &[MetricRecord]) -> MetricSummary {
    let mut summary = MetricSummary {
        total: records.len(),
        ..MetricSummary::default()
    };

    for r in records {
        match r.classification {
            Classification::Match => summary.matched += 1,
            Classification::Mismatch => summary.mismatched += 1,
            Classification::Error => summary.errors += 1,
        }
    }

    summary
}

/// Count result rows per origin and cells per classification.
pub fn summarize_table(rows: &[ResultRow]) -> TableSummary {
    let mut summary = TableSummary::default();

    for row in rows {
        match row.origin {
            RowOrigin::Matched => summary.matched_rows += 1,
            RowOrigin::OnlyLeft => summary.only_left_rows += 1,
            RowOrigin::OnlyRight => summary.only_right_rows += 1,
        }

        for cell in &row.cells {
            match cell.classification() {
                Classification::Match => summary.cell_matches += 1,
                Classification::Mismatch => summary.cell_mismatches += 1,
                Classification::Error => summary.cell_errors += 1,
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellResult, CellValue, Measure, MissingSide};
    use rust_decimal::Decimal;

    fn record(classification: Classification) -> MetricRecord {
        MetricRecord {
            name: "m".into(),
            value_a: CellValue::Empty,
            value_b: CellValue::Empty,
            difference: Measure::Error,
            percentage: Measure::Error,
            classification,
        }
    }

    fn row(origin: RowOrigin, cells: Vec<CellResult>) -> ResultRow {
        ResultRow {
            key_values: vec![CellValue::from("k")],
            origin,
            cells,
            left_row: None,
            right_row: None,
        }
    }

    #[test]
    fn metric_counts() {
        let records = vec![
            record(Classification::Match),
            record(Classification::Match),
            record(Classification::Mismatch),
            record(Classification::Error),
        ];
        let summary = summarize_metrics(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.mismatched, 1);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn table_counts() {
        let diff = |classification| CellResult::Diff {
            value: Decimal::ZERO,
            classification,
        };
        let missing = CellResult::Missing {
            side: MissingSide::Left,
        };
        let rows = vec![
            row(RowOrigin::Matched, vec![diff(Classification::Match), missing]),
            row(RowOrigin::Matched, vec![diff(Classification::Mismatch), missing]),
            row(RowOrigin::OnlyRight, vec![missing, missing]),
            row(RowOrigin::OnlyLeft, vec![missing, missing]),
        ];
        let summary = summarize_table(&rows);
        assert_eq!(summary.matched_rows, 2);
        assert_eq!(summary.only_left_rows, 1);
        assert_eq!(summary.only_right_rows, 1);
        assert_eq!(summary.cell_matches, 1);
        assert_eq!(summary.cell_mismatches, 1);
        assert_eq!(summary.cell_errors, 6);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(summarize_metrics(&[]), MetricSummary::default());
        assert_eq!(summarize_table(&[]), TableSummary::default());
    }
}
