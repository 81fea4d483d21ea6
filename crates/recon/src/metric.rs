// One-dimensional reconciliation: a baseline list of metric names looked up
// in two named-value sources.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::classify::{classify, Classification};
use crate::config::{PercentageBase, ReconConfig};
use crate::error::ReconError;
use crate::evidence::summarize_metrics;
use crate::matcher::fuzzy_lookup;
use crate::model::{CellValue, Measure, MetricRecord, MetricReport, NamedValues};
use crate::number::parse_number;

/// Reconcile every baseline name, in order, against both sources.
///
/// A name missing from a source reads as `Empty` on that side and yields
/// ERROR figures; only an invalid config fails the call.
pub fn reconcile_metrics<S: AsRef<str>>(
    baseline: &[S],
    source_a: &NamedValues,
    source_b: &NamedValues,
    config: &ReconConfig,
) -> Result<MetricReport, ReconError> {
    config.validate()?;

    log::debug!(
        "metric recon: {} baseline name(s), {} in A, {} in B",
        baseline.len(),
        source_a.len(),
        source_b.len()
    );

    let records: Vec<MetricRecord> = baseline
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let value_a = fuzzy_lookup(source_a, name).cloned().unwrap_or_default();
            let value_b = fuzzy_lookup(source_b, name).cloned().unwrap_or_default();
            compare_metric(name, value_a, value_b, config)
        })
        .collect();

    let summary = summarize_metrics(&records);
    Ok(MetricReport { records, summary })
}

/// Build the record for one name from its two raw values.
///
/// The classification uses the unrounded percentage; only the reported
/// figures are rounded.
pub fn compare_metric(
    name: &str,
    value_a: CellValue,
    value_b: CellValue,
    config: &ReconConfig,
) -> MetricRecord {
    let (difference, percentage, classification) =
        match (parse_number(&value_a), parse_number(&value_b)) {
            (Some(a), Some(b)) => compute(a, b, config),
            _ => (Measure::Error, Measure::Error, Classification::Error),
        };

    MetricRecord {
        name: name.to_string(),
        value_a,
        value_b,
        difference,
        percentage,
        classification,
    }
}

fn compute(a: Decimal, b: Decimal, config: &ReconConfig) -> (Measure, Measure, Classification) {
    let Some(raw_diff) = a.checked_sub(b) else {
        return (Measure::Error, Measure::Error, Classification::Error);
    };

    let base = match config.percentage_base {
        PercentageBase::Left => a,
        PercentageBase::Right => b,
    };
    let raw_pct = if base.is_zero() {
        None
    } else {
        raw_diff
            .checked_div(base)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
    };

    // Classified on the unrounded percentage; A == B is a match even when
    // the base is zero.
    let classification = if a == b {
        Classification::Match
    } else {
        classify(raw_pct, config.match_threshold)
    };

    let difference = Measure::Value(round_half_up(raw_diff, config.decimal_places));
    let percentage = raw_pct
        .map(|p| round_half_up(p, config.decimal_places))
        .into();

    (difference, percentage, classification)
}

/// Round half away from zero and pad to exactly `places` decimal places.
pub fn round_half_up(value: Decimal, places: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config(base: PercentageBase, places: u32, threshold: &str) -> ReconConfig {
        ReconConfig {
            decimal_places: places,
            percentage_base: base,
            match_threshold: dec(threshold),
            diff_threshold: Decimal::ZERO,
        }
    }

    fn named(pairs: &[(&str, CellValue)]) -> NamedValues {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn rounding_is_half_up_and_padded() {
        assert_eq!(round_half_up(dec("1.00005"), 4).to_string(), "1.0001");
        assert_eq!(round_half_up(dec("-1.00005"), 4).to_string(), "-1.0001");
        assert_eq!(round_half_up(dec("1"), 4).to_string(), "1.0000");
        assert_eq!(round_half_up(dec("2.5"), 0).to_string(), "3");
    }

    #[test]
    fn percentage_against_b() {
        let r = compare_metric("x", 101i64.into(), 100i64.into(), &config(PercentageBase::Right, 4, "1.0"));
        assert_eq!(r.difference.to_string(), "1.0000");
        assert_eq!(r.percentage.to_string(), "1.0000");
        assert_eq!(r.classification, Classification::Mismatch);
    }

    #[test]
    fn percentage_against_a() {
        let r = compare_metric("x", 200i64.into(), 100i64.into(), &config(PercentageBase::Left, 2, "1.0"));
        assert_eq!(r.difference.to_string(), "100.00");
        assert_eq!(r.percentage.to_string(), "50.00");
    }

    #[test]
    fn zero_base_is_error_unless_equal() {
        let c = config(PercentageBase::Right, 4, "1.0");
        let r = compare_metric("x", 100i64.into(), 0i64.into(), &c);
        assert_eq!(r.difference.to_string(), "100.0000");
        assert!(r.percentage.is_error());
        assert_eq!(r.classification, Classification::Error);

        let r = compare_metric("x", 0i64.into(), 0i64.into(), &c);
        assert!(r.percentage.is_error());
        assert_eq!(r.classification, Classification::Match);
    }

    #[test]
    fn unparsable_side_is_error() {
        let c = config(PercentageBase::Right, 4, "1.0");
        let r = compare_metric("x", CellValue::Empty, 5i64.into(), &c);
        assert!(r.difference.is_error());
        assert!(r.percentage.is_error());
        assert_eq!(r.classification, Classification::Error);

        let r = compare_metric("x", "#VALUE!".into(), 5i64.into(), &c);
        assert_eq!(r.classification, Classification::Error);
    }

    #[test]
    fn classified_on_unrounded_percentage() {
        // 0.99996 % rounds to 1.0000 for display but stays under 1 %.
        let c = config(PercentageBase::Right, 4, "1");
        let r = compare_metric("x", "100.99996".into(), 100i64.into(), &c);
        assert_eq!(r.percentage.to_string(), "1.0000");
        assert_eq!(r.classification, Classification::Match);
    }

    #[test]
    fn baseline_order_and_missing_names() {
        let a = named(&[("rev_total", 10i64.into()), ("cost", 5i64.into())]);
        let b = named(&[("cost", 5i64.into()), ("Rev Total", 10i64.into())]);
        let report = reconcile_metrics(
            &["cost", "RevTotal", "absent"],
            &a,
            &b,
            &config(PercentageBase::Right, 2, "1"),
        )
        .unwrap();

        let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["cost", "RevTotal", "absent"]);
        assert_eq!(report.records[1].value_a, CellValue::from(10i64));
        assert_eq!(report.records[1].classification, Classification::Match);
        assert_eq!(report.records[2].value_a, CellValue::Empty);
        assert_eq!(report.records[2].classification, Classification::Error);
        assert_eq!(report.summary.matched, 2);
        assert_eq!(report.summary.errors, 1);
    }

    #[test]
    fn invalid_config_fails_before_work() {
        let mut c = config(PercentageBase::Right, 2, "1");
        c.match_threshold = dec("-1");
        let err = reconcile_metrics(&["x"], &NamedValues::new(), &NamedValues::new(), &c);
        assert!(matches!(err, Err(ReconError::ConfigValidation(_))));
    }
}
