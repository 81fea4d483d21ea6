// Numeric parsing for financial figures.
// Total functions: anything that is not a clean decimal is None, never a panic.

use rust_decimal::Decimal;

use crate::model::CellValue;

/// Case-insensitive placeholders that spreadsheets and exports emit in
/// place of a number.
const SENTINELS: &[&str] = &["error", "#value!", "none", "null"];

/// Widest integer part a 96-bit decimal mantissa can carry.
const MAX_DIGITS: usize = 29;

/// Most fractional digits a `Decimal` carries.
const MAX_SCALE: i64 = 28;

/// Parse a cell into an exact decimal.
///
/// - `Number` cells pass through unchanged
/// - `Text` is trimmed; spaces and comma thousands-separators are removed
/// - `error`, `#VALUE!`, `none`, `null` (any case) and blanks are unparsable
/// - Anything else must be a strict decimal literal (`-1.5`, `.5`, `2e3`)
pub fn parse_number(value: &CellValue) -> Option<Decimal> {
    match value {
        CellValue::Number(d) => Some(*d),
        CellValue::Text(s) => parse_number_str(s),
        CellValue::Empty => None,
    }
}

/// String half of [`parse_number`].
pub fn parse_number_str(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    if SENTINELS.contains(&lowered.as_str()) {
        return None;
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',' && *c != ' ').collect();
    parse_strict_decimal(&cleaned)
}

/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`
fn parse_strict_decimal(s: &str) -> Option<Decimal> {
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let exp: i64 = match exponent {
        Some(e) => {
            let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            e.parse().ok()?
        }
        None => 0,
    };

    let digits = format!("{int_part}{frac_part}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(Decimal::ZERO);
    }
    let scale = (frac_part.len() as i64).saturating_sub(exp);
    if scale < -(MAX_DIGITS as i64) {
        return None;
    }
    let (mantissa, scale) = if scale < 0 {
        let padded = format!("{digits}{}", "0".repeat(scale.unsigned_abs() as usize));
        (padded.parse::<i128>().ok()?, 0)
    } else {
        round_fraction(digits, scale)?
    };
    let scale = u32::try_from(scale).ok()?;
    let value = Decimal::try_from_i128_with_scale(mantissa, scale).ok()?;
    Some(if negative { -value } else { value })
}

/// Drop fractional digits a `Decimal` cannot hold (more than 28 places or 28
/// significant digits), rounding half away from zero. `digits` has no leading
/// zeros; integer digits are never dropped.
fn round_fraction(digits: &str, scale: i64) -> Option<(i128, i64)> {
    let len = digits.len() as i64;
    let excess = (scale - MAX_SCALE).max(len - MAX_SCALE).min(scale);
    if excess <= 0 {
        return Some((digits.parse().ok()?, scale));
    }

    let (kept, round_up) = if excess > len {
        ("", false)
    } else {
        let keep = (len - excess) as usize;
        (&digits[..keep], digits.as_bytes()[keep] >= b'5')
    };
    let base: i128 = if kept.is_empty() { 0 } else { kept.parse().ok()? };
    Some((base + i128::from(round_up), scale - excess))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn plain_numbers() {
        assert_eq!(parse_number_str("123.45"), Some(dec("123.45")));
        assert_eq!(parse_number_str("-50"), Some(dec("-50")));
        assert_eq!(parse_number_str("+7"), Some(dec("7")));
        assert_eq!(parse_number_str("0"), Some(Decimal::ZERO));
        assert_eq!(parse_number_str(".5"), Some(dec("0.5")));
        assert_eq!(parse_number_str("5."), Some(dec("5")));
    }

    #[test]
    fn thousands_separators_and_spaces() {
        assert_eq!(parse_number_str("1,000,000"), parse_number_str("1000000"));
        assert_eq!(parse_number_str("  1 234.5  "), Some(dec("1234.5")));
    }

    #[test]
    fn exponent_form() {
        assert_eq!(parse_number_str("2e3"), Some(dec("2000")));
        assert_eq!(parse_number_str("1.5E-2"), Some(dec("0.015")));
        assert_eq!(parse_number_str("1e"), None);
        assert_eq!(parse_number_str("e5"), None);
    }

    #[test]
    fn sentinels_are_unparsable() {
        for s in ["error", "ERROR", "#VALUE!", "#value!", "None", "NULL", "", "   "] {
            assert_eq!(parse_number_str(s), None, "{s:?}");
        }
    }

    #[test]
    fn junk_is_unparsable() {
        for s in ["abc", "12abc34", "N/A", "1.2.3", "--1", "NaN", "inf", "$5", "-", "."] {
            assert_eq!(parse_number_str(s), None, "{s:?}");
        }
    }

    #[test]
    fn exact_precision_kept() {
        let d = parse_number_str("0.1").unwrap() + parse_number_str("0.2").unwrap();
        assert_eq!(d, dec("0.3"));
        assert_eq!(parse_number_str("1.50").unwrap().scale(), 2);
    }

    #[test]
    fn cell_variants() {
        assert_eq!(parse_number(&CellValue::Empty), None);
        assert_eq!(parse_number(&CellValue::Number(dec("4.2"))), Some(dec("4.2")));
        assert_eq!(parse_number(&CellValue::Text("1,000".into())), Some(dec("1000")));
    }

    #[test]
    fn out_of_range_is_unparsable() {
        assert_eq!(parse_number_str("1e40"), None);
        assert_eq!(parse_number_str("1".repeat(40).as_str()), None);
    }

    #[test]
    fn extreme_exponents_do_not_overflow() {
        assert_eq!(parse_number_str("1e-9223372036854775808"), Some(Decimal::ZERO));
        assert_eq!(parse_number_str("1e9223372036854775807"), None);
        assert_eq!(parse_number_str("-0.5e-9223372036854775808"), Some(Decimal::ZERO));
    }

    #[test]
    fn excess_fraction_digits_are_rounded() {
        assert_eq!(
            parse_number_str("0.12345678901234567890123456789"),
            Some(dec("0.1234567890123456789012345679"))
        );
        assert_eq!(parse_number_str("-0.00000000000000000000000000005"), Some(dec("-0.0000000000000000000000000001")));
        assert_eq!(parse_number_str("1e-40"), Some(Decimal::ZERO));
        assert_eq!(
            parse_number_str("12345678901234567890123456.789"),
            Some(dec("12345678901234567890123456.79"))
        );
    }
}
