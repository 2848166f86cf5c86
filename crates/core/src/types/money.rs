//! Minor-unit money conversion.
//!
//! Payment processors take charge amounts as integers in the currency's
//! minor unit (e.g. cents). Receipts are computed with [`Decimal`] in the
//! major unit; the conversion formats the amount to two decimal places and
//! strips the separator, so `12.5` becomes `1250`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Convert a major-unit amount to an integer count of minor units.
///
/// The amount is rounded half-up to two decimal places first, matching how
/// the value appears on a receipt.
///
/// Returns `None` for negative amounts and amounts too large to fit in
/// `i64` minor units.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    if amount.is_sign_negative() {
        return None;
    }
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}").replace('.', "").parse::<i64>().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_whole_amount() {
        assert_eq!(to_minor_units(dec("1250")), Some(125_000));
    }

    #[test]
    fn test_fractional_amount() {
        assert_eq!(to_minor_units(dec("12.5")), Some(1250));
        assert_eq!(to_minor_units(dec("9.99")), Some(999));
    }

    #[test]
    fn test_zero() {
        assert_eq!(to_minor_units(Decimal::ZERO), Some(0));
    }

    #[test]
    fn test_rounds_to_two_places() {
        assert_eq!(to_minor_units(dec("1.005")), Some(101));
        assert_eq!(to_minor_units(dec("1.0049")), Some(100));
    }

    #[test]
    fn test_negative_is_rejected() {
        assert_eq!(to_minor_units(dec("-1")), None);
    }
}
