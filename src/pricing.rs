use thiserror::Error;

use crate::models::OrderItem;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid item price/quantity")]
pub struct PricingError;

/// Total of an order in integer cents: `price × quantity` is summed over all
/// items and the sum is rounded to the nearest cent once.
pub fn compute_total_cents(items: &[OrderItem]) -> Result<i64, PricingError> {
    let total = items.iter().try_fold(0f64, |total, item| {
        let line = item.price * f64::from(item.quantity);
        if !line.is_finite() || line < 0.0 {
            return Err(PricingError);
        }
        Ok(total + line)
    })?;

    let cents = (total * 100.0).round();
    if !cents.is_finite() || cents >= i64::MAX as f64 {
        return Err(PricingError);
    }
    Ok(cents as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, quantity: u32) -> OrderItem {
        OrderItem {
            name: "x".into(),
            price,
            quantity,
        }
    }

    #[test]
    fn sums_lines_in_cents() {
        assert_eq!(compute_total_cents(&[item(10.0, 2)]), Ok(2000));
        assert_eq!(compute_total_cents(&[item(19.99, 3), item(0.5, 1)]), Ok(6047));
    }

    #[test]
    fn rounds_the_summed_total_once() {
        // 0.1 * 3 * 100 is 30.000000000000004 in binary floating point.
        assert_eq!(compute_total_cents(&[item(0.1, 3)]), Ok(30));
        assert_eq!(compute_total_cents(&[item(0.005, 1)]), Ok(1));
        assert_eq!(compute_total_cents(&[item(1.004, 1)]), Ok(100));
        assert_eq!(compute_total_cents(&[item(0.125, 3)]), Ok(38));
        // 12.5 cents per line would round to 13 each and give 39.
        assert_eq!(
            compute_total_cents(&[item(0.125, 1), item(0.125, 1), item(0.125, 1)]),
            Ok(38)
        );
    }

    #[test]
    fn zero_priced_items_are_free() {
        assert_eq!(compute_total_cents(&[item(0.0, 5)]), Ok(0));
    }

    #[test]
    fn rejects_non_finite_and_negative_lines() {
        assert_eq!(compute_total_cents(&[item(f64::NAN, 1)]), Err(PricingError));
        assert_eq!(compute_total_cents(&[item(f64::INFINITY, 1)]), Err(PricingError));
        assert_eq!(compute_total_cents(&[item(-1.0, 1)]), Err(PricingError));
    }

    #[test]
    fn rejects_totals_that_overflow() {
        assert_eq!(compute_total_cents(&[item(1e300, 1)]), Err(PricingError));
        assert_eq!(
            compute_total_cents(&[item(5e16, 1), item(5e16, 1)]),
            Err(PricingError)
        );
    }
}
