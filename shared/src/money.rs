//! Money calculation utilities using rust_decimal for precision
//!
//! Monetary values travel as `f64` on the wire but every recomputation and
//! comparison goes through `Decimal`. Prices round to 2 decimal places,
//! quantities to 3 (the finest granularity the receipt data carries, e.g.
//! weighed produce sold as 0.436 kg).

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const PRICE_DECIMAL_PLACES: u32 = 2;

/// Quantities carry up to 3 decimal places
const QUANTITY_DECIMAL_PLACES: u32 = 3;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Tolerance for quantity comparisons (0.001)
pub const QUANTITY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Convert f64 to Decimal for calculation
///
/// Input values should be validated as finite at the boundary. If
/// NaN/Infinity somehow reaches here, logs an error and returns ZERO to
/// avoid silent data corruption in monetary calculations.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for the wire, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(PRICE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        // SAFETY: Decimal rounded to 2dp is always within f64 range
        .expect("Decimal rounded to 2dp is always representable as f64")
}

/// Round a price to currency precision (2 decimal places, half-up)
#[inline]
pub fn round_price(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Round a quantity to 3 decimal places
#[inline]
pub fn round_quantity(value: f64) -> f64 {
    to_decimal(value)
        .round_dp_with_strategy(
            QUANTITY_DECIMAL_PLACES,
            RoundingStrategy::MidpointAwayFromZero,
        )
        .to_f64()
        .expect("Decimal rounded to 3dp is always representable as f64")
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

/// Compare two quantities for equality (within 0.001 tolerance)
pub fn quantity_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < QUANTITY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let a = 0.1_f64;
        let b = 0.2_f64;
        let sum_f64 = a + b;

        // f64 fails
        assert_ne!(sum_f64, 0.3);

        // Decimal succeeds
        let sum_dec = to_decimal(a) + to_decimal(b);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_accumulation_precision() {
        // Sum 0.01 one thousand times
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn test_round_price_half_up() {
        assert_eq!(round_price(1.005), 1.01);
        assert_eq!(round_price(1.004), 1.0);
        assert_eq!(round_price(12.5), 12.5);
    }

    #[test]
    fn test_round_quantity() {
        assert_eq!(round_quantity(0.4364), 0.436);
        assert_eq!(round_quantity(0.4365), 0.437);
        assert_eq!(round_quantity(1.0), 1.0);
    }

    #[test]
    fn test_money_eq_tolerance() {
        assert!(money_eq(1.50, 1.50));
        assert!(money_eq(1.501, 1.509));
        assert!(!money_eq(1.50, 1.51));
        assert!(!money_eq(1.50, 1.49));
    }

    #[test]
    fn test_quantity_eq_tolerance() {
        assert!(quantity_eq(0.436, 0.436));
        assert!(!quantity_eq(0.436, 0.437));
    }

    #[test]
    fn test_non_finite_defaults_to_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
    }
}
