//! Currency conversion arithmetic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always round to the target currency's decimal places
//! - Use banker's rounding (round half to even)
//! - Store both original and converted amounts

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places used for stored amounts unless a currency says otherwise.
pub const DEFAULT_DECIMAL_PLACES: u32 = 2;

/// The result of one currency conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// The amount expressed in the target currency, rounded.
    pub converted_amount: Decimal,
    /// The rate that was applied (target units per source unit).
    pub rate: Decimal,
}

impl Conversion {
    /// Builds a conversion result by applying `rate` to `amount`.
    #[must_use]
    pub fn from_rate(amount: Decimal, rate: Decimal, decimal_places: u32) -> Self {
        Self {
            converted_amount: convert_amount(amount, rate, decimal_places),
            rate,
        }
    }

    /// The identity conversion for same-currency amounts.
    #[must_use]
    pub fn identity(amount: Decimal, decimal_places: u32) -> Self {
        Self {
            converted_amount: amount
                .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven),
            rate: Decimal::ONE,
        }
    }
}

/// Converts an amount using the given exchange rate.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal, decimal_places: u32) -> Decimal {
    (amount * rate).round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_amount() {
        // 100 USD * 0.92 = 92.00 EUR
        assert_eq!(convert_amount(dec!(100), dec!(0.92), 2), dec!(92.00));
    }

    #[test]
    fn test_convert_rounds_to_decimal_places() {
        // 19.99 * 1.0825 = 21.639175 -> 21.64
        assert_eq!(convert_amount(dec!(19.99), dec!(1.0825), 2), dec!(21.64));
    }

    #[test]
    fn test_bankers_rounding() {
        // Round half to even: 2.5 -> 2, 3.5 -> 4
        assert_eq!(convert_amount(dec!(1), dec!(2.5), 0), dec!(2));
        assert_eq!(convert_amount(dec!(1), dec!(3.5), 0), dec!(4));
    }

    #[test]
    fn test_conversion_from_rate() {
        let conversion = Conversion::from_rate(dec!(250), dec!(15800), 0);
        assert_eq!(conversion.converted_amount, dec!(3950000));
        assert_eq!(conversion.rate, dec!(15800));
    }

    #[test]
    fn test_identity_conversion() {
        let conversion = Conversion::identity(dec!(10.005), 2);
        assert_eq!(conversion.rate, Decimal::ONE);
        // Half to even at the cent boundary.
        assert_eq!(conversion.converted_amount, dec!(10.00));
    }
}
