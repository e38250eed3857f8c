//! Money and quantity arithmetic shared by the costing, invoicing, and
//! inventory components. All currency amounts are [`Decimal`] and every
//! derived amount is rounded to two decimal places, midpoint away from
//! zero, before it is persisted.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::entities::job_item::DiscountType;
use crate::errors::{ServiceError, ServiceResult};

/// Reject a negative money/quantity input with a field-named validation
/// error. `validator` cannot range-check [`Decimal`] fields, so services
/// call this for each decimal input instead.
pub fn require_non_negative(field: &str, amount: Decimal) -> ServiceResult<()> {
    if amount < Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

/// Reject a non-positive amount (payments, stock movement magnitudes).
pub fn require_positive(field: &str, amount: Decimal) -> ServiceResult<()> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "{field} must be positive"
        )));
    }
    Ok(())
}

/// Round a currency amount to 2 decimal places.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamp a derived amount at zero. Discounts and over-payments may push a
/// raw figure negative; stored totals and balances never are.
pub fn clamp_non_negative(amount: Decimal) -> Decimal {
    if amount < Decimal::ZERO {
        Decimal::ZERO
    } else {
        amount
    }
}

/// `amount * rate / 100`, rounded. Used for tax and percentage discounts.
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    round_money(amount * rate / Decimal::ONE_HUNDRED)
}

/// Line total for a service item: `quantity * unit_price` minus the
/// discount, floored at zero. A percent discount applies to the subtotal;
/// a fixed discount is subtracted as-is.
pub fn line_total(
    quantity: Decimal,
    unit_price: Decimal,
    discount: Decimal,
    discount_type: DiscountType,
) -> Decimal {
    let subtotal = quantity * unit_price;
    let discount_amount = match discount_type {
        DiscountType::Percent => subtotal * discount / Decimal::ONE_HUNDRED,
        DiscountType::Fixed => discount,
    };
    round_money(clamp_non_negative(subtotal - discount_amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_midpoint_away_from_zero() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(-10.005)), dec!(-10.01));
    }

    #[test]
    fn clamps_negative_amounts() {
        assert_eq!(clamp_non_negative(dec!(-0.01)), Decimal::ZERO);
        assert_eq!(clamp_non_negative(dec!(12.34)), dec!(12.34));
    }

    #[test]
    fn percent_of_whole_rate() {
        assert_eq!(percent_of(dec!(5000), dec!(10)), dec!(500));
        assert_eq!(percent_of(dec!(199.99), dec!(7.5)), dec!(15.00));
    }

    #[test]
    fn percent_discount_line_total() {
        // quantity=2, unit_price=100, 10% discount -> 180
        assert_eq!(
            line_total(dec!(2), dec!(100), dec!(10), DiscountType::Percent),
            dec!(180)
        );
    }

    #[test]
    fn fixed_discount_line_total() {
        assert_eq!(
            line_total(dec!(1), dec!(250), dec!(50), DiscountType::Fixed),
            dec!(200)
        );
    }

    #[test]
    fn line_total_never_negative() {
        assert_eq!(
            line_total(dec!(1), dec!(20), dec!(50), DiscountType::Fixed),
            Decimal::ZERO
        );
        assert_eq!(
            line_total(dec!(0), dec!(100), dec!(10), DiscountType::Percent),
            Decimal::ZERO
        );
    }
}
