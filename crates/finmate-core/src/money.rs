//! Validation of caller-supplied monetary amounts.

use rust_decimal::Decimal;

use finmate_domain::{to_cents, MAX_AMOUNT};

use crate::{CoreError, CoreResult};

/// Rounds `amount` to cents, requiring it to be above zero and within [`MAX_AMOUNT`].
pub fn positive_amount(what: &str, amount: Decimal) -> CoreResult<Decimal> {
    let amount = to_cents(amount);
    if amount <= Decimal::ZERO {
        return Err(CoreError::InvalidArgument(format!(
            "{what} must be greater than zero"
        )));
    }
    within_limit(what, amount)
}

/// Rounds `amount` to cents, requiring it to be zero or more and within [`MAX_AMOUNT`].
pub fn non_negative_amount(what: &str, amount: Decimal) -> CoreResult<Decimal> {
    let amount = to_cents(amount);
    if amount < Decimal::ZERO {
        return Err(CoreError::InvalidArgument(format!("{what} cannot be negative")));
    }
    within_limit(what, amount)
}

fn within_limit(what: &str, amount: Decimal) -> CoreResult<Decimal> {
    if amount > MAX_AMOUNT {
        Err(CoreError::InvalidArgument(format!(
            "{what} cannot exceed {MAX_AMOUNT}"
        )))
    } else {
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amounts_are_rounded_to_cents() {
        assert_eq!(positive_amount("budget", dec!(19.999)).unwrap(), dec!(20.00));
        assert_eq!(non_negative_amount("expense", dec!(0)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn sub_cent_positive_amount_is_rejected() {
        let err = positive_amount("deposit", dec!(0.004)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(ref msg) if msg.contains("greater than zero")));
    }

    #[test]
    fn amounts_above_ceiling_are_rejected() {
        assert!(positive_amount("goal target", MAX_AMOUNT).is_ok());
        let err = non_negative_amount("income", MAX_AMOUNT + dec!(0.01)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(ref msg) if msg.contains("cannot exceed")));
    }
}
