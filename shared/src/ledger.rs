//! Remaining-stock arithmetic for circle ledgers
//!
//! A ledger row tracks how much of one food or medicine a circle still has.
//! Consumption reports draw from it; the remaining quantity must never go
//! below zero.

use rust_decimal::Decimal;
use thiserror::Error;

/// Rejections raised by ledger arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Quantity must be greater than 0, got {0}")]
    NonPositiveQuantity(i32),

    #[error("Insufficient stock: {remaining} remaining, {requested} requested")]
    InsufficientStock {
        remaining: Decimal,
        requested: Decimal,
    },
}

fn positive(quantity: i32) -> Result<Decimal, LedgerError> {
    if quantity <= 0 {
        return Err(LedgerError::NonPositiveQuantity(quantity));
    }
    Ok(Decimal::from(quantity))
}

/// Draw `quantity` from `remaining`
pub fn consume(remaining: Decimal, quantity: i32) -> Result<Decimal, LedgerError> {
    let requested = positive(quantity)?;
    if remaining < requested {
        return Err(LedgerError::InsufficientStock {
            remaining,
            requested,
        });
    }
    Ok(remaining - requested)
}

/// Re-charge a report whose quantity changes from `old_quantity` to `new_quantity`.
///
/// Only the difference touches the ledger: growing a report draws the extra
/// amount, shrinking it gives the surplus back.
pub fn adjust(
    remaining: Decimal,
    old_quantity: i32,
    new_quantity: i32,
) -> Result<Decimal, LedgerError> {
    positive(new_quantity)?;
    let diff = Decimal::from(new_quantity) - Decimal::from(old_quantity);
    let after = remaining - diff;
    if after < Decimal::ZERO {
        return Err(LedgerError::InsufficientStock {
            remaining,
            requested: diff,
        });
    }
    Ok(after)
}

/// Return `quantity` to `remaining`
pub fn release(remaining: Decimal, quantity: i32) -> Result<Decimal, LedgerError> {
    Ok(remaining + positive(quantity)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_consume_decrements() {
        assert_eq!(consume(dec(100), 30), Ok(dec(70)));
    }

    #[test]
    fn test_consume_everything_leaves_zero() {
        assert_eq!(consume(dec(30), 30), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_consume_more_than_remaining_rejected() {
        assert_eq!(
            consume(dec(50), 60),
            Err(LedgerError::InsufficientStock {
                remaining: dec(50),
                requested: dec(60),
            })
        );
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        assert_eq!(consume(dec(50), 0), Err(LedgerError::NonPositiveQuantity(0)));
        assert_eq!(adjust(dec(50), 5, -1), Err(LedgerError::NonPositiveQuantity(-1)));
        assert_eq!(release(dec(50), 0), Err(LedgerError::NonPositiveQuantity(0)));
    }

    #[test]
    fn test_adjust_growing_report() {
        // 30 -> 50 draws 20 more
        assert_eq!(adjust(dec(70), 30, 50), Ok(dec(50)));
    }

    #[test]
    fn test_adjust_shrinking_report() {
        // 50 -> 10 gives 40 back
        assert_eq!(adjust(dec(50), 50, 10), Ok(dec(90)));
    }

    #[test]
    fn test_adjust_beyond_remaining_rejected() {
        assert!(matches!(
            adjust(dec(10), 5, 20),
            Err(LedgerError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_release_fractional_remaining() {
        assert_eq!(release(Decimal::new(125, 1), 3), Ok(Decimal::new(155, 1)));
    }

    proptest! {
        #[test]
        fn prop_consume_never_goes_negative(remaining in 0i64..10_000, quantity in 1i32..10_000) {
            match consume(dec(remaining), quantity) {
                Ok(after) => {
                    prop_assert!(after >= Decimal::ZERO);
                    prop_assert_eq!(after, dec(remaining) - Decimal::from(quantity));
                }
                Err(_) => prop_assert!(i64::from(quantity) > remaining),
            }
        }

        #[test]
        fn prop_adjust_matches_release_then_consume(
            remaining in 0i64..10_000,
            old in 1i32..1_000,
            new in 1i32..1_000,
        ) {
            let direct = adjust(dec(remaining), old, new);
            let via_release = release(dec(remaining), old).and_then(|r| consume(r, new));
            prop_assert_eq!(direct.is_ok(), via_release.is_ok());
            if let (Ok(a), Ok(b)) = (direct, via_release) {
                prop_assert_eq!(a, b);
            }
        }
    }
}
