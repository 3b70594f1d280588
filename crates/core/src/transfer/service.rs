//! Transfer service for pre/post balance math.

use rust_decimal::Decimal;

use crate::transfer::error::TransferError;
use crate::transfer::types::{SidePlan, TransferKind, TransferPlan};

/// Stateless service computing what each transfer writes.
pub struct TransferService;

impl TransferService {
    fn require_positive(amount: Decimal) -> Result<(), TransferError> {
        if amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount(amount));
        }
        Ok(())
    }

    /// Move `amount` from source to destination.
    ///
    /// # Errors
    /// * `TransferError::InvalidAmount` if `amount <= 0`
    pub fn transfer(
        source_balance: Decimal,
        destination_balance: Decimal,
        amount: Decimal,
    ) -> Result<TransferPlan, TransferError> {
        Self::require_positive(amount)?;
        Ok(TransferPlan {
            kind: TransferKind::Transfer,
            amount,
            source: Some(SidePlan {
                pre: source_balance,
                post: source_balance - amount,
            }),
            destination: Some(SidePlan {
                pre: destination_balance,
                post: destination_balance + amount,
            }),
        })
    }

    /// Money entering one account.
    ///
    /// # Errors
    /// * `TransferError::InvalidAmount` if `amount <= 0`
    pub fn deposit(balance: Decimal, amount: Decimal) -> Result<TransferPlan, TransferError> {
        Self::require_positive(amount)?;
        Ok(TransferPlan {
            kind: TransferKind::Deposit,
            amount,
            source: None,
            destination: Some(SidePlan {
                pre: balance,
                post: balance + amount,
            }),
        })
    }

    /// Money leaving one account.
    ///
    /// # Errors
    /// * `TransferError::InvalidAmount` if `amount <= 0`
    pub fn withdraw(balance: Decimal, amount: Decimal) -> Result<TransferPlan, TransferError> {
        Self::require_positive(amount)?;
        Ok(TransferPlan {
            kind: TransferKind::Withdrawal,
            amount,
            source: Some(SidePlan {
                pre: balance,
                post: balance - amount,
            }),
            destination: None,
        })
    }

    /// Set an account directly from `old` to `new`.
    ///
    /// A decrease records the account as the source side, anything else as
    /// the destination side.
    #[must_use]
    pub fn direct_adjustment(old: Decimal, new: Decimal) -> TransferPlan {
        let delta = new - old;
        let side = SidePlan { pre: old, post: new };
        let (source, destination) = if delta < Decimal::ZERO {
            (Some(side), None)
        } else {
            (None, Some(side))
        };
        TransferPlan {
            kind: TransferKind::DirectAdjustment,
            amount: delta.abs(),
            source,
            destination,
        }
    }

    /// Balances each side returns to when the transfer is deleted.
    ///
    /// Returns `(source_pre, destination_pre)`.
    #[must_use]
    pub fn restore(
        source: Option<SidePlan>,
        destination: Option<SidePlan>,
    ) -> (Option<Decimal>, Option<Decimal>) {
        (source.map(|s| s.pre), destination.map(|d| d.pre))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::types::CashMovementKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transfer_moves_amount() {
        let plan = TransferService::transfer(dec!(200), dec!(50), dec!(100)).unwrap();
        assert_eq!(plan.source, Some(SidePlan { pre: dec!(200), post: dec!(100) }));
        assert_eq!(plan.destination, Some(SidePlan { pre: dec!(50), post: dec!(150) }));
        assert_eq!(
            TransferService::restore(plan.source, plan.destination),
            (Some(dec!(200)), Some(dec!(50)))
        );
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert_eq!(
            TransferService::transfer(dec!(1), dec!(1), dec!(0)),
            Err(TransferError::InvalidAmount(dec!(0)))
        );
        assert!(TransferService::deposit(dec!(1), dec!(-5)).is_err());
        assert!(TransferService::withdraw(dec!(1), dec!(-5)).is_err());
    }

    #[test]
    fn test_first_cash_adjustment_is_system_init() {
        let kind = TransferKind::DirectAdjustment;
        assert_eq!(CashMovementKind::for_posting(kind, false, true), CashMovementKind::SystemInit);
        assert_eq!(CashMovementKind::for_posting(kind, true, false), CashMovementKind::Correction);
        assert_eq!(
            CashMovementKind::for_posting(TransferKind::Transfer, false, true),
            CashMovementKind::TransferIn
        );
    }

    #[test]
    fn test_direct_adjustment_decrease_is_source() {
        let plan = TransferService::direct_adjustment(dec!(500), dec!(400));
        assert_eq!(plan.kind, TransferKind::DirectAdjustment);
        assert_eq!(plan.amount, dec!(100));
        assert_eq!(plan.source, Some(SidePlan { pre: dec!(500), post: dec!(400) }));
        assert!(plan.destination.is_none());
    }

    #[test]
    fn test_direct_adjustment_increase_is_destination() {
        let plan = TransferService::direct_adjustment(dec!(400), dec!(520));
        assert_eq!(plan.amount, dec!(120));
        assert!(plan.source.is_none());
        assert_eq!(plan.destination.map(|d| d.delta()), Some(dec!(120)));
    }

    #[test]
    fn test_single_sided_plans() {
        let deposit = TransferService::deposit(dec!(0), dec!(500)).unwrap();
        assert_eq!(deposit.destination.map(|d| d.post), Some(dec!(500)));
        let withdrawal = TransferService::withdraw(dec!(500), dec!(600)).unwrap();
        assert_eq!(withdrawal.source.map(|s| s.post), Some(dec!(-100)));
    }
}
