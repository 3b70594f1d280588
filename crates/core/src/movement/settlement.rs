//! Settlement planning.
//!
//! Settling a movement never edits it: a compensating movement with the
//! opposite cash direction is booked in the operator's open session, both
//! rows are flagged settled, and the original keeps its kind and amount.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::movement::error::MovementError;
use crate::movement::types::MovementKind;

/// The movement being settled, as loaded from the store.
#[derive(Debug, Clone)]
pub struct SettlementSubject {
    /// Movement id.
    pub movement_id: Uuid,
    /// Movement kind.
    pub kind: MovementKind,
    /// Stored (already signed) amount.
    pub amount: Decimal,
    /// Current settlement flag.
    pub settled: bool,
    /// Business date the movement was booked on.
    pub booked_on: NaiveDate,
}

/// The compensating movement to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    /// Kind of the compensating movement.
    pub kind: MovementKind,
    /// Signed amount of the compensating movement.
    pub amount: Decimal,
    /// Generated note referencing the original.
    pub note: String,
    /// Back-reference to the original movement.
    pub origin_movement_id: Uuid,
}

/// Stateless settlement rules.
pub struct SettlementService;

impl SettlementService {
    /// Chooses the compensating kind from the sign of the original amount.
    ///
    /// Negative originals (bet slip, top-up, debt payment) are collected;
    /// positive originals (withdrawal, credit collection) are paid out.
    #[must_use]
    pub fn compensating_kind(amount: Decimal) -> MovementKind {
        if amount < Decimal::ZERO {
            MovementKind::CreditCollection
        } else {
            MovementKind::DebtPayment
        }
    }

    /// Plans the compensating movement for `subject`.
    ///
    /// # Errors
    /// * `MovementError::AlreadySettled` if the subject is already settled
    pub fn plan(subject: &SettlementSubject) -> Result<SettlementPlan, MovementError> {
        if subject.settled {
            return Err(MovementError::AlreadySettled(subject.movement_id));
        }

        let kind = Self::compensating_kind(subject.amount);
        let amount = kind.normalize(subject.amount);
        let note = format!(
            "{} per saldo movimento #{} ({}) del {}",
            kind.label(),
            subject.movement_id,
            subject.kind.label(),
            subject.booked_on.format("%d/%m/%Y")
        );

        Ok(SettlementPlan {
            kind,
            amount,
            note,
            origin_movement_id: subject.movement_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn subject(kind: MovementKind, amount: Decimal, settled: bool) -> SettlementSubject {
        SettlementSubject {
            movement_id: Uuid::nil(),
            kind,
            amount: kind.normalize(amount),
            settled,
            booked_on: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        }
    }

    #[test]
    fn test_bet_slip_is_collected() {
        let plan = SettlementService::plan(&subject(MovementKind::BetSlip, dec!(30), false)).unwrap();
        assert_eq!(plan.kind, MovementKind::CreditCollection);
        assert_eq!(plan.amount, dec!(30));
        assert_eq!(plan.origin_movement_id, Uuid::nil());
    }

    #[test]
    fn test_top_up_is_collected() {
        let plan = SettlementService::plan(&subject(MovementKind::TopUp, dec!(20), false)).unwrap();
        assert_eq!(plan.kind, MovementKind::CreditCollection);
        assert_eq!(plan.amount, dec!(20));
    }

    #[test]
    fn test_withdrawal_is_paid_out() {
        let plan =
            SettlementService::plan(&subject(MovementKind::Withdrawal, dec!(25), false)).unwrap();
        assert_eq!(plan.kind, MovementKind::DebtPayment);
        assert_eq!(plan.amount, dec!(-25));
    }

    #[test]
    fn test_note_references_original() {
        let plan =
            SettlementService::plan(&subject(MovementKind::Withdrawal, dec!(25), false)).unwrap();
        assert_eq!(
            plan.note,
            format!(
                "Pagamento debito per saldo movimento #{} (Prelievo) del 14/03/2026",
                Uuid::nil()
            )
        );
    }

    #[test]
    fn test_settled_subject_is_rejected() {
        let result = SettlementService::plan(&subject(MovementKind::BetSlip, dec!(30), true));
        assert_eq!(result, Err(MovementError::AlreadySettled(Uuid::nil())));
    }
}
