//! Drawer session service.
//!
//! All methods are associated functions that validate a transition and
//! return what the store has to persist.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::drawer::error::DrawerError;
use crate::drawer::types::{CloseInput, CloseOutcome, ReopenRequest, SessionState};
use crate::tenancy::Role;

/// Stateless service for drawer session transitions.
pub struct DrawerService;

impl DrawerService {
    /// Business date of `now` in the agency timezone.
    #[must_use]
    pub fn business_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
        now.with_timezone(&tz).date_naive()
    }

    /// Validate opening a new session.
    ///
    /// # Arguments
    /// * `operator` - The operator opening the session
    /// * `has_open_session` - Whether the operator already has an open session
    /// * `opening_cash` - Cash taken from the agency cash account
    /// * `agency_cash` - Current agency cash balance
    ///
    /// # Returns
    /// * `Ok(())` if the session may be created
    /// * `Err(DrawerError::AlreadyOpen)` if another session is open
    /// * `Err(DrawerError::NonPositiveOpeningCash)` if `opening_cash <= 0`
    /// * `Err(DrawerError::InsufficientAgencyCash)` if `opening_cash > agency_cash`
    pub fn open(
        operator: Uuid,
        has_open_session: bool,
        opening_cash: Decimal,
        agency_cash: Decimal,
    ) -> Result<(), DrawerError> {
        if has_open_session {
            return Err(DrawerError::AlreadyOpen(operator));
        }
        if opening_cash <= Decimal::ZERO {
            return Err(DrawerError::NonPositiveOpeningCash(opening_cash));
        }
        if opening_cash > agency_cash {
            return Err(DrawerError::InsufficientAgencyCash {
                requested: opening_cash,
                available: agency_cash,
            });
        }
        Ok(())
    }

    /// Splits owned movement amounts into `(total_in, total_out)`.
    ///
    /// `total_out` is reported as a magnitude.
    #[must_use]
    pub fn totals<I>(amounts: I) -> (Decimal, Decimal)
    where
        I: IntoIterator<Item = Decimal>,
    {
        amounts
            .into_iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(total_in, total_out), amount| {
                if amount > Decimal::ZERO {
                    (total_in + amount, total_out)
                } else {
                    (total_in, total_out + amount.abs())
                }
            })
    }

    /// `closing_cash - total_in + total_out - total_beverage_deduction [- terminal_balance]`
    #[must_use]
    pub fn cash_difference(
        closing_cash: Decimal,
        total_in: Decimal,
        total_out: Decimal,
        total_beverage_deduction: Decimal,
        terminal_balance: Option<Decimal>,
    ) -> Decimal {
        let base = closing_cash - total_in + total_out - total_beverage_deduction;
        match terminal_balance {
            Some(terminal) => base - terminal,
            None => base,
        }
    }

    /// Close an open session.
    ///
    /// # Arguments
    /// * `current` - The current session state
    /// * `input` - Operator-supplied close values
    /// * `amounts` - Signed amounts of the movements owned by the session
    ///
    /// # Returns
    /// * `Ok(CloseOutcome)` with the computed totals and difference
    /// * `Err(DrawerError::InvalidTransition)` if not open
    /// * `Err(DrawerError::NegativeDeduction)` for a negative beverage deduction
    pub fn close<I>(
        current: SessionState,
        input: &CloseInput,
        amounts: I,
    ) -> Result<CloseOutcome, DrawerError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        if current != SessionState::Open {
            return Err(DrawerError::InvalidTransition {
                from: current,
                to: SessionState::Closed,
            });
        }
        if input.total_beverage_deduction < Decimal::ZERO {
            return Err(DrawerError::NegativeDeduction);
        }

        let (total_in, total_out) = Self::totals(amounts);
        let closing_cash = input.closing_cash.unwrap_or(Decimal::ZERO);
        let cash_difference = Self::cash_difference(
            closing_cash,
            total_in,
            total_out,
            input.total_beverage_deduction,
            input.terminal_balance,
        );

        Ok(CloseOutcome {
            closing_cash,
            closing_cash_defaulted: input.closing_cash.is_none(),
            total_in,
            total_out,
            total_beverage_deduction: input.total_beverage_deduction,
            terminal_balance: input.terminal_balance,
            cash_difference,
        })
    }

    /// Verify a closed session.
    ///
    /// # Returns
    /// * `Ok(SessionState::Verified)` if the transition is valid
    /// * `Err(DrawerError::NotAuthorizedToVerify)` below manager
    /// * `Err(DrawerError::InvalidTransition)` if not closed
    pub fn verify(
        current: SessionState,
        verifier: Uuid,
        verifier_role: Role,
    ) -> Result<SessionState, DrawerError> {
        if !verifier_role.can_verify() {
            return Err(DrawerError::NotAuthorizedToVerify(verifier));
        }
        match current {
            SessionState::Closed => Ok(SessionState::Verified),
            _ => Err(DrawerError::InvalidTransition {
                from: current,
                to: SessionState::Verified,
            }),
        }
    }

    /// Reopen a closed session.
    ///
    /// Admins may reopen any closed session; the owner only on the
    /// session's own business date.
    ///
    /// # Returns
    /// * `Ok(SessionState::Open)` if the transition is valid
    /// * `Err(DrawerError::CannotReopenVerified)` from verified
    /// * `Err(DrawerError::InvalidTransition)` from open
    /// * `Err(DrawerError::NotAuthorizedToReopen)` if not owner-same-day or admin
    /// * `Err(DrawerError::AlreadyOpen)` if the owner has another open session
    pub fn reopen(
        current: SessionState,
        request: &ReopenRequest,
    ) -> Result<SessionState, DrawerError> {
        match current {
            SessionState::Verified => return Err(DrawerError::CannotReopenVerified),
            SessionState::Open => {
                return Err(DrawerError::InvalidTransition {
                    from: current,
                    to: SessionState::Open,
                });
            }
            SessionState::Closed => {}
        }

        let owner_same_day =
            request.requester == request.owner && request.session_date == request.today;
        if !(request.requester_role.can_reopen_any() || owner_same_day) {
            return Err(DrawerError::NotAuthorizedToReopen(request.requester));
        }
        if request.owner_has_open_session {
            return Err(DrawerError::AlreadyOpen(request.owner));
        }
        Ok(SessionState::Open)
    }
}
