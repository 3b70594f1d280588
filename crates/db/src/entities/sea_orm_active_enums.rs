//! String-backed enumerations stored by the ledger tables.
//!
//! Each enum mirrors a `distinta-core` type and converts both ways, so repositories
//! can hand core values straight to the rules engine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use distinta_core::audit::AuditAction as CoreAuditAction;
use distinta_core::drawer::SessionState as CoreSessionState;
use distinta_core::movement::{MovementKind as CoreMovementKind, RiskRating as CoreRiskRating};
use distinta_core::notice::{NoticeKind as CoreNoticeKind, NoticeState as CoreNoticeState};
use distinta_core::reconciliation::{
    CheckState as CoreCheckState, LiquidityTrend as CoreLiquidityTrend,
};
use distinta_core::tenancy::Role;
use distinta_core::transfer::{
    AccountCategory as CoreAccountCategory, AccountKind as CoreAccountKind,
    CashMovementKind as CoreCashMovementKind, TransferKind as CoreTransferKind,
};

/// Generates `From` conversions between a stored enum and its core twin.
macro_rules! mirror_enum {
    ($stored:ident, $core:ty, [$($variant:ident),+ $(,)?]) => {
        impl From<$core> for $stored {
            fn from(value: $core) -> Self {
                match value {
                    $(<$core>::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$stored> for $core {
            fn from(value: $stored) -> Self {
                match value {
                    $($stored::$variant => Self::$variant,)+
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "operator")]
    Operator,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "admin")]
    Admin,
}

mirror_enum!(UserRole, Role, [Operator, Manager, Admin]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum RiskRating {
    #[sea_orm(string_value = "A")]
    A,
    #[sea_orm(string_value = "B")]
    B,
    #[sea_orm(string_value = "C")]
    C,
    #[sea_orm(string_value = "D")]
    D,
    #[sea_orm(string_value = "E")]
    E,
}

mirror_enum!(RiskRating, CoreRiskRating, [A, B, C, D, E]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    #[sea_orm(string_value = "bet_slip")]
    BetSlip,
    #[sea_orm(string_value = "top_up")]
    TopUp,
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    #[sea_orm(string_value = "credit_collection")]
    CreditCollection,
    #[sea_orm(string_value = "debt_payment")]
    DebtPayment,
}

mirror_enum!(
    MovementKind,
    CoreMovementKind,
    [BetSlip, TopUp, Withdrawal, CreditCollection, DebtPayment]
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    #[sea_orm(string_value = "warning")]
    Warning,
    #[sea_orm(string_value = "reminder")]
    Reminder,
    #[sea_orm(string_value = "information")]
    Information,
}

mirror_enum!(NoticeKind, CoreNoticeKind, [Warning, Reminder, Information]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum NoticeState {
    #[sea_orm(string_value = "unread")]
    Unread,
    #[sea_orm(string_value = "read")]
    Read,
}

mirror_enum!(NoticeState, CoreNoticeState, [Unread, Read]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "verified")]
    Verified,
}

mirror_enum!(SessionState, CoreSessionState, [Open, Closed, Verified]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "online")]
    Online,
    #[sea_orm(string_value = "customer_credits")]
    CustomerCredits,
    #[sea_orm(string_value = "agent_balance")]
    AgentBalance,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "owner_withdrawal")]
    OwnerWithdrawal,
    #[sea_orm(string_value = "owner_deposit")]
    OwnerDeposit,
    #[sea_orm(string_value = "other")]
    Other,
}

mirror_enum!(
    AccountKind,
    CoreAccountKind,
    [
        Cash,
        Bank,
        Online,
        CustomerCredits,
        AgentBalance,
        Expense,
        Revenue,
        OwnerWithdrawal,
        OwnerDeposit,
        Other,
    ]
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    #[sea_orm(string_value = "liquidity")]
    Liquidity,
    #[sea_orm(string_value = "receivable")]
    Receivable,
    #[sea_orm(string_value = "payable")]
    Payable,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "cost")]
    Cost,
    #[sea_orm(string_value = "tax")]
    Tax,
}

mirror_enum!(
    AccountCategory,
    CoreAccountCategory,
    [Liquidity, Receivable, Payable, Revenue, Cost, Tax]
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    #[sea_orm(string_value = "transfer")]
    Transfer,
    #[sea_orm(string_value = "direct_adjustment")]
    DirectAdjustment,
}

mirror_enum!(
    TransferKind,
    CoreTransferKind,
    [Deposit, Withdrawal, Transfer, DirectAdjustment]
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
pub enum CashMovementKind {
    #[sea_orm(string_value = "session_open")]
    SessionOpen,
    #[sea_orm(string_value = "session_close")]
    SessionClose,
    #[sea_orm(string_value = "session_verify")]
    SessionVerify,
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
    #[sea_orm(string_value = "manual_deposit")]
    ManualDeposit,
    #[sea_orm(string_value = "manual_withdrawal")]
    ManualWithdrawal,
    #[sea_orm(string_value = "correction")]
    Correction,
    #[sea_orm(string_value = "system_init")]
    SystemInit,
}

mirror_enum!(
    CashMovementKind,
    CoreCashMovementKind,
    [
        SessionOpen,
        SessionClose,
        SessionVerify,
        TransferIn,
        TransferOut,
        ManualDeposit,
        ManualWithdrawal,
        Correction,
        SystemInit,
    ]
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "balanced")]
    Balanced,
    #[sea_orm(string_value = "discrepancy")]
    Discrepancy,
    #[sea_orm(string_value = "shortfall")]
    Shortfall,
}

mirror_enum!(
    CheckState,
    CoreCheckState,
    [InProgress, Balanced, Discrepancy, Shortfall]
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    #[sea_orm(string_value = "create")]
    Create,
    #[sea_orm(string_value = "update")]
    Update,
    #[sea_orm(string_value = "delete")]
    Delete,
    #[sea_orm(string_value = "status_change")]
    StatusChange,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "reopen")]
    Reopen,
}

mirror_enum!(
    AuditAction,
    CoreAuditAction,
    [Create, Update, Delete, StatusChange, Payment, Reopen]
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum LiquidityTrend {
    #[sea_orm(string_value = "shortfall")]
    Shortfall,
    #[sea_orm(string_value = "surplus")]
    Surplus,
    #[sea_orm(string_value = "stable")]
    Stable,
}

mirror_enum!(LiquidityTrend, CoreLiquidityTrend, [Shortfall, Surplus, Stable]);
