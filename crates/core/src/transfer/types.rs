//! Transfer domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a financial account represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Physical cash held by the agency.
    Cash,
    /// Bank account.
    Bank,
    /// Online gaming platform balance.
    Online,
    /// Receivable from customers.
    CustomerCredits,
    /// Balance with sub-agents.
    AgentBalance,
    /// Expenses.
    Expense,
    /// Revenue.
    Revenue,
    /// Owner withdrawals.
    OwnerWithdrawal,
    /// Owner deposits.
    OwnerDeposit,
    /// Anything else.
    Other,
}

impl AccountKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Online => "online",
            Self::CustomerCredits => "customer_credits",
            Self::AgentBalance => "agent_balance",
            Self::Expense => "expense",
            Self::Revenue => "revenue",
            Self::OwnerWithdrawal => "owner_withdrawal",
            Self::OwnerDeposit => "owner_deposit",
            Self::Other => "other",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "bank" => Some(Self::Bank),
            "online" => Some(Self::Online),
            "customer_credits" => Some(Self::CustomerCredits),
            "agent_balance" => Some(Self::AgentBalance),
            "expense" => Some(Self::Expense),
            "revenue" => Some(Self::Revenue),
            "owner_withdrawal" => Some(Self::OwnerWithdrawal),
            "owner_deposit" => Some(Self::OwnerDeposit),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Accounting category an account of this kind belongs to by default.
    #[must_use]
    pub const fn default_category(&self) -> AccountCategory {
        match self {
            Self::Cash | Self::Bank | Self::Online => AccountCategory::Liquidity,
            Self::CustomerCredits => AccountCategory::Receivable,
            Self::AgentBalance | Self::OwnerWithdrawal | Self::OwnerDeposit | Self::Other => {
                AccountCategory::Payable
            }
            Self::Expense => AccountCategory::Cost,
            Self::Revenue => AccountCategory::Revenue,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accounting category of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    /// Cash and cash equivalents.
    Liquidity,
    /// Amounts owed to the agency.
    Receivable,
    /// Amounts owed by the agency.
    Payable,
    /// Income.
    Revenue,
    /// Costs.
    Cost,
    /// Taxes.
    Tax,
}

impl AccountCategory {
    /// Returns the string representation of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Liquidity => "liquidity",
            Self::Receivable => "receivable",
            Self::Payable => "payable",
            Self::Revenue => "revenue",
            Self::Cost => "cost",
            Self::Tax => "tax",
        }
    }

    /// Parses a category from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "liquidity" => Some(Self::Liquidity),
            "receivable" => Some(Self::Receivable),
            "payable" => Some(Self::Payable),
            "revenue" => Some(Self::Revenue),
            "cost" => Some(Self::Cost),
            "tax" => Some(Self::Tax),
            _ => None,
        }
    }
}

impl fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of account transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// Money entering one account from outside.
    Deposit,
    /// Money leaving one account to outside.
    Withdrawal,
    /// Money moving between two accounts.
    Transfer,
    /// Balance set directly to a new value.
    DirectAdjustment,
}

impl TransferKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
            Self::DirectAdjustment => "direct_adjustment",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(Self::Deposit),
            "withdrawal" => Some(Self::Withdrawal),
            "transfer" => Some(Self::Transfer),
            "direct_adjustment" => Some(Self::DirectAdjustment),
            _ => None,
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed event affecting the agency cash balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashMovementKind {
    /// Opening cash taken for a drawer session.
    SessionOpen,
    /// Closing cash returned by a drawer session.
    SessionClose,
    /// Recompute performed when a session is verified.
    SessionVerify,
    /// Transfer into the cash account.
    TransferIn,
    /// Transfer out of the cash account.
    TransferOut,
    /// Manual deposit.
    ManualDeposit,
    /// Manual withdrawal.
    ManualWithdrawal,
    /// Correction (direct adjustment or undo).
    Correction,
    /// First balance recorded by the system.
    SystemInit,
}

impl CashMovementKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SessionOpen => "session_open",
            Self::SessionClose => "session_close",
            Self::SessionVerify => "session_verify",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::ManualDeposit => "manual_deposit",
            Self::ManualWithdrawal => "manual_withdrawal",
            Self::Correction => "correction",
            Self::SystemInit => "system_init",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "session_open" => Some(Self::SessionOpen),
            "session_close" => Some(Self::SessionClose),
            "session_verify" => Some(Self::SessionVerify),
            "transfer_in" => Some(Self::TransferIn),
            "transfer_out" => Some(Self::TransferOut),
            "manual_deposit" => Some(Self::ManualDeposit),
            "manual_withdrawal" => Some(Self::ManualWithdrawal),
            "correction" => Some(Self::Correction),
            "system_init" => Some(Self::SystemInit),
            _ => None,
        }
    }

    /// Cash event recorded when a transfer of `kind` touches the cash account.
    ///
    /// `is_source` tells which side of the transfer the cash account is on.
    #[must_use]
    pub const fn for_transfer(kind: TransferKind, is_source: bool) -> Self {
        match kind {
            TransferKind::Transfer if is_source => Self::TransferOut,
            TransferKind::Transfer => Self::TransferIn,
            TransferKind::Deposit => Self::ManualDeposit,
            TransferKind::Withdrawal => Self::ManualWithdrawal,
            TransferKind::DirectAdjustment => Self::Correction,
        }
    }

    /// Like [`Self::for_transfer`], except that a direct adjustment on a cash account with no
    /// trail yet records its starting balance.
    #[must_use]
    pub const fn for_posting(kind: TransferKind, is_source: bool, first_posting: bool) -> Self {
        match kind {
            TransferKind::DirectAdjustment if first_posting => Self::SystemInit,
            _ => Self::for_transfer(kind, is_source),
        }
    }

    /// Cash events produced by drawer session postings.
    #[must_use]
    pub const fn is_session_posting(&self) -> bool {
        matches!(
            self,
            Self::SessionOpen | Self::SessionClose | Self::SessionVerify
        )
    }
}

impl fmt::Display for CashMovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Balance of one side before and after a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePlan {
    /// Balance before.
    pub pre: Decimal,
    /// Balance after.
    pub post: Decimal,
}

impl SidePlan {
    /// Signed change applied to this side.
    #[must_use]
    pub fn delta(&self) -> Decimal {
        self.post - self.pre
    }
}

/// Everything a transfer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPlan {
    /// Transfer kind.
    pub kind: TransferKind,
    /// Magnitude moved.
    pub amount: Decimal,
    /// Source side, when money leaves an account.
    pub source: Option<SidePlan>,
    /// Destination side, when money enters an account.
    pub destination: Option<SidePlan>,
}

/// A financial account every tenant store starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAccount {
    /// Account name (unique per store).
    pub name: &'static str,
    /// Account kind.
    pub kind: AccountKind,
    /// Description.
    pub description: &'static str,
}

/// Accounts created by default in every tenant store.
pub const DEFAULT_ACCOUNTS: [DefaultAccount; 9] = [
    DefaultAccount {
        name: "Cassa Agenzia",
        kind: AccountKind::Cash,
        description: "Contante fisico presente in agenzia",
    },
    DefaultAccount {
        name: "Conto Corrente Principale",
        kind: AccountKind::Bank,
        description: "Conto corrente aziendale principale",
    },
    DefaultAccount {
        name: "Conto Gioco Online",
        kind: AccountKind::Online,
        description: "Saldo disponibile su piattaforme di gioco online",
    },
    DefaultAccount {
        name: "Saldo Clienti",
        kind: AccountKind::CustomerCredits,
        description: "Crediti verso clienti calcolati dai saldi",
    },
    DefaultAccount {
        name: "Saldo Agent",
        kind: AccountKind::AgentBalance,
        description: "Crediti/debiti verso agent",
    },
    DefaultAccount {
        name: "Spese Generali",
        kind: AccountKind::Expense,
        description: "Spese di gestione e amministrazione",
    },
    DefaultAccount {
        name: "Ricavi Operativi",
        kind: AccountKind::Revenue,
        description: "Ricavi generati dall'attivita",
    },
    DefaultAccount {
        name: "Prelievi Soci",
        kind: AccountKind::OwnerWithdrawal,
        description: "Prelievi effettuati dai soci",
    },
    DefaultAccount {
        name: "Versamenti Soci",
        kind: AccountKind::OwnerDeposit,
        description: "Versamenti effettuati dai soci",
    },
];
