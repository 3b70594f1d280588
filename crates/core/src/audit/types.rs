//! Audit domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Entity created.
    Create,
    /// Entity modified.
    Update,
    /// Entity deleted.
    Delete,
    /// State machine transition.
    StatusChange,
    /// Settlement of a movement.
    Payment,
    /// Drawer session reopened.
    Reopen,
}

impl AuditAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::StatusChange => "status_change",
            Self::Payment => "payment",
            Self::Reopen => "reopen",
        }
    }

    /// Parses an action from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "status_change" => Some(Self::StatusChange),
            "payment" => Some(Self::Payment),
            "reopen" => Some(Self::Reopen),
            _ => None,
        }
    }

    /// Description used when the caller supplies none.
    #[must_use]
    pub fn default_description(&self, entity: &EntityRef) -> String {
        let verb = match self {
            Self::Create => "Creazione",
            Self::Update => "Modifica",
            Self::Delete => "Eliminazione",
            Self::StatusChange => "Cambio di stato",
            Self::Payment => "Pagamento",
            Self::Reopen => "Riapertura",
        };
        format!("{verb} di {} #{}", entity.kind.label(), entity.id)
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of entity an audit entry can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Identity record (shared).
    User,
    /// Tenant descriptor (shared).
    Tenant,
    /// User to tenant link (shared).
    UserProfile,
    /// Customer.
    Customer,
    /// Customer movement.
    Movement,
    /// Customer notice.
    Notice,
    /// Cash drawer session.
    CashSession,
    /// Financial account.
    FinancialAccount,
    /// Account transfer.
    AccountTransfer,
    /// Reconciliation check.
    ReconciliationCheck,
    /// Periodic balance snapshot.
    BalanceSnapshot,
}

impl EntityKind {
    /// Returns the string representation stored in the audit log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Tenant => "tenant",
            Self::UserProfile => "user_profile",
            Self::Customer => "customer",
            Self::Movement => "movement",
            Self::Notice => "notice",
            Self::CashSession => "cash_session",
            Self::FinancialAccount => "financial_account",
            Self::AccountTransfer => "account_transfer",
            Self::ReconciliationCheck => "reconciliation_check",
            Self::BalanceSnapshot => "balance_snapshot",
        }
    }

    /// Parses a kind from its stored representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "tenant" => Some(Self::Tenant),
            "user_profile" => Some(Self::UserProfile),
            "customer" => Some(Self::Customer),
            "movement" => Some(Self::Movement),
            "notice" => Some(Self::Notice),
            "cash_session" => Some(Self::CashSession),
            "financial_account" => Some(Self::FinancialAccount),
            "account_transfer" => Some(Self::AccountTransfer),
            "reconciliation_check" => Some(Self::ReconciliationCheck),
            "balance_snapshot" => Some(Self::BalanceSnapshot),
            _ => None,
        }
    }

    /// Human-readable label used in generated descriptions.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::User => "Utente",
            Self::Tenant => "Agenzia",
            Self::UserProfile => "Profilo Utente",
            Self::Customer => "Cliente",
            Self::Movement => "Movimento",
            Self::Notice => "Comunicazione",
            Self::CashSession => "Distinta Cassa",
            Self::FinancialAccount => "Conto Finanziario",
            Self::AccountTransfer => "Movimento Conti",
            Self::ReconciliationCheck => "Verifica Cassa",
            Self::BalanceSnapshot => "Bilancio Periodico",
        }
    }

    /// Entity kinds that always live in the shared store.
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        matches!(self, Self::User | Self::Tenant | Self::UserProfile)
    }
}

/// Polymorphic reference to an audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity kind.
    pub kind: EntityKind,
    /// Entity id.
    pub id: Uuid,
}

impl EntityRef {
    /// Creates a new reference.
    #[must_use]
    pub fn new(kind: EntityKind, id: impl Into<Uuid>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// An audit entry ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    /// Acting identity.
    pub actor_id: Uuid,
    /// Action performed.
    pub action: AuditAction,
    /// Affected entity.
    pub entity: EntityRef,
    /// Free-text description.
    pub description: String,
    /// State before the action.
    pub before: Option<Value>,
    /// State after the action.
    pub after: Option<Value>,
}

impl AuditEntry {
    /// Builds an entry, filling in the default description when none is given.
    #[must_use]
    pub fn new(
        actor_id: Uuid,
        action: AuditAction,
        entity: EntityRef,
        description: Option<String>,
    ) -> Self {
        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| action.default_description(&entity));
        Self {
            actor_id,
            action,
            entity,
            description,
            before: None,
            after: None,
        }
    }

    /// Attaches before/after snapshots.
    #[must_use]
    pub fn with_snapshots(mut self, before: Option<Value>, after: Option<Value>) -> Self {
        self.before = before;
        self.after = after;
        self
    }
}
