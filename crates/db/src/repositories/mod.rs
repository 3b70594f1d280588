//! Repository abstractions for data access.
//!
//! Each repository is bound to one store handle. Mutations run in a single transaction on
//! that store and write their audit entry in the same transaction.

pub mod account;
pub mod audit;
mod cash_ledger;
pub mod customer;
pub mod identity;
pub mod movement;
pub mod notice;
pub mod reconciliation;
pub mod replication;
pub mod session;
pub mod snapshot;
pub mod transfer;

pub use account::{AccountRepository, CreateAccountInput};
pub use audit::AuditRepository;
pub use customer::{
    CreateCustomerInput, CustomerRepository, OverdueCustomer, StatementLine, UpdateCustomerInput,
};
pub use identity::{
    CreateUserInput, IdentityRepository, ProfileAssignment, RegisterTenantInput,
};
pub use movement::{MovementRepository, RecordMovementInput, UpdateMovementInput};
pub use notice::{CreateNoticeInput, NoticeRepository};
pub use reconciliation::ReconciliationRepository;
pub use replication::{IdentityReplicator, ReplicationOutcome};
pub use session::{CloseSessionInput, SessionRepository, SessionSummary};
pub use snapshot::SnapshotRepository;
pub use transfer::TransferRepository;
