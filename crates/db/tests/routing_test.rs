//! Integration tests for the Tenant Router and identity mirroring.

mod common;

use common::Harness;
use distinta_core::audit::EntityKind;
use distinta_core::movement::MovementKind;
use distinta_core::tenancy::{Role, StoreTarget};
use distinta_db::StoreError;
use distinta_db::api;
use distinta_db::entities::users;
use distinta_db::repositories::{CreateCustomerInput, RecordMovementInput, ReplicationOutcome};
use distinta_shared::types::{CustomerId, UserId};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

async fn mirror(harness: &Harness, key: &str, user: UserId) -> Option<users::Model> {
    users::Entity::find_by_id(user.into_inner())
        .one(harness.tenant(key).await.conn())
        .await
        .expect("Failed to query mirror")
}

#[tokio::test]
async fn test_unassigned_user_routes_to_shared_store() {
    let harness = Harness::with_tenants(&["goldbet_db"]).await;
    let user = harness.create_user("ospite", Role::Operator).await;

    let store = api::resolve_store(&harness.router, UserId::from_uuid(user.id))
        .await
        .expect("Failed to resolve");
    assert_eq!(store.target(), &StoreTarget::Shared);
    assert_eq!(store.label(), "shared");
}

#[tokio::test]
async fn test_shared_store_accepts_ledger_writes() {
    let harness = Harness::with_tenants(&[]).await;
    let user = UserId::from_uuid(harness.create_user("ospite", Role::Admin).await.id);
    let store = api::resolve_store(&harness.router, user)
        .await
        .expect("Failed to resolve");
    assert_eq!(store.target(), &StoreTarget::Shared);

    let customer = api::create_customer(&store, CreateCustomerInput::named("Bianchi", "Anna"), user)
        .await
        .expect("Failed to create customer on shared store");
    api::record_movement(
        &store,
        RecordMovementInput {
            customer_id: CustomerId::from_uuid(customer.id),
            kind: MovementKind::BetSlip,
            amount: dec!(15),
            session_id: None,
            occurred_at: None,
            notes: None,
        },
        user,
    )
    .await
    .expect("Failed to record movement on shared store");

    let accounts = api::seed_default_accounts(&store, user)
        .await
        .expect("Failed to seed accounts on shared store");
    assert!(!accounts.is_empty());
    assert_eq!(
        api::recompute_balance(&store, CustomerId::from_uuid(customer.id))
            .await
            .expect("Failed to recompute"),
        dec!(-15)
    );
}

#[tokio::test]
async fn test_assigned_user_routes_to_tenant_and_is_mirrored() {
    let harness = Harness::with_tenants(&["goldbet_db", "better_db"]).await;
    let goldbet = harness.register_tenant("2015103", "goldbet_db").await;
    let user = harness.tenant_user("mario", Role::Operator, goldbet).await;

    let store = api::resolve_store(&harness.router, user)
        .await
        .expect("Failed to resolve");
    assert_eq!(store.target(), &StoreTarget::Tenant("goldbet_db".to_string()));

    let copy = mirror(&harness, "goldbet_db", user).await.expect("mirror missing");
    let original = harness.identities().get_user(user).await.expect("user missing");
    assert_eq!(copy.username, original.username);
    assert_eq!(copy.role, original.role);
    assert!(mirror(&harness, "better_db", user).await.is_none());

    // Shared entity kinds ignore the assignment.
    let shared = harness
        .router
        .resolve_for_entity(user, EntityKind::Tenant)
        .await
        .expect("Failed to resolve");
    assert_eq!(shared.target(), &StoreTarget::Shared);
    let tenant = harness
        .router
        .resolve_for_entity(user, EntityKind::Movement)
        .await
        .expect("Failed to resolve");
    assert_eq!(tenant.target(), &StoreTarget::Tenant("goldbet_db".to_string()));
}

#[tokio::test]
async fn test_reassignment_moves_the_mirror() {
    let harness = Harness::with_tenants(&["goldbet_db", "better_db"]).await;
    let goldbet = harness.register_tenant("2015103", "goldbet_db").await;
    let better = harness.register_tenant("2014678", "better_db").await;
    let user = harness.tenant_user("mario", Role::Operator, goldbet).await;

    let report = api::assign_profile(&harness.router, user, Some(better))
        .await
        .expect("Failed to reassign");
    assert!(report.assignment.store_changed());
    assert!(matches!(report.mirrored, Some(ReplicationOutcome::Mirrored { .. })));
    assert_eq!(report.removed, Some(ReplicationOutcome::Removed));

    assert!(mirror(&harness, "goldbet_db", user).await.is_none());
    assert!(mirror(&harness, "better_db", user).await.is_some());
    let store = api::resolve_store(&harness.router, user)
        .await
        .expect("Failed to resolve");
    assert_eq!(store.label(), "better_db");
}

#[tokio::test]
async fn test_referenced_mirror_is_retained() {
    let harness = Harness::with_tenants(&["goldbet_db", "better_db"]).await;
    let goldbet = harness.register_tenant("2015103", "goldbet_db").await;
    let better = harness.register_tenant("2014678", "better_db").await;
    let user = harness.tenant_user("mario", Role::Operator, goldbet).await;

    let store = harness.tenant("goldbet_db").await;
    api::create_customer(&store, CreateCustomerInput::named("Bianchi", "Anna"), user)
        .await
        .expect("Failed to create customer");

    let report = api::assign_profile(&harness.router, user, Some(better))
        .await
        .expect("Failed to reassign");
    assert_eq!(report.removed, Some(ReplicationOutcome::Retained));
    assert!(mirror(&harness, "goldbet_db", user).await.is_some());
}

#[tokio::test]
async fn test_inactive_tenant_routes_to_shared_store() {
    let harness = Harness::with_tenants(&["planet_db"]).await;
    let planet = harness.register_tenant("2016789", "planet_db").await;
    let user = harness.tenant_user("luca", Role::Manager, planet).await;

    harness
        .identities()
        .set_tenant_active(planet, false)
        .await
        .expect("Failed to deactivate");
    let store = api::resolve_store(&harness.router, user)
        .await
        .expect("Failed to resolve");
    assert_eq!(store.target(), &StoreTarget::Shared);
}

#[tokio::test]
async fn test_unreachable_tenant_does_not_fail_assignment() {
    let harness = Harness::with_tenants(&["goldbet_db"]).await;
    let ghost = harness.register_tenant("9999999", "ghost_db").await;
    let user = harness.create_user("mario", Role::Operator).await;
    let user = UserId::from_uuid(user.id);

    let report = api::assign_profile(&harness.router, user, Some(ghost))
        .await
        .expect("profile write must succeed");
    assert!(matches!(report.mirrored, Some(ReplicationOutcome::Failed { .. })));
    assert_eq!(report.assignment.current_store.as_deref(), Some("ghost_db"));

    let err = api::resolve_store(&harness.router, user)
        .await
        .expect_err("unconfigured store cannot be resolved");
    assert!(matches!(err, StoreError::UnknownStore(key) if key == "ghost_db"));
}

#[tokio::test]
async fn test_duplicate_tenant_code_rejected() {
    let harness = Harness::with_tenants(&[]).await;
    harness.register_tenant("2015103", "goldbet_db").await;

    let err = api::register_tenant(
        &harness.shared(),
        distinta_db::repositories::RegisterTenantInput {
            name: "Goldbet bis".to_string(),
            code: "2015103".to_string(),
            store_key: "goldbet2_db".to_string(),
        },
    )
    .await
    .expect_err("codes are unique");
    assert!(matches!(err, StoreError::DuplicateTenantCode(_)));
}
