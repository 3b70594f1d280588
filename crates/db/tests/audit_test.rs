//! Integration tests for the audit trail.

mod common;

use common::Agency;
use distinta_core::audit::{AuditAction, EntityKind, EntityRef};
use distinta_db::api;
use distinta_db::repositories::UpdateCustomerInput;
use distinta_shared::types::{CustomerId, PageRequest};
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn test_log_action_default_description() {
    let agency = Agency::with_cash(Decimal::ZERO).await;
    let customer = agency.customer(Decimal::ZERO).await;
    let entity = EntityRef::new(EntityKind::Customer, customer.id);

    api::log_action(
        &agency.store,
        agency.manager,
        entity,
        AuditAction::StatusChange,
        Some(json!({ "risk_rating": "C" })),
        Some(json!({ "risk_rating": "A" })),
    )
    .await
    .expect("Failed to log action");

    let page = api::list_actions(&agency.store, Some(entity), PageRequest::default())
        .await
        .expect("Failed to list actions");
    let latest = &page.data[0];
    assert_eq!(latest.actor_id, agency.manager.into_inner());
    assert_eq!(
        latest.description,
        format!("Cambio di stato di Cliente #{}", customer.id)
    );
    assert_eq!(latest.data_after, Some(json!({ "risk_rating": "A" })));
}

#[tokio::test]
async fn test_customer_mutations_are_audited_newest_first() {
    let agency = Agency::with_cash(Decimal::ZERO).await;
    let customer = agency.customer(Decimal::ZERO).await;
    let id = CustomerId::from_uuid(customer.id);

    api::update_customer(
        &agency.store,
        id,
        UpdateCustomerInput {
            phone: Some(Some("3331234567".to_string())),
            ..Default::default()
        },
        agency.operator,
    )
    .await
    .expect("Failed to update customer");
    api::delete_customer(&agency.store, id, agency.admin)
        .await
        .expect("Failed to delete customer");

    let page = api::list_actions(
        &agency.store,
        Some(EntityRef::new(EntityKind::Customer, customer.id)),
        PageRequest::new(1, 2),
    )
    .await
    .expect("Failed to list actions");
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.total_pages, 2);
    let actions: Vec<AuditAction> = page.data.iter().map(|e| e.action.into()).collect();
    assert_eq!(actions, vec![AuditAction::Delete, AuditAction::Update]);
    assert_eq!(
        page.data[1].description,
        format!("Modifica di Cliente #{}", customer.id)
    );
}
