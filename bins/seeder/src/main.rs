//! Development seeder.
//!
//! Registers the agencies, creates an administrator and one operator per agency, seeds the
//! default chart of accounts in every tenant store, and adds demo customers with a few
//! movements. Running it twice leaves existing rows alone.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use distinta_core::movement::{MovementKind, RiskRating};
use distinta_core::tenancy::Role;
use distinta_db::api;
use distinta_db::repositories::{
    CreateCustomerInput, CreateUserInput, IdentityReplicator, RecordMovementInput,
    RegisterTenantInput,
};
use distinta_db::{LedgerSettings, StoreHandle, StoreRegistry, TenantRouter};
use distinta_shared::AppConfig;
use distinta_shared::types::{CustomerId, TenantId, UserId};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Agencies seeded for development: (name, code, store key).
const AGENCIES: [(&str, &str, &str); 3] = [
    ("Goldbet", "2015103", "goldbet_db"),
    ("Better", "2014678", "better_db"),
    ("Planet", "2016789", "planet_db"),
];

const DEMO_CUSTOMERS: usize = 8;

async fn ensure_user(
    router: &TenantRouter,
    username: &str,
    role: Role,
    superuser: bool,
) -> anyhow::Result<UserId> {
    let identities = router.identities();
    if let Some(user) = identities.find_user_by_username(username).await? {
        return Ok(UserId::from_uuid(user.id));
    }
    let user = identities
        .create_user(CreateUserInput {
            username: username.to_string(),
            full_name: username.to_string(),
            email: None,
            role,
            is_staff: role != Role::Operator,
            is_superuser: superuser,
        })
        .await
        .with_context(|| format!("failed to create user {username}"))?;
    info!(username, %role, "user created");
    Ok(UserId::from_uuid(user.id))
}

async fn ensure_tenant(
    router: &TenantRouter,
    name: &str,
    code: &str,
    key: &str,
) -> anyhow::Result<TenantId> {
    if let Some(tenant) = router.identities().find_tenant_by_code(code).await? {
        return Ok(TenantId::from_uuid(tenant.id));
    }
    let tenant = api::register_tenant(
        router.registry().shared(),
        RegisterTenantInput {
            name: name.to_string(),
            code: code.to_string(),
            store_key: key.to_string(),
        },
    )
    .await?;
    info!(tenant = name, code, "agency registered");
    Ok(TenantId::from_uuid(tenant.id))
}

async fn seed_customers(store: &StoreHandle, operator: UserId) -> anyhow::Result<()> {
    let ratings = [RiskRating::A, RiskRating::B, RiskRating::C, RiskRating::D];
    for i in 0..DEMO_CUSTOMERS {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let mut input = CreateCustomerInput::named(first, last);
        input.credit_limit = Decimal::from(50 * (i % 4 + 1));
        input.risk_rating = ratings[i % ratings.len()];
        let customer = api::create_customer(store, input, operator).await?;

        let bet = Decimal::from(10 + 5 * i);
        for (kind, amount) in [
            (MovementKind::BetSlip, bet),
            (MovementKind::Withdrawal, Decimal::from(i * 3 + 1)),
        ] {
            api::record_movement(
                store,
                RecordMovementInput {
                    customer_id: CustomerId::from_uuid(customer.id),
                    kind,
                    amount,
                    session_id: None,
                    occurred_at: None,
                    notes: Some("Dati dimostrativi".to_string()),
                },
                operator,
            )
            .await?;
        }
    }
    info!(store = store.label(), count = DEMO_CUSTOMERS, "demo customers seeded");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "distinta=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let settings = LedgerSettings::try_from(&config.ledger)?;
    let registry = StoreRegistry::connect(&config.stores, settings).await?;
    let router = TenantRouter::new(registry, IdentityReplicator::from_config(&config.replication));

    let admin = ensure_user(&router, "admin", Role::Admin, true).await?;

    for (name, code, key) in AGENCIES {
        let tenant = ensure_tenant(&router, name, code, key).await?;
        if !config.stores.tenants.contains_key(key) {
            warn!(store = key, "no connection configured for agency store, skipping its data");
            continue;
        }
        let username = format!("operatore_{}", key.trim_end_matches("_db"));
        let operator = ensure_user(&router, &username, Role::Operator, false).await?;
        api::assign_profile(&router, operator, Some(tenant)).await?;

        let store = router.registry().tenant(key).await?;
        let outcome = api::sync_identity(&router, admin, &store).await?;
        if !outcome.is_success() {
            warn!(store = key, ?outcome, "administrator not mirrored, skipping agency data");
            continue;
        }
        let created = api::seed_default_accounts(&store, admin).await?;
        info!(store = key, created = created.len(), "default accounts seeded");

        if created.is_empty() {
            continue;
        }
        seed_customers(&store, operator).await?;
    }

    info!("seeding complete");
    Ok(())
}
