//! Shared fixtures: an in-memory shared store plus tenant stores built with the
//! production migrators.

#![allow(dead_code)]

use distinta_core::tenancy::Role;
use distinta_db::repositories::{
    CreateCustomerInput, CreateUserInput, IdentityRepository, IdentityReplicator,
    RegisterTenantInput,
};
use distinta_db::{
    LedgerSettings, StoreHandle, StoreRegistry, TenantMigrator, TenantRouter, api,
    connect, migrate_shared_store,
};
use distinta_db::entities::{customers, financial_accounts, users};
use distinta_db::migration::MigratorTrait;
use distinta_shared::types::{AccountId, CustomerId, TenantId, UserId};
use rust_decimal::Decimal;

/// A shared store and tenant stores, each a separate in-memory SQLite database.
pub struct Harness {
    pub router: TenantRouter,
}

impl Harness {
    /// Builds a harness with one tenant store per key.
    pub async fn with_tenants(keys: &[&str]) -> Self {
        let shared = connect("sqlite::memory:", 1)
            .await
            .expect("Failed to open shared store");
        migrate_shared_store(&shared)
            .await
            .expect("Failed to migrate shared store");

        let mut tenants = Vec::new();
        for key in keys {
            let conn = connect("sqlite::memory:", 1)
                .await
                .expect("Failed to open tenant store");
            TenantMigrator::up(&conn, None)
                .await
                .expect("Failed to migrate tenant store");
            tenants.push(((*key).to_string(), conn));
        }

        let registry = StoreRegistry::from_connections(shared, tenants, LedgerSettings::default());
        Self {
            router: TenantRouter::new(registry, IdentityReplicator::new(2)),
        }
    }

    pub fn shared(&self) -> StoreHandle {
        self.router.registry().shared().clone()
    }

    pub async fn tenant(&self, key: &str) -> StoreHandle {
        self.router
            .registry()
            .tenant(key)
            .await
            .expect("Tenant store not registered")
    }

    pub fn identities(&self) -> IdentityRepository {
        IdentityRepository::new(self.shared())
    }

    pub async fn register_tenant(&self, code: &str, key: &str) -> TenantId {
        let tenant = api::register_tenant(
            &self.shared(),
            RegisterTenantInput {
                name: format!("Agenzia {code}"),
                code: code.to_string(),
                store_key: key.to_string(),
            },
        )
        .await
        .expect("Failed to register tenant");
        TenantId::from_uuid(tenant.id)
    }

    pub async fn create_user(&self, username: &str, role: Role) -> users::Model {
        self.identities()
            .create_user(CreateUserInput {
                username: username.to_string(),
                full_name: format!("{username} test"),
                email: None,
                role,
                is_staff: role != Role::Operator,
                is_superuser: false,
            })
            .await
            .expect("Failed to create user")
    }

    /// Creates a user and assigns it to `tenant`, mirroring it into the tenant store.
    pub async fn tenant_user(&self, username: &str, role: Role, tenant: TenantId) -> UserId {
        let user = self.create_user(username, role).await;
        let id = UserId::from_uuid(user.id);
        let report = api::assign_profile(&self.router, id, Some(tenant))
            .await
            .expect("Failed to assign profile");
        assert!(
            report.mirrored.is_some_and(|outcome| outcome.is_success()),
            "identity was not mirrored"
        );
        id
    }
}

/// A single-tenant agency with default accounts and the agency cash set to `cash`.
pub struct Agency {
    pub harness: Harness,
    pub store: StoreHandle,
    pub operator: UserId,
    pub manager: UserId,
    pub admin: UserId,
}

impl Agency {
    pub async fn with_cash(cash: Decimal) -> Self {
        let harness = Harness::with_tenants(&["goldbet_db"]).await;
        let tenant = harness.register_tenant("2015103", "goldbet_db").await;
        let operator = harness.tenant_user("mario", Role::Operator, tenant).await;
        let manager = harness.tenant_user("giulia", Role::Manager, tenant).await;
        let admin = harness.tenant_user("admin", Role::Admin, tenant).await;
        let store = harness.tenant("goldbet_db").await;

        api::seed_default_accounts(&store, admin)
            .await
            .expect("Failed to seed accounts");
        let agency = Self {
            harness,
            store,
            operator,
            manager,
            admin,
        };
        if !cash.is_zero() {
            let cash_account = agency.cash_account().await;
            api::direct_adjust(
                &agency.store,
                AccountId::from_uuid(cash_account.id),
                cash,
                admin,
                Some("Saldo iniziale".to_string()),
            )
            .await
            .expect("Failed to set agency cash");
        }
        agency
    }

    pub async fn account(&self, name: &str) -> financial_accounts::Model {
        distinta_db::repositories::AccountRepository::new(self.store.clone())
            .find_by_name(name)
            .await
            .expect("Failed to query account")
            .expect("Account missing")
    }

    pub async fn cash_account(&self) -> financial_accounts::Model {
        self.account("Cassa Agenzia").await
    }

    pub async fn customer(&self, credit_limit: Decimal) -> customers::Model {
        let mut input = CreateCustomerInput::named("Rossi", "Luca");
        input.credit_limit = credit_limit;
        api::create_customer(&self.store, input, self.operator)
            .await
            .expect("Failed to create customer")
    }

    pub async fn reload_customer(&self, id: CustomerId) -> customers::Model {
        distinta_db::repositories::CustomerRepository::new(self.store.clone())
            .get(id)
            .await
            .expect("Failed to reload customer")
    }
}
