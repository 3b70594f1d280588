//! Identity and tenant registry in the shared store.

use chrono::Utc;
use distinta_core::audit::EntityKind;
use distinta_core::tenancy::{ProfileLink, Role};
use distinta_shared::types::{ProfileId, TenantId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use validator::Validate;

use crate::entities::{tenants, user_profiles, users};
use crate::error::StoreError;
use crate::store::StoreHandle;

/// Input for creating an identity record.
#[derive(Debug, Clone, Validate)]
pub struct CreateUserInput {
    /// Login name, unique.
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    /// Optional email.
    #[validate(email)]
    pub email: Option<String>,
    /// Assigned role.
    pub role: Role,
    /// Staff flag.
    pub is_staff: bool,
    /// Superuser flag.
    pub is_superuser: bool,
}

/// Input for registering an agency.
#[derive(Debug, Clone, Validate)]
pub struct RegisterTenantInput {
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Unique agency code.
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    /// Key of the tenant store in configuration.
    #[validate(length(min = 1, max = 100))]
    pub store_key: String,
}

/// Result of (re)assigning a user to a tenant.
#[derive(Debug, Clone)]
pub struct ProfileAssignment {
    /// The saved profile.
    pub profile: user_profiles::Model,
    /// Store key of the previous tenant, if any.
    pub previous_store: Option<String>,
    /// Store key of the new tenant, if any.
    pub current_store: Option<String>,
}

impl ProfileAssignment {
    /// Whether the routing target moved to a different tenant store.
    #[must_use]
    pub fn store_changed(&self) -> bool {
        self.previous_store != self.current_store
    }
}

/// Repository over the shared store.
#[derive(Debug, Clone)]
pub struct IdentityRepository {
    store: StoreHandle,
}

impl IdentityRepository {
    /// Creates a new identity repository.
    #[must_use]
    pub const fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Creates an identity record.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or a taken username.
    pub async fn create_user(&self, input: CreateUserInput) -> Result<users::Model, StoreError> {
        input.validate()?;
        let taken = users::Entity::find()
            .filter(users::Column::Username.eq(&input.username))
            .count(self.store.conn())
            .await?;
        if taken > 0 {
            return Err(StoreError::Validation(format!(
                "Username '{}' already exists",
                input.username
            )));
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            username: Set(input.username),
            full_name: Set(input.full_name),
            email: Set(input.email),
            role: Set(input.role.into()),
            is_active: Set(true),
            is_staff: Set(input.is_staff),
            is_superuser: Set(input.is_superuser),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(user.insert(self.store.conn()).await?)
    }

    /// Finds an identity record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_user(&self, id: UserId) -> Result<Option<users::Model>, StoreError> {
        Ok(users::Entity::find_by_id(id.into_inner())
            .one(self.store.conn())
            .await?)
    }

    /// Finds an identity record by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<users::Model>, StoreError> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(self.store.conn())
            .await?)
    }

    /// Gets an identity record by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is none.
    pub async fn get_user(&self, id: UserId) -> Result<users::Model, StoreError> {
        self.find_user(id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::User, id))
    }

    /// Registers a tenant descriptor.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTenantCode` if the code is already registered.
    pub async fn register_tenant(
        &self,
        input: RegisterTenantInput,
    ) -> Result<tenants::Model, StoreError> {
        input.validate()?;
        if self.find_tenant_by_code(&input.code).await?.is_some() {
            return Err(StoreError::DuplicateTenantCode(input.code));
        }

        let now = Utc::now().into();
        let tenant = tenants::ActiveModel {
            id: Set(TenantId::new().into_inner()),
            name: Set(input.name),
            code: Set(input.code),
            store_key: Set(input.store_key),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(tenant.insert(self.store.conn()).await?)
    }

    /// Finds a tenant by its agency code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_tenant_by_code(&self, code: &str) -> Result<Option<tenants::Model>, StoreError> {
        Ok(tenants::Entity::find()
            .filter(tenants::Column::Code.eq(code))
            .one(self.store.conn())
            .await?)
    }

    /// Activates or deactivates a tenant. Users of an inactive tenant route to the shared store.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown tenant.
    pub async fn set_tenant_active(
        &self,
        id: TenantId,
        active: bool,
    ) -> Result<tenants::Model, StoreError> {
        let tenant = tenants::Entity::find_by_id(id.into_inner())
            .one(self.store.conn())
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Tenant, id))?;

        let mut active_model: tenants::ActiveModel = tenant.into();
        active_model.is_active = Set(active);
        active_model.updated_at = Set(Utc::now().into());
        Ok(active_model.update(self.store.conn()).await?)
    }

    /// Creates or updates the user's profile so it points at `tenant` (or at nothing).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown user or tenant.
    pub async fn assign_profile(
        &self,
        user: UserId,
        tenant: Option<TenantId>,
    ) -> Result<ProfileAssignment, StoreError> {
        let txn = self.store.conn().begin().await?;

        if users::Entity::find_by_id(user.into_inner()).one(&txn).await?.is_none() {
            return Err(StoreError::not_found(EntityKind::User, user));
        }
        let current_store = match tenant {
            Some(id) => Some(
                tenants::Entity::find_by_id(id.into_inner())
                    .one(&txn)
                    .await?
                    .ok_or_else(|| StoreError::not_found(EntityKind::Tenant, id))?
                    .store_key,
            ),
            None => None,
        };

        let existing = user_profiles::Entity::find()
            .filter(user_profiles::Column::UserId.eq(user.into_inner()))
            .one(&txn)
            .await?;
        let now = Utc::now().into();

        let (profile, previous_store) = match existing {
            Some(profile) => {
                let previous_store = match profile.tenant_id {
                    Some(id) => tenants::Entity::find_by_id(id)
                        .one(&txn)
                        .await?
                        .map(|t| t.store_key),
                    None => None,
                };
                let mut active_model: user_profiles::ActiveModel = profile.into();
                active_model.tenant_id = Set(tenant.map(TenantId::into_inner));
                active_model.updated_at = Set(now);
                (active_model.update(&txn).await?, previous_store)
            }
            None => {
                let profile = user_profiles::ActiveModel {
                    id: Set(ProfileId::new().into_inner()),
                    user_id: Set(user.into_inner()),
                    tenant_id: Set(tenant.map(TenantId::into_inner)),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                (profile.insert(&txn).await?, None)
            }
        };

        txn.commit().await?;

        Ok(ProfileAssignment {
            profile,
            previous_store,
            current_store,
        })
    }

    /// What routing needs to know about a principal.
    ///
    /// Returns `None` when the user has no profile or no tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn profile_link(&self, user: UserId) -> Result<Option<ProfileLink>, StoreError> {
        let Some(profile) = user_profiles::Entity::find()
            .filter(user_profiles::Column::UserId.eq(user.into_inner()))
            .one(self.store.conn())
            .await?
        else {
            return Ok(None);
        };
        let Some(tenant_id) = profile.tenant_id else {
            return Ok(None);
        };

        Ok(tenants::Entity::find_by_id(tenant_id)
            .one(self.store.conn())
            .await?
            .map(|tenant| ProfileLink {
                store_key: tenant.store_key,
                tenant_active: tenant.is_active,
            }))
    }
}
