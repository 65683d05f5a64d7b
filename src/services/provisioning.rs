use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, SqlErr};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity},
    entities::identity::Model as IdentityModel,
    entities::profile::{self, Entity as ProfileEntity, Model as ProfileModel, ProfileRole},
    entities::supplier::{self, Entity as SupplierEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::identity::{IdentityStore, SignupMetadata},
};

/// Registration request as submitted by the portal's signup form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterAccountRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    /// Strength rules live in the identity store, not here.
    pub password: String,
    pub role: ProfileRole,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Profile content the reconciliation writes, whichever path runs.
#[derive(Debug, Clone)]
pub struct ProfileFields {
    pub email: String,
    pub name: String,
    pub role: ProfileRole,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

impl ProfileFields {
    /// Company name for the role record; falls back to the person's name
    /// the way the supplier panel displays accounts without a company.
    pub fn company_name_or(&self, fallback: &str) -> String {
        self.company
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl From<&RegisterAccountRequest> for ProfileFields {
    fn from(request: &RegisterAccountRequest) -> Self {
        Self {
            email: request.email.clone(),
            name: request.name.clone(),
            role: request.role,
            company: request.company.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
            city: request.city.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProvisionedAccount {
    pub identity: IdentityModel,
    pub profile: ProfileModel,
}

/// Provisions accounts against an identity store whose profile trigger may
/// land late, early, or never.
///
/// The identity insert is the only step that can refuse outright. After it
/// succeeds the identity is never rolled back; reconciliation is re-enterable
/// per identity until profile and role record both exist.
#[derive(Clone)]
pub struct ProvisioningService {
    db_pool: Arc<DbPool>,
    identity_store: Arc<dyn IdentityStore>,
    event_sender: Arc<EventSender>,
    reconcile_wait: Duration,
    reconcile_poll: Duration,
}

impl ProvisioningService {
    pub fn new(
        db_pool: Arc<DbPool>,
        identity_store: Arc<dyn IdentityStore>,
        event_sender: Arc<EventSender>,
        reconcile_wait: Duration,
        reconcile_poll: Duration,
    ) -> Self {
        Self {
            db_pool,
            identity_store,
            event_sender,
            reconcile_wait,
            reconcile_poll,
        }
    }

    /// Creates the identity, then reconciles profile and role record.
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn provision_account(
        &self,
        request: RegisterAccountRequest,
    ) -> Result<ProvisionedAccount, ServiceError> {
        request.validate()?;

        let metadata = SignupMetadata {
            name: Some(request.name.clone()),
            role: Some(request.role),
            company: request.company.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
            city: request.city.clone(),
        };

        let identity = self
            .identity_store
            .create_identity(&request.email, &request.password, metadata)
            .await?;

        let profile = self
            .reconcile_account(identity.id, ProfileFields::from(&request))
            .await?;

        self.event_sender
            .send_or_log(Event::AccountRegistered(identity.id))
            .await;

        info!(identity_id = %identity.id, "Account provisioned");

        Ok(ProvisionedAccount { identity, profile })
    }

    /// Brings profile and role record in line with `fields` for an identity
    /// that already exists. Safe to re-run after a partial failure.
    ///
    /// Waits out the identity store's asynchronous profile trigger first;
    /// if the trigger never delivers within the bound, writes the profile
    /// itself. A trigger arriving between the two is absorbed by updating
    /// its row instead.
    #[instrument(skip(self, fields), fields(identity_id = %identity_id))]
    pub async fn reconcile_account(
        &self,
        identity_id: Uuid,
        fields: ProfileFields,
    ) -> Result<ProfileModel, ServiceError> {
        let (profile, fallback) = match self.await_profile(identity_id).await {
            Ok(existing) => {
                debug!(identity_id = %identity_id, "Trigger profile found, applying contact fields");
                (self.apply_contact_fields(existing, &fields).await?, false)
            }
            Err(ServiceError::ReconciliationTimeout(_)) => {
                warn!(
                    identity_id = %identity_id,
                    wait_ms = self.reconcile_wait.as_millis() as u64,
                    "Profile trigger missed its window, falling back to direct insert"
                );
                (self.insert_profile_fallback(identity_id, &fields).await?, true)
            }
            Err(e) => return Err(e),
        };

        self.ensure_role_record(&profile, &fields).await?;

        self.event_sender
            .send_or_log(Event::ProfileReconciled {
                identity_id,
                fallback,
            })
            .await;

        Ok(profile)
    }

    /// Polls for the trigger-created profile until `reconcile_wait` elapses.
    /// The one place in the core that suspends waiting for anyone.
    async fn await_profile(&self, identity_id: Uuid) -> Result<ProfileModel, ServiceError> {
        let deadline = Instant::now() + self.reconcile_wait;
        loop {
            if let Some(profile) = ProfileEntity::find_by_id(identity_id)
                .one(&*self.db_pool)
                .await?
            {
                return Ok(profile);
            }
            if Instant::now() >= deadline {
                return Err(ServiceError::ReconciliationTimeout(identity_id));
            }
            sleep(self.reconcile_poll).await;
        }
    }

    /// Overwrites the contact fields on an existing profile. Name and role
    /// came from the same signup payload the trigger read, so only the
    /// contact block can differ.
    async fn apply_contact_fields(
        &self,
        existing: ProfileModel,
        fields: &ProfileFields,
    ) -> Result<ProfileModel, ServiceError> {
        let mut active: profile::ActiveModel = existing.into();
        active.company = Set(fields.company.clone());
        active.phone = Set(fields.phone.clone());
        active.address = Set(fields.address.clone());
        active.city = Set(fields.city.clone());
        active.updated_at = Set(Utc::now());

        active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Writes the full profile when the trigger never did. A duplicate-key
    /// race means the trigger fired after our poll gave up; its row stays,
    /// our fields go on top.
    async fn insert_profile_fallback(
        &self,
        identity_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<ProfileModel, ServiceError> {
        let now = Utc::now();
        let active = profile::ActiveModel {
            id: Set(identity_id),
            email: Set(fields.email.clone()),
            name: Set(fields.name.clone()),
            role: Set(fields.role),
            company: Set(fields.company.clone()),
            phone: Set(fields.phone.clone()),
            address: Set(fields.address.clone()),
            city: Set(fields.city.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match active.insert(&*self.db_pool).await {
            Ok(profile) => Ok(profile),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(
                    identity_id = %identity_id,
                    "Fallback insert lost to the trigger, updating its row"
                );
                let existing = ProfileEntity::find_by_id(identity_id)
                    .one(&*self.db_pool)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::InternalError(format!(
                            "Profile for identity {} vanished during reconciliation",
                            identity_id
                        ))
                    })?;
                self.apply_contact_fields(existing, fields).await
            }
            Err(e) => Err(ServiceError::DatabaseError(e)),
        }
    }

    /// Inserts the supplier/customer record for the profile's role if it is
    /// not there yet. Admin and manager profiles carry none.
    async fn ensure_role_record(
        &self,
        profile: &ProfileModel,
        fields: &ProfileFields,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();
        let company_name = fields.company_name_or(&profile.name);

        let insert_result = match profile.role {
            ProfileRole::Supplier => {
                if SupplierEntity::find_by_id(profile.id).one(db).await?.is_some() {
                    return Ok(());
                }
                let record = supplier::ActiveModel {
                    id: Set(profile.id),
                    company_name: Set(company_name),
                    tax_number: Set(None),
                    commission_rate: Set(Decimal::ZERO),
                    min_order_amount: Set(Decimal::ZERO),
                    delivery_days: Set(3),
                    is_verified: Set(false),
                    is_active: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                record.insert(db).await.map(|_| ())
            }
            ProfileRole::Customer => {
                if CustomerEntity::find_by_id(profile.id).one(db).await?.is_some() {
                    return Ok(());
                }
                let record = customer::ActiveModel {
                    id: Set(profile.id),
                    company_name: Set(company_name),
                    tax_number: Set(None),
                    credit_limit: Set(Decimal::ZERO),
                    payment_terms: Set(30),
                    discount_rate: Set(Decimal::ZERO),
                    delivery_address: Set(fields.address.clone()),
                    billing_address: Set(fields.address.clone()),
                    is_active: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                record.insert(db).await.map(|_| ())
            }
            ProfileRole::Admin | ProfileRole::Manager => return Ok(()),
        };

        match insert_result {
            Ok(()) => {
                info!(
                    profile_id = %profile.id,
                    role = %profile.role,
                    "Role record created"
                );
                Ok(())
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                // A concurrent reconciliation inserted it first. Same outcome.
                debug!(profile_id = %profile.id, "Role record already present");
                Ok(())
            }
            Err(e) => Err(ServiceError::DatabaseError(e)),
        }
    }
}
