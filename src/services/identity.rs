use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::identity::{self, Entity as IdentityEntity, Model as IdentityModel},
    entities::profile::{self, ProfileRole},
    errors::ServiceError,
};

/// Minimum password length accepted at signup.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Signup payload stored on the identity and read by the profile trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupMetadata {
    pub name: Option<String>,
    pub role: Option<ProfileRole>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

impl SignupMetadata {
    /// Display name for the bare profile; the email doubles as the name
    /// when none was given.
    pub fn name_or_email(&self, email: &str) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.to_string())
    }

    pub fn role_or_default(&self) -> ProfileRole {
        self.role.unwrap_or(ProfileRole::Customer)
    }
}

/// Credential authority the provisioner talks to.
///
/// Deliberately narrow: create, verify, end session. Everything else the
/// platform's auth client exposed is out of scope for this portal.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Creates an identity. May asynchronously materialize a bare profile
    /// row out of band; callers must not rely on the profile existing when
    /// this returns.
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        metadata: SignupMetadata,
    ) -> Result<IdentityModel, ServiceError>;

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityModel, ServiceError>;

    async fn end_session(&self, identity_id: Uuid) -> Result<(), ServiceError>;
}

/// Identity store over the `identities` table with argon2id hashing.
///
/// Emulates the platform's profile trigger: after a successful insert a
/// spawned task sleeps `trigger_delay`, then inserts the bare profile from
/// the signup metadata. `None` disables the trigger, leaving profile
/// creation entirely to the provisioner's fallback.
#[derive(Clone)]
pub struct SqlIdentityStore {
    db_pool: Arc<DbPool>,
    trigger_delay: Option<Duration>,
}

impl SqlIdentityStore {
    pub fn new(db_pool: Arc<DbPool>, trigger_delay: Option<Duration>) -> Self {
        Self {
            db_pool,
            trigger_delay,
        }
    }

    fn spawn_profile_trigger(&self, identity_id: Uuid, email: String, metadata: &SignupMetadata) {
        let Some(delay) = self.trigger_delay else {
            return;
        };

        let db_pool = Arc::clone(&self.db_pool);
        let name = metadata.name_or_email(&email);
        let role = metadata.role_or_default();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let now = Utc::now();
            let bare_profile = profile::ActiveModel {
                id: Set(identity_id),
                email: Set(email),
                name: Set(name),
                role: Set(role),
                company: Set(None),
                phone: Set(None),
                address: Set(None),
                city: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };

            match bare_profile.insert(&*db_pool).await {
                Ok(_) => {
                    debug!(identity_id = %identity_id, "Profile trigger inserted bare profile");
                }
                Err(e) => {
                    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                        // The fallback got there first; nothing left to do.
                        debug!(identity_id = %identity_id, "Profile already present, trigger skipped");
                    } else {
                        warn!(identity_id = %identity_id, error = %e, "Profile trigger insert failed");
                    }
                }
            }
        });
    }
}

#[async_trait]
impl IdentityStore for SqlIdentityStore {
    #[instrument(skip(self, password, metadata), fields(email = %email))]
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        metadata: SignupMetadata,
    ) -> Result<IdentityModel, ServiceError> {
        if !validator::validate_email(email) {
            return Err(ServiceError::IdentityError(
                "A valid email address is required".to_string(),
            ));
        }
        validate_password(password)?;

        let password_hash = hash_password(password)?;
        let now = Utc::now();
        let identity_id = Uuid::new_v4();

        let active = identity::ActiveModel {
            id: Set(identity_id),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            metadata: Set(Some(serde_json::to_value(&metadata).map_err(|e| {
                ServiceError::InternalError(format!("Failed to serialize signup metadata: {}", e))
            })?)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(&*self.db_pool).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ServiceError::IdentityError(format!("Email {} is already registered", email))
            } else {
                ServiceError::DatabaseError(e)
            }
        })?;

        info!(identity_id = %identity_id, "Identity created");

        self.spawn_profile_trigger(identity_id, model.email.clone(), &metadata);

        Ok(model)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityModel, ServiceError> {
        let identity = IdentityEntity::find()
            .filter(identity::Column::Email.eq(email))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::AuthError("Invalid email or password".to_string()))?;

        verify_password(password, &identity.password_hash)?;

        info!(identity_id = %identity.id, "Credentials verified");
        Ok(identity)
    }

    #[instrument(skip(self), fields(identity_id = %identity_id))]
    async fn end_session(&self, identity_id: Uuid) -> Result<(), ServiceError> {
        // Sessions are client-held; ending one is an audit event here.
        info!(identity_id = %identity_id, "Session ended");
        Ok(())
    }
}

fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::IdentityError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored PHC hash.
fn verify_password(password: &str, hash: &str) -> Result<(), ServiceError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| ServiceError::AuthError("Invalid email or password".to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ServiceError::AuthError("Invalid email or password".to_string()))
}
