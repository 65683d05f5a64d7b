use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity, Model as CustomerModel},
    entities::profile::{self, Entity as ProfileEntity, Model as ProfileModel, ProfileRole},
    entities::supplier::{self, Entity as SupplierEntity, Model as SupplierModel},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Profile update payload. Role and email have no field here on purpose;
/// they are fixed once the account is provisioned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Read surface over profiles and their role records for admin screens.
#[derive(Clone)]
pub struct DirectoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl DirectoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists profiles newest first, optionally narrowed to one role.
    #[instrument(skip(self))]
    pub async fn list_profiles(
        &self,
        role: Option<ProfileRole>,
    ) -> Result<Vec<ProfileModel>, ServiceError> {
        let mut query = ProfileEntity::find();
        if let Some(role) = role {
            query = query.filter(profile::Column::Role.eq(role));
        }

        query
            .order_by_desc(profile::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(Into::into)
    }

    /// Get a profile by ID
    #[instrument(skip(self))]
    pub async fn get_profile(&self, profile_id: Uuid) -> Result<ProfileModel, ServiceError> {
        ProfileEntity::find_by_id(profile_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Profile {} not found", profile_id)))
    }

    /// Updates a profile's name and contact block. Role stays as
    /// provisioned.
    #[instrument(skip(self, request), fields(profile_id = %profile_id))]
    pub async fn update_profile(
        &self,
        profile_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<ProfileModel, ServiceError> {
        let existing = self.get_profile(profile_id).await?;
        let mut active: profile::ActiveModel = existing.into();

        if let Some(name) = request.name {
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Name cannot be empty".to_string(),
                ));
            }
            active.name = Set(name);
        }
        if let Some(company) = request.company {
            active.company = Set(Some(company));
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        if let Some(city) = request.city {
            active.city = Set(Some(city));
        }
        active.updated_at = Set(Utc::now());

        let profile = active.update(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::ProfileUpdated(profile_id))
            .await;

        info!("Updated profile: {}", profile_id);
        Ok(profile)
    }

    /// Active suppliers ordered by company name.
    #[instrument(skip(self))]
    pub async fn list_suppliers(&self) -> Result<Vec<SupplierModel>, ServiceError> {
        SupplierEntity::find()
            .filter(supplier::Column::IsActive.eq(true))
            .order_by_asc(supplier::Column::CompanyName)
            .all(&*self.db_pool)
            .await
            .map_err(Into::into)
    }

    /// Active customers ordered by company name.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<CustomerModel>, ServiceError> {
        CustomerEntity::find()
            .filter(customer::Column::IsActive.eq(true))
            .order_by_asc(customer::Column::CompanyName)
            .all(&*self.db_pool)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_defaults_to_no_changes() {
        let request = UpdateProfileRequest::default();
        assert!(request.name.is_none());
        assert!(request.company.is_none());
        assert!(request.phone.is_none());
        assert!(request.address.is_none());
        assert!(request.city.is_none());
    }

    #[test]
    fn update_request_has_no_role_field() {
        // A payload trying to smuggle a role change deserializes cleanly
        // with the role ignored.
        let request: UpdateProfileRequest =
            serde_json::from_str(r#"{"name":"New Name","role":"admin"}"#).expect("deserializes");
        assert_eq!(request.name.as_deref(), Some("New Name"));
    }
}
