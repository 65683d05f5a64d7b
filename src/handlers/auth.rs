use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::entities::profile::Model as ProfileModel;
use crate::errors::ServiceError;
use crate::services::provisioning::{ProvisionedAccount, RegisterAccountRequest};
use crate::{ApiResponse, AppState};

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Logout request payload
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub identity_id: Uuid,
}

/// Login response: the authenticated identity plus its profile.
///
/// `profile` is `None` only for identities that predate provisioning or
/// whose reconciliation never completed; clients treat that as a
/// sign-up-incomplete state.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub identity_id: Uuid,
    pub email: String,
    pub profile: Option<ProfileModel>,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Register a new account: identity first, then reconciled profile and
/// role record. Returns the full provisioned pair.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProvisionedAccount>>), ServiceError> {
    let account = state.services.provisioning.provision_account(request).await?;

    info!(identity_id = %account.identity.id, "Account registered");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(account))))
}

/// Verify credentials and return the identity with its profile
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ServiceError> {
    request.validate()?;

    let identity = state
        .services
        .identity
        .verify_credentials(&request.email, &request.password)
        .await?;

    let profile = match state.services.directory.get_profile(identity.id).await {
        Ok(profile) => Some(profile),
        Err(ServiceError::NotFound(_)) => None,
        Err(e) => return Err(e),
    };

    info!(identity_id = %identity.id, "Login succeeded");

    Ok(Json(ApiResponse::success(LoginResponse {
        identity_id: identity.id,
        email: identity.email,
        profile,
    })))
}

/// End the identity's session
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .identity
        .end_session(request.identity_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
