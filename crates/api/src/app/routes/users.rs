use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::rejection::JsonRejection,
};
use tracing::{debug, info};

use crate::app::dto::{CredentialRequest, RegisterResponse, TokenResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

fn body_or_invalid(
    body: Result<Json<CredentialRequest>, JsonRejection>,
) -> Result<(String, String), ApiError> {
    let Json(body) = body.map_err(|rejection| {
        debug!(error = %rejection, "unreadable request body");
        ApiError::invalid_request("Missing required fields")
    })?;
    body.require_fields()
}

/// `POST /register`: create a user; a known email is a 400.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CredentialRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let (name, email) = body_or_invalid(body)?;
    let user = services.registry.create(&name, &email).await?;
    Ok(Json(user.into()))
}

/// `POST /token`: resolve-or-create the user, then issue a credential.
pub async fn token(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CredentialRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let (name, email) = body_or_invalid(body)?;
    let user = services.registry.find_or_create(&name, &email).await?;
    let record = services.issuer.issue(&user).await?;

    info!(user_id = %user.id, "credential issued");
    Ok(Json(TokenResponse { token: record.token }))
}
