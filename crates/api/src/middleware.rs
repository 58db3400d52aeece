use axum::{
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use idgate_infra::CredentialVerifier;

use crate::app::errors::ApiError;
use crate::context::AuthenticatedUser;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: CredentialVerifier,
}

/// Resolve the `Authorization` credential to a user, or reject with 401.
///
/// A request without a usable header is rejected before the store is touched.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = extract_credential(req.headers())?.to_owned();

    let user = state.verifier.verify(&credential).await.map_err(|e| {
        debug!(error = %e, path = %req.uri().path(), "credential rejected");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(AuthenticatedUser::new(user));
    Ok(next.run(req).await)
}

/// Accepts the raw credential or `Bearer <credential>`.
fn extract_credential(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(ApiError::Unauthorized("missing credential"))?;

    let header = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("malformed credential"))?
        .trim();

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .unwrap_or(header)
        .trim();

    if token.is_empty() {
        return Err(ApiError::Unauthorized("missing credential"));
    }

    Ok(token)
}
