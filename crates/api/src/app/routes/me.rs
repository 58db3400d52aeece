use axum::{Extension, Json};

use idgate_auth::UserProfile;

use crate::context::AuthenticatedUser;

/// `GET /me`: the caller's name and email, identifier withheld.
pub async fn me(Extension(current): Extension<AuthenticatedUser>) -> Json<UserProfile> {
    Json(current.profile())
}
