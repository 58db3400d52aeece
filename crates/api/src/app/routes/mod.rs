use axum::{
    Router,
    routing::{get, post},
};

pub mod me;
pub mod system;
pub mod users;

/// Endpoints that need no credential.
pub fn public_router() -> Router {
    Router::new()
        .route("/register", post(users::register))
        .route("/token", post(users::token))
}

/// Endpoints behind the auth middleware.
pub fn protected_router() -> Router {
    Router::new().route("/me", get(me::me))
}
