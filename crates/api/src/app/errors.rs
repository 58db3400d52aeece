use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use idgate_infra::{IssueError, RegistryError, VerifyError};

/// Request-terminal failure, mapped 1:1 onto an HTTP status.
///
/// `Internal` carries detail for the log only; the client always gets a
/// generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidRequest(e) => Self::InvalidRequest(e.to_string()),
            RegistryError::DuplicateEmail(_) => Self::DuplicateEmail,
            RegistryError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<IssueError> for ApiError {
    fn from(err: IssueError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::InvalidCredential => Self::Unauthorized("invalid or expired credential"),
            VerifyError::UnknownUser => Self::Unauthorized("invalid or expired credential"),
            VerifyError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::InvalidRequest(msg) => {
                json_error(StatusCode::BAD_REQUEST, "invalid_request", msg)
            }
            ApiError::DuplicateEmail => json_error(
                StatusCode::BAD_REQUEST,
                "duplicate_email",
                "email already registered",
            ),
            ApiError::Unauthorized(msg) => {
                json_error(StatusCode::UNAUTHORIZED, "invalid_credential", msg)
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use idgate_core::DomainError;
    use idgate_infra::StoreError;

    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn statuses_follow_error_taxonomy() {
        let invalid = DomainError::validation("name is required");
        let down = || StoreError::backend("down");
        let cases = [
            (
                ApiError::from(RegistryError::InvalidRequest(invalid)),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(RegistryError::DuplicateEmail("a@x.com".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(VerifyError::InvalidCredential),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::from(VerifyError::UnknownUser), StatusCode::UNAUTHORIZED),
            (
                ApiError::from(VerifyError::Store(down())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(IssueError::Store(down())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn internal_detail_never_reaches_the_client() {
        let (status, body) =
            body_json(ApiError::internal("db password=hunter2 at 10.0.0.5")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "internal_error", "message": "internal server error" })
        );
    }

    #[tokio::test]
    async fn store_failure_during_issue_is_generic() {
        let err = ApiError::from(IssueError::Store(StoreError::backend(
            "database error in insert_token: connection refused",
        )));
        let (_, body) = body_json(err).await;
        assert!(!body.to_string().contains("connection refused"));
    }
}
