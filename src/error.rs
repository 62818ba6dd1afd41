use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// The errors surfaced at the API boundary.
///
/// Every handler returns one of these; the `IntoResponse` impl is the single
/// place where they become status codes. Internal failures keep their detail
/// in the server log only.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad input shape or values.
    #[error("{0}")]
    Validation(String),

    /// A unique field (email, username) is already taken.
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials or a missing/invalid/expired token.
    #[error("{0}")]
    Auth(String),

    /// Resource absent, or owned by a different user.
    #[error("{0}")]
    NotFound(String),

    /// Anything unexpected. Logged with detail, returned as a generic 500.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        // Unique violations surface as conflicts; races between the
        // existence check and the insert end up here.
        if let Some(db_err) = e.as_database_error() {
            if db_err.code().as_deref() == Some("23505") {
                return ApiError::conflict("User already exists with this email or username");
            }
        }
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Internal(e) => {
                error!(error = %e, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            other => (other.status(), other.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_and_conflict_map_to_400() {
        assert_eq!(
            ApiError::validation("bad input").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::conflict("duplicate").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn auth_maps_to_401_and_not_found_to_404() {
        assert_eq!(ApiError::auth("no").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::not_found("gone").status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_maps_to_500() {
        let err = ApiError::Internal(anyhow::anyhow!("connection reset"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn sqlx_errors_without_db_payload_stay_internal() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
