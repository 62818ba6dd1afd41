use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Returns the trimmed field value, treating missing and blank the same way.
fn required(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (Some(username), Some(email), Some(password)) = (
        required(&payload.username),
        required(&payload.email),
        payload.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        warn!("signup with missing fields");
        return Err(ApiError::validation("All fields are required"));
    };
    let email = email.to_lowercase();

    if password.len() < 6 {
        warn!("signup password too short");
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }

    if !is_valid_email(&email) {
        warn!(email = %email, "signup invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    // Both unique fields checked up front; the DB unique constraints still
    // back this up against races (mapped to Conflict in error.rs).
    if User::find_by_email_or_username(&state.db, &email, username)
        .await?
        .is_some()
    {
        warn!(email = %email, username = %username, "signup duplicate user");
        return Err(ApiError::conflict(
            "User already exists with this email or username",
        ));
    }

    let hash = hash_password(password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e)
    })?;

    let user = User::create(&state.db, username, &email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e)
    })?;

    info!(user_id = %user.id, username = %user.username, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".into(),
            token,
            user: PublicUser {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(email), Some(password)) = (
        required(&payload.email),
        payload.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        warn!("login with missing fields");
        return Err(ApiError::validation("Email and password are required"));
    };
    let email = email.to_lowercase();

    // Unknown email and wrong password produce the same client-facing
    // message; the logs keep the distinction.
    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::auth("Invalid credentials"));
        }
    };

    let ok = verify_password(password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::Internal(e)
    })?;

    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::auth("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e)
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        token,
        user: PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn required_treats_blank_as_missing() {
        assert_eq!(required(&Some("  alice  ".into())), Some("alice"));
        assert_eq!(required(&Some("   ".into())), None);
        assert_eq!(required(&None), None);
    }

    #[tokio::test]
    async fn signup_rejects_missing_fields() {
        let state = AppState::fake();
        let payload = SignupRequest {
            username: Some("alice".into()),
            email: None,
            password: Some("123456".into()),
        };
        let err = signup(State(state), Json(payload)).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "All fields are required");
    }

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let state = AppState::fake();
        let payload = SignupRequest {
            username: Some("alice".into()),
            email: Some("alice@example.com".into()),
            password: Some("12345".into()),
        };
        let err = signup(State(state), Json(payload)).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }

    #[tokio::test]
    async fn signup_rejects_malformed_email() {
        let state = AppState::fake();
        let payload = SignupRequest {
            username: Some("alice".into()),
            email: Some("not-an-email".into()),
            password: Some("123456".into()),
        };
        let err = signup(State(state), Json(payload)).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid email");
    }

    #[tokio::test]
    async fn login_rejects_missing_fields() {
        let state = AppState::fake();
        let payload = LoginRequest {
            email: Some("alice@example.com".into()),
            password: None,
        };
        let err = login(State(state), Json(payload)).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "Email and password are required");
    }

    #[test]
    fn auth_response_serializes_public_user_only() {
        let response = AuthResponse {
            message: "Login successful".into(),
            token: "jwt".into(),
            user: PublicUser {
                id: Uuid::new_v4(),
                username: "alice".into(),
                email: "alice@example.com".into(),
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("alice@example.com"));
        assert!(json.contains("token"));
        assert!(!json.contains("password"));
    }
}
