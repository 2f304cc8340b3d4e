//! Root login endpoint — verifies password against argon2id hash, issues JWT.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::auth_middleware::Claims;
use crate::bootstrap::{ROOT_ROLE, verify_root_password};
use crate::routes::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Register login routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login_handler))
}

/// Handle POST /auth/login.
///
/// Only the root operator exists server-side; workshop technicians are
/// reference records, not accounts.
async fn login_handler(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<LoginRequest>,
) -> axum::response::Response {
    if body.username != "root" {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({
                "error": "invalid credentials"
            })),
        )
            .into_response();
    }

    let config = &state.server_config;

    if !verify_root_password(&body.password, &config.root.password_hash) {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({
                "error": "invalid credentials"
            })),
        )
            .into_response();
    }

    let now = chrono::Utc::now().timestamp();
    let expire_secs = config.jwt.expire_secs;

    let claims = Claims {
        sub: "root".to_string(),
        name: "Root".to_string(),
        roles: vec![ROOT_ROLE.to_string()],
        iat: now,
        exp: now + expire_secs as i64,
    };

    let encoding_key = EncodingKey::from_secret(config.jwt.secret.as_bytes());
    match encode(&Header::default(), &claims, &encoding_key) {
        Ok(token) => {
            let response = LoginResponse {
                access_token: token,
                token_type: "Bearer".to_string(),
                expires_in: expire_secs,
            };
            (StatusCode::OK, axum::Json(serde_json::json!(response))).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to encode JWT: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({
                    "error": "internal server error"
                })),
            )
                .into_response()
        }
    }
}
