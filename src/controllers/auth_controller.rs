use axum::{extract::Extension, response::Json};

use crate::extract::JsonBody;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{google, guard::AuthUser, jwt};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: Option<String>,
}

/// Exchanges a verified Google ID token for a self-issued bearer token.
pub async fn google_login(
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(body): JsonBody<GoogleLoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let google_token = body
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Token de Google no proporcionado"))?;

    let user = google::verify_google_token(&state.http, &state.config.google_client_id, &google_token)
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "google token verification failed");
            ApiError::unauthenticated("Token de Google inválido")
        })?;

    let token = jwt::issue(&user, state.config.jwt_secret.as_bytes())
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(Json(json!({
        "token": token,
        "user": {
            "email": user.email,
            "name": user.name,
            "picture": user.picture,
        }
    })))
}

/// Reports whether the presented bearer token is still valid. The guard
/// does all the work; reaching the handler means the token checked out.
pub async fn verify(user: AuthUser) -> Json<Value> {
    Json(json!({
        "valid": true,
        "user": {
            "email": user.claims.email,
            "name": user.claims.name,
            "picture": user.claims.picture,
        }
    }))
}
