use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use std::sync::Arc;

use super::jwt::{self, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, extracted from the `Authorization` header.
///
/// This is the only access-guard implementation: a route is protected by
/// declaring an `AuthUser` parameter, which hands the verified claims to
/// the handler explicitly. The raw token is kept because review creation
/// records it for audit.
pub struct AuthUser {
    pub claims: Claims,
    pub token: String,
}

/// Pulls the credential out of an `Authorization` header value of the
/// shape `<scheme> <token>`.
fn bearer_token(header: &str) -> Option<&str> {
    match header.split_once(' ') {
        Some((_, token)) if !token.is_empty() => Some(token),
        _ => None,
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("Token no proporcionado"))?;

        let token = bearer_token(header)
            .ok_or_else(|| ApiError::unauthenticated("Token inválido"))?;

        let state = parts
            .extensions
            .get::<Arc<AppState>>()
            .ok_or_else(|| ApiError::Internal("application state missing".into()))?;

        let claims = jwt::verify(token, state.config.jwt_secret.as_bytes())
            .map_err(|_| ApiError::unauthenticated("Token inválido o expirado"))?;

        Ok(AuthUser {
            claims,
            token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_after_scheme() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_header_without_token_part() {
        assert_eq!(bearer_token("abc.def.ghi"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }
}
