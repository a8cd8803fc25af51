//! Autenticación JWT
//!
//! Extractor que convierte el header `Authorization: Bearer` en un
//! `Principal`. Sin token válido la request se rechaza con 401 antes de
//! llegar a cualquier servicio.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::{
    models::auth::{require_authenticated, AuthContext, Principal},
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Construir el contexto de sesión a partir de los headers
pub fn auth_context_from_parts(parts: &Parts, state: &AppState) -> Result<AuthContext, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Authorization token required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;
    claims.into_auth_context()
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ctx = auth_context_from_parts(parts, state)?;
        let principal = require_authenticated(&ctx)?;
        debug!("🔐 Authenticated user {} ({:?})", principal.user_id, principal.scope);
        Ok(principal)
    }
}
