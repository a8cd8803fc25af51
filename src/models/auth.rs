//! Contexto de tenant del principal autenticado
//!
//! El proveedor de sesión externo entrega un `AuthContext`; el core solo
//! trabaja con `Principal`, que únicamente se obtiene vía `require_authenticated`.

use serde::{Deserialize, Serialize};

use crate::utils::errors::{AppError, AppResult};

/// Alcance de tenant del principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "garage_id", rename_all = "snake_case")]
pub enum TenantScope {
    /// Staff de un garage concreto
    Garage(i64),
    /// Administrador de plataforma
    AllGarages,
}

/// Lo que entrega el proveedor de auth/sesión
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub scope: TenantScope,
    pub authenticated: bool,
}

/// Principal autenticado que actúa sobre el ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub scope: TenantScope,
}

impl Principal {
    pub fn scoped(user_id: i64, garage_id: i64) -> Self {
        Self {
            user_id,
            scope: TenantScope::Garage(garage_id),
        }
    }

    pub fn platform_admin(user_id: i64) -> Self {
        Self {
            user_id,
            scope: TenantScope::AllGarages,
        }
    }

    pub fn is_platform_admin(&self) -> bool {
        matches!(self.scope, TenantScope::AllGarages)
    }

    /// Resolver el garage objetivo de un listado/creación.
    ///
    /// Un principal con scope puede omitir el garage (se usa el suyo); un
    /// admin de plataforma tiene que indicarlo explícitamente.
    pub fn resolve_garage(&self, requested: Option<i64>) -> AppResult<i64> {
        match (self.scope, requested) {
            (_, Some(garage_id)) => Ok(garage_id),
            (TenantScope::Garage(garage_id), None) => Ok(garage_id),
            (TenantScope::AllGarages, None) => Err(AppError::InvalidInput(
                "garage_id is required for platform administrators".to_string(),
            )),
        }
    }
}

/// Rechazar llamadores no autenticados antes de llegar a cualquier componente
pub fn require_authenticated(ctx: &AuthContext) -> AppResult<Principal> {
    if !ctx.authenticated {
        return Err(AppError::Unauthenticated(
            "Authentication required".to_string(),
        ));
    }

    Ok(Principal {
        user_id: ctx.user_id,
        scope: ctx.scope,
    })
}
