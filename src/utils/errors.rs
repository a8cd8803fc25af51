//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del ledger
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Denegación del Access Guard
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Tenant mismatch: {0}")]
    TenantMismatch(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid item: {0}")]
    InvalidItem(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Missing reference: {0}")]
    MissingReference(String),

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Over payment: {0}")]
    OverPayment(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Invariante corrompido: nunca se reintenta
    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errores que el llamador puede reintentar más tarde con backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }

    /// Errores de validación: el llamador corrige la entrada y reintenta
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::InvalidInput(_)
                | AppError::Validation(_)
                | AppError::InvalidItem(_)
                | AppError::InvalidAmount(_)
                | AppError::MissingReference(_)
                | AppError::IllegalTransition(_)
                | AppError::InvalidState(_)
                | AppError::OverPayment(_)
        )
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::TenantMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidInput(_)
            | AppError::Validation(_)
            | AppError::InvalidItem(_)
            | AppError::InvalidAmount(_)
            | AppError::MissingReference(_) => StatusCode::BAD_REQUEST,
            AppError::IllegalTransition(_)
            | AppError::InvalidState(_)
            | AppError::OverPayment(_)
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Consistency(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::TenantMismatch(_) => "TENANT_MISMATCH",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidItem(_) => "INVALID_ITEM",
            AppError::InvalidAmount(_) => "INVALID_AMOUNT",
            AppError::MissingReference(_) => "MISSING_REFERENCE",
            AppError::IllegalTransition(_) => "ILLEGAL_TRANSITION",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::OverPayment(_) => "OVER_PAYMENT",
            AppError::Conflict(_) => "CONFLICT",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::Consistency(_) => "CONSISTENCY_ERROR",
            AppError::Database(_) => "DB_ERROR",
            AppError::Jwt(_) => "JWT_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::StoreUnavailable(e.to_string())
            }
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(db.message().to_string())
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::Conflict(db.message().to_string())
            }
            other => AppError::Database(other),
        }
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let (message, details) = match &self {
            AppError::Validation(e) => {
                tracing::debug!("Validation error: {}", e);
                ("The provided data is invalid".to_string(), Some(json!(e)))
            }
            AppError::Unauthorized(msg) => {
                // El mensaje externo no revela si el registro existe en otro garage
                tracing::warn!("🚫 Access denied: {}", msg);
                ("You are not permitted to access this resource".to_string(), None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ("An error occurred while accessing the database".to_string(), None)
            }
            AppError::Consistency(msg) => {
                tracing::error!("💥 Consistency error: {}", msg);
                ("Ledger consistency check failed".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("An unexpected error occurred".to_string(), None)
            }
            AppError::StoreUnavailable(msg) => {
                tracing::warn!("⏳ Store unavailable: {}", msg);
                ("The ledger store is temporarily unavailable, retry later".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let error_response = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message,
            details,
            code: Some(code.to_string()),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Función helper para crear errores de tenant cruzado
pub fn tenant_mismatch_error(resource: &str, id: i64, garage_id: i64) -> AppError {
    AppError::TenantMismatch(format!(
        "{} '{}' does not belong to garage '{}'",
        resource, id, garage_id
    ))
}
