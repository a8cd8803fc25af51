//! DTOs de la API
//!
//! Requests y el envoltorio común de respuestas.

pub mod directory_dto;
pub mod gate_pass_dto;
pub mod invoice_dto;
pub mod quotation_dto;

use serde::{Deserialize, Serialize};

/// Response genérica
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

/// Query común de listados por garage
#[derive(Debug, Default, Deserialize)]
pub struct GarageQuery {
    pub garage_id: Option<i64>,
}
