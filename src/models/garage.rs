//! Modelo de Garage
//!
//! El garage es la raíz del tenant: todo registro del ledger le pertenece
//! directa o transitivamente.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Garage principal - mapea exactamente a la tabla garages
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Garage {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Datos para insertar un garage
#[derive(Debug, Clone)]
pub struct NewGarage {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}
