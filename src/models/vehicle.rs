//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle del garage.
//! La matrícula es única dentro de un mismo garage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub garage_id: i64,
    pub customer_id: i64,
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub garage_id: i64,
    pub customer_id: i64,
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
}

/// Normalizar matrícula para la unicidad por garage
pub fn normalize_registration(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_registration() {
        assert_eq!(normalize_registration("  ab-123  cd "), "AB-123 CD");
        assert_eq!(normalize_registration("xyz"), "XYZ");
    }
}
