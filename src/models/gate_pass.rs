//! Modelo de GatePass
//!
//! Autorización puntual de salida/entrada de un vehículo. Igual que los pagos,
//! es inmutable una vez emitido.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GatePass {
    id: i64,
    garage_id: i64,
    customer_id: i64,
    vehicle_id: i64,
    pass_number: String,
    purpose: String,
    security_notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl GatePass {
    pub(crate) fn issue(id: i64, pass_number: String, new: NewGatePass, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            garage_id: new.garage_id,
            customer_id: new.customer_id,
            vehicle_id: new.vehicle_id,
            pass_number,
            purpose: new.purpose,
            security_notes: new.security_notes,
            created_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn garage_id(&self) -> i64 {
        self.garage_id
    }

    pub fn customer_id(&self) -> i64 {
        self.customer_id
    }

    pub fn vehicle_id(&self) -> i64 {
        self.vehicle_id
    }

    pub fn pass_number(&self) -> &str {
        &self.pass_number
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn security_notes(&self) -> Option<&str> {
        self.security_notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone)]
pub struct NewGatePass {
    pub garage_id: i64,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub purpose: String,
    pub security_notes: Option<String>,
}
