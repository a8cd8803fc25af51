//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL del ledger.

pub mod auth;
pub mod customer;
pub mod garage;
pub mod gate_pass;
pub mod invoice;
pub mod payment;
pub mod quotation;
pub mod sequence;
pub mod vehicle;
