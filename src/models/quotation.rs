//! Modelo de Quotation
//!
//! Cotizaciones con sus líneas. Aquí viven las reglas puras del ciclo de vida:
//! cálculo de totales, transiciones legales y el estado efectivo (expiración
//! derivada en lectura, nunca almacenada).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;

use crate::utils::errors::{AppError, AppResult};

const SECONDS_PER_DAY: i64 = 86_400;

/// Estado de la cotización - mapea al ENUM quotation_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "quotation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Accepted => "accepted",
            QuotationStatus::Rejected => "rejected",
            QuotationStatus::Expired => "expired",
        }
    }

    /// Una decisión tomada (aceptada/rechazada) es definitiva
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuotationStatus::Accepted | QuotationStatus::Rejected)
    }

    /// Solo draft→sent, sent→accepted y sent→rejected son legales
    pub fn ensure_transition(self, to: QuotationStatus) -> AppResult<()> {
        match (self, to) {
            (QuotationStatus::Draft, QuotationStatus::Sent)
            | (QuotationStatus::Sent, QuotationStatus::Accepted)
            | (QuotationStatus::Sent, QuotationStatus::Rejected) => Ok(()),
            (from, to) => Err(AppError::IllegalTransition(format!(
                "cannot move quotation from {} to {}",
                from, to
            ))),
        }
    }

    pub fn ensure_items_editable(self) -> AppResult<()> {
        match self {
            QuotationStatus::Draft | QuotationStatus::Sent => Ok(()),
            other => Err(AppError::InvalidState(format!(
                "items of a {} quotation cannot be modified",
                other
            ))),
        }
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tipo de línea - mapea al ENUM quotation_item_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "quotation_item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Service,
    Part,
    Custom,
}

/// Quotation principal - mapea exactamente a la tabla quotations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quotation {
    pub id: i64,
    pub garage_id: i64,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub quotation_number: String,
    pub status: QuotationStatus,
    pub created_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub total_amount: Decimal,
    pub notes: Option<String>,
}

impl Quotation {
    /// Estado que ve el llamador. No modifica el valor almacenado.
    pub fn effective_status(&self, now: DateTime<Utc>) -> QuotationStatus {
        match self.status {
            QuotationStatus::Draft | QuotationStatus::Sent if now > self.valid_until => {
                QuotationStatus::Expired
            }
            status => status,
        }
    }

    /// Días de validez restantes (redondeo hacia arriba) mientras siga abierta
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        match self.effective_status(now) {
            QuotationStatus::Draft | QuotationStatus::Sent => {
                let seconds = (self.valid_until - now).num_seconds();
                Some((seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY)
            }
            _ => None,
        }
    }
}

/// Línea de cotización - tabla quotation_items
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuotationItem {
    pub id: i64,
    pub quotation_id: i64,
    pub item_type: ItemType,
    pub item_id: Option<i64>,
    pub description: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl QuotationItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Línea tal como la envía el llamador, antes de persistir
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationItemInput {
    pub item_type: ItemType,
    pub item_id: Option<i64>,
    pub description: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl QuotationItemInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.quantity <= 0 {
            return Err(AppError::InvalidItem(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::InvalidItem(format!(
                "price must not be negative, got {}",
                self.price
            )));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::InvalidItem(
                "description must not be empty".to_string(),
            ));
        }
        if self.item_type == ItemType::Custom && self.item_id.is_some() {
            return Err(AppError::InvalidItem(
                "custom items do not reference a catalog entry".to_string(),
            ));
        }
        Ok(())
    }

    pub fn line_total(&self) -> AppResult<Decimal> {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| AppError::InvalidItem(format!(
                "line total overflows for '{}'",
                self.description
            )))
    }
}

/// Validar las líneas y calcular Σ(precio × cantidad)
pub fn compute_total(items: &[QuotationItemInput]) -> AppResult<Decimal> {
    if items.is_empty() {
        return Err(AppError::InvalidItem(
            "a quotation needs at least one item".to_string(),
        ));
    }

    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        item.validate()?;
        acc.checked_add(item.line_total()?)
            .ok_or_else(|| AppError::InvalidItem("quotation total overflows".to_string()))
    })
}

/// Datos para insertar una cotización (el número lo asigna el store)
#[derive(Debug, Clone)]
pub struct NewQuotation {
    pub garage_id: i64,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub valid_until: DateTime<Utc>,
    pub total_amount: Decimal,
    pub notes: Option<String>,
}

/// Vista de lectura para la capa de presentación
#[derive(Debug, Clone, Serialize)]
pub struct QuotationView {
    pub quotation: Quotation,
    pub items: Vec<QuotationItem>,
    pub effective_status: QuotationStatus,
    pub days_remaining: Option<i64>,
}

impl QuotationView {
    pub fn new(quotation: Quotation, items: Vec<QuotationItem>, now: DateTime<Utc>) -> Self {
        Self {
            effective_status: quotation.effective_status(now),
            days_remaining: quotation.days_remaining(now),
            quotation,
            items,
        }
    }
}

/// Fila de listado: la cotización con su estado efectivo, sin líneas
#[derive(Debug, Clone, Serialize)]
pub struct QuotationSummary {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub effective_status: QuotationStatus,
    pub days_remaining: Option<i64>,
}

impl QuotationSummary {
    pub fn new(quotation: Quotation, now: DateTime<Utc>) -> Self {
        Self {
            effective_status: quotation.effective_status(now),
            days_remaining: quotation.days_remaining(now),
            quotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(price: Decimal, quantity: i32) -> QuotationItemInput {
        QuotationItemInput {
            item_type: ItemType::Service,
            item_id: None,
            description: "Oil change".to_string(),
            quantity,
            price,
        }
    }

    fn quotation(status: QuotationStatus, valid_until: DateTime<Utc>) -> Quotation {
        Quotation {
            id: 1,
            garage_id: 1,
            customer_id: 1,
            vehicle_id: 1,
            quotation_number: "QUO-000001".to_string(),
            status,
            created_at: Utc::now(),
            valid_until,
            total_amount: Decimal::ZERO,
            notes: None,
        }
    }

    #[test]
    fn test_compute_total() {
        let items = vec![
            item(Decimal::new(10000, 2), 2),
            item(Decimal::new(5000, 2), 1),
        ];
        assert_eq!(compute_total(&items).unwrap(), Decimal::new(25000, 2));
    }

    #[test]
    fn test_compute_total_rejects_bad_items() {
        assert!(matches!(compute_total(&[]), Err(AppError::InvalidItem(_))));
        assert!(matches!(
            compute_total(&[item(Decimal::ONE, 0)]),
            Err(AppError::InvalidItem(_))
        ));
        assert!(matches!(
            compute_total(&[item(Decimal::new(-1, 2), 1)]),
            Err(AppError::InvalidItem(_))
        ));
        // Precio cero es válido (p.ej. mano de obra en garantía)
        assert_eq!(compute_total(&[item(Decimal::ZERO, 3)]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let items = vec![item(Decimal::MAX, 2)];
        assert!(matches!(compute_total(&items), Err(AppError::InvalidItem(_))));
    }

    #[test]
    fn test_transitions() {
        use QuotationStatus::*;
        assert!(Draft.ensure_transition(Sent).is_ok());
        assert!(Sent.ensure_transition(Accepted).is_ok());
        assert!(Sent.ensure_transition(Rejected).is_ok());

        for (from, to) in [
            (Draft, Accepted),
            (Draft, Rejected),
            (Sent, Draft),
            (Accepted, Rejected),
            (Rejected, Sent),
            (Sent, Expired),
            (Draft, Draft),
        ] {
            assert!(
                matches!(from.ensure_transition(to), Err(AppError::IllegalTransition(_))),
                "{} -> {} should be illegal",
                from,
                to
            );
        }
    }

    #[test]
    fn test_items_editable() {
        assert!(QuotationStatus::Draft.ensure_items_editable().is_ok());
        assert!(QuotationStatus::Sent.ensure_items_editable().is_ok());
        assert!(matches!(
            QuotationStatus::Accepted.ensure_items_editable(),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn test_effective_status_expires_open_quotations() {
        let now = Utc::now();
        let q = quotation(QuotationStatus::Sent, now - Duration::days(1));
        assert_eq!(q.effective_status(now), QuotationStatus::Expired);
        assert_eq!(q.status, QuotationStatus::Sent);
        assert_eq!(q.days_remaining(now), None);
    }

    #[test]
    fn test_effective_status_keeps_decisions() {
        let now = Utc::now();
        let q = quotation(QuotationStatus::Accepted, now - Duration::days(10));
        assert_eq!(q.effective_status(now), QuotationStatus::Accepted);
    }

    #[test]
    fn test_days_remaining_rounds_up() {
        let now = Utc::now();
        let q = quotation(QuotationStatus::Draft, now + Duration::hours(30));
        assert_eq!(q.effective_status(now), QuotationStatus::Draft);
        assert_eq!(q.days_remaining(now), Some(2));
    }
}
