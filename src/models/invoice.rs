//! Modelo de Invoice y balance de pagos

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::errors::{AppError, AppResult};

/// Invoice principal - mapea exactamente a la tabla invoices
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub garage_id: i64,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub quotation_id: Option<i64>,
    pub invoice_number: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Comprobar que `amount` cabe en lo pendiente. Se evalúa dentro de la
    /// misma transacción que inserta el pago.
    pub fn ensure_accepts_payment(&self, already_paid: Decimal, amount: Decimal) -> AppResult<()> {
        let after = already_paid
            .checked_add(amount)
            .ok_or_else(|| AppError::InvalidAmount("payment amount overflows".to_string()))?;

        if after > self.total_amount {
            return Err(AppError::OverPayment(format!(
                "payment of {} exceeds the remaining balance {} of invoice {}",
                amount,
                self.total_amount - already_paid,
                self.invoice_number
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub garage_id: i64,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub quotation_id: Option<i64>,
    pub total_amount: Decimal,
}

/// Balance de una factura: total, pagado y pendiente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceBalance {
    pub invoice_id: i64,
    pub total: Decimal,
    pub paid: Decimal,
    pub remaining: Decimal,
}

impl InvoiceBalance {
    /// Un pendiente negativo solo puede venir de un bug previo: nunca se recorta a cero
    pub fn compute(invoice: &Invoice, paid: Decimal) -> AppResult<Self> {
        let remaining = invoice
            .total_amount
            .checked_sub(paid)
            .ok_or_else(|| AppError::Consistency(format!(
                "balance of invoice {} cannot be computed",
                invoice.invoice_number
            )))?;

        if remaining < Decimal::ZERO {
            return Err(AppError::Consistency(format!(
                "invoice {} is over-paid: total {} < paid {}",
                invoice.invoice_number, invoice.total_amount, paid
            )));
        }

        Ok(Self {
            invoice_id: invoice.id,
            total: invoice.total_amount,
            paid,
            remaining,
        })
    }

    pub fn is_settled(&self) -> bool {
        self.remaining.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(total: Decimal) -> Invoice {
        Invoice {
            id: 5,
            garage_id: 1,
            customer_id: 1,
            vehicle_id: 1,
            quotation_id: None,
            invoice_number: "INV-000005".to_string(),
            total_amount: total,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_balance() {
        let balance = InvoiceBalance::compute(&invoice(Decimal::from(200)), Decimal::from(150)).unwrap();
        assert_eq!(balance.remaining, Decimal::from(50));
        assert!(!balance.is_settled());
    }

    #[test]
    fn test_ensure_accepts_payment() {
        let inv = invoice(Decimal::from(200));
        assert!(inv.ensure_accepts_payment(Decimal::from(150), Decimal::from(50)).is_ok());
        assert!(matches!(
            inv.ensure_accepts_payment(Decimal::from(150), Decimal::from(51)),
            Err(AppError::OverPayment(_))
        ));
    }

    #[test]
    fn test_negative_remaining_is_fatal() {
        let result = InvoiceBalance::compute(&invoice(Decimal::from(100)), Decimal::from(101));
        assert!(matches!(result, Err(AppError::Consistency(_))));
    }
}
