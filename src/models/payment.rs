//! Modelo de Payment
//!
//! Un pago es una entrada de ledger de solo inserción: los campos son privados
//! y no existe ningún mutador. Las correcciones se hacen con un registro nuevo.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Método de pago - mapea al ENUM payment_method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Cheque,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Other => "other",
        }
    }

    /// Todo lo que no es efectivo necesita una referencia trazable
    pub fn requires_reference(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    id: i64,
    invoice_id: i64,
    garage_id: i64,
    payment_number: String,
    amount: Decimal,
    payment_method: PaymentMethod,
    reference: Option<String>,
    received_by: Option<i64>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl Payment {
    pub(crate) fn issue(id: i64, payment_number: String, new: NewPayment, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            invoice_id: new.invoice_id,
            garage_id: new.garage_id,
            payment_number,
            amount: new.amount,
            payment_method: new.payment_method,
            reference: new.reference,
            received_by: new.received_by,
            notes: new.notes,
            created_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn invoice_id(&self) -> i64 {
        self.invoice_id
    }

    pub fn garage_id(&self) -> i64 {
        self.garage_id
    }

    pub fn payment_number(&self) -> &str {
        &self.payment_number
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// `None` significa registro automático del sistema
    pub fn received_by(&self) -> Option<i64> {
        self.received_by
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub invoice_id: i64,
    pub garage_id: i64,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub reference: Option<String>,
    pub received_by: Option<i64>,
    pub notes: Option<String>,
}
