//! Registro de pagos
//!
//! Cada pago recibe un número de recibo inmutable. La verificación de
//! sobrepago se hace en el store, en la misma transacción que la inserción.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info};

use crate::models::auth::Principal;
use crate::models::invoice::{Invoice, InvoiceBalance};
use crate::models::payment::{NewPayment, Payment, PaymentMethod};
use crate::repositories::LedgerStore;
use crate::services::access_guard;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Pago tal como lo envía el llamador
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub reference: Option<String>,
    /// `None` = registrado por el sistema
    pub received_by: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn LedgerStore>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn record_payment(
        &self,
        principal: &Principal,
        invoice_id: i64,
        draft: PaymentDraft,
    ) -> AppResult<Payment> {
        let invoice = self.load_invoice(principal, invoice_id).await?;

        if draft.amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(format!(
                "payment amount must be positive, got {}",
                draft.amount
            )));
        }

        let reference = draft
            .reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if draft.payment_method.requires_reference() && reference.is_none() {
            return Err(AppError::MissingReference(format!(
                "{} payments require a reference",
                draft.payment_method.as_str()
            )));
        }

        let payment = self
            .store
            .insert_payment(NewPayment {
                invoice_id: invoice.id,
                garage_id: invoice.garage_id,
                amount: draft.amount,
                payment_method: draft.payment_method,
                reference,
                received_by: draft.received_by,
                notes: draft.notes,
            })
            .await?;

        info!(
            "💰 Payment {} of {} recorded on invoice {}",
            payment.payment_number(),
            payment.amount(),
            invoice.invoice_number
        );
        Ok(payment)
    }

    pub async fn invoice_balance(
        &self,
        principal: &Principal,
        invoice_id: i64,
    ) -> AppResult<InvoiceBalance> {
        let invoice = self.load_invoice(principal, invoice_id).await?;
        let paid = self.store.paid_total(invoice.id).await?;

        InvoiceBalance::compute(&invoice, paid).map_err(|e| {
            error!("💥 Balance of invoice {} is inconsistent: {}", invoice.id, e);
            e
        })
    }

    pub async fn get_payment(&self, principal: &Principal, payment_id: i64) -> AppResult<Payment> {
        let payment = self
            .store
            .find_payment(payment_id)
            .await?
            .ok_or_else(|| not_found_error("Payment", payment_id))?;
        access_guard::ensure(principal, payment.garage_id(), "payment")?;
        Ok(payment)
    }

    pub async fn list_payments(
        &self,
        principal: &Principal,
        invoice_id: i64,
    ) -> AppResult<Vec<Payment>> {
        let invoice = self.load_invoice(principal, invoice_id).await?;
        self.store.payments_for_invoice(invoice.id).await
    }

    async fn load_invoice(&self, principal: &Principal, invoice_id: i64) -> AppResult<Invoice> {
        let invoice = self
            .store
            .find_invoice(invoice_id)
            .await?
            .ok_or_else(|| not_found_error("Invoice", invoice_id))?;
        access_guard::ensure(principal, invoice.garage_id, "invoice")?;
        Ok(invoice)
    }
}
