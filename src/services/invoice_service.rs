//! Servicio de facturas

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::models::auth::Principal;
use crate::models::invoice::{Invoice, NewInvoice};
use crate::models::quotation::QuotationStatus;
use crate::repositories::LedgerStore;
use crate::services::access_guard;
use crate::services::directory_service::ensure_parties;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn LedgerStore>,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn create_invoice(
        &self,
        principal: &Principal,
        garage_id: i64,
        customer_id: i64,
        vehicle_id: i64,
        total_amount: Decimal,
    ) -> AppResult<Invoice> {
        access_guard::ensure(principal, garage_id, "invoices")?;
        if total_amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(format!(
                "invoice total must be positive, got {}",
                total_amount
            )));
        }
        ensure_parties(self.store.as_ref(), garage_id, customer_id, vehicle_id).await?;

        let invoice = self
            .store
            .insert_invoice(NewInvoice {
                garage_id,
                customer_id,
                vehicle_id,
                quotation_id: None,
                total_amount,
            })
            .await?;

        info!(
            "🧾 Invoice {} created for garage {} (total {})",
            invoice.invoice_number, invoice.garage_id, invoice.total_amount
        );
        Ok(invoice)
    }

    /// Facturar una cotización aceptada copiando cliente, vehículo y total
    pub async fn invoice_from_quotation(
        &self,
        principal: &Principal,
        quotation_id: i64,
    ) -> AppResult<Invoice> {
        let quotation = self
            .store
            .find_quotation(quotation_id)
            .await?
            .ok_or_else(|| not_found_error("Quotation", quotation_id))?;
        access_guard::ensure(principal, quotation.garage_id, "quotation")?;

        if quotation.status != QuotationStatus::Accepted {
            return Err(AppError::InvalidState(format!(
                "only accepted quotations can be invoiced, {} is {}",
                quotation.quotation_number, quotation.status
            )));
        }
        if quotation.total_amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(format!(
                "quotation {} has no billable total",
                quotation.quotation_number
            )));
        }

        let invoice = self
            .store
            .insert_invoice(NewInvoice {
                garage_id: quotation.garage_id,
                customer_id: quotation.customer_id,
                vehicle_id: quotation.vehicle_id,
                quotation_id: Some(quotation.id),
                total_amount: quotation.total_amount,
            })
            .await?;

        info!(
            "🧾 Invoice {} issued from quotation {}",
            invoice.invoice_number, quotation.quotation_number
        );
        Ok(invoice)
    }

    pub async fn get_invoice(&self, principal: &Principal, invoice_id: i64) -> AppResult<Invoice> {
        let invoice = self
            .store
            .find_invoice(invoice_id)
            .await?
            .ok_or_else(|| not_found_error("Invoice", invoice_id))?;
        access_guard::ensure(principal, invoice.garage_id, "invoice")?;
        Ok(invoice)
    }

    pub async fn list_invoices(
        &self,
        principal: &Principal,
        garage_id: i64,
    ) -> AppResult<Vec<Invoice>> {
        access_guard::ensure(principal, garage_id, "invoices")?;
        self.store.list_invoices(garage_id).await
    }
}
