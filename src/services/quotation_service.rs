//! Motor de cotizaciones
//!
//! Creación con total derivado de las líneas, edición de líneas mientras la
//! cotización está abierta y transiciones de estado. El estado `expired`
//! solo existe en lectura.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::auth::Principal;
use crate::models::quotation::{
    compute_total, NewQuotation, Quotation, QuotationItemInput, QuotationStatus,
    QuotationSummary, QuotationView,
};
use crate::repositories::LedgerStore;
use crate::services::access_guard;
use crate::services::directory_service::ensure_parties;
use crate::utils::errors::{not_found_error, AppResult};

/// Datos de una cotización nueva
#[derive(Debug, Clone)]
pub struct QuotationDraft {
    pub garage_id: i64,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub valid_until: DateTime<Utc>,
    pub items: Vec<QuotationItemInput>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct QuotationService {
    store: Arc<dyn LedgerStore>,
}

impl QuotationService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn create_quotation(
        &self,
        principal: &Principal,
        draft: QuotationDraft,
    ) -> AppResult<QuotationView> {
        access_guard::ensure(principal, draft.garage_id, "quotations")?;
        ensure_parties(
            self.store.as_ref(),
            draft.garage_id,
            draft.customer_id,
            draft.vehicle_id,
        )
        .await?;
        let total_amount = compute_total(&draft.items)?;

        let new = NewQuotation {
            garage_id: draft.garage_id,
            customer_id: draft.customer_id,
            vehicle_id: draft.vehicle_id,
            valid_until: draft.valid_until,
            total_amount,
            notes: draft.notes,
        };
        let (quotation, items) = self.store.insert_quotation(new, draft.items).await?;

        info!(
            "📝 Quotation {} created for garage {} (total {})",
            quotation.quotation_number, quotation.garage_id, quotation.total_amount
        );
        Ok(QuotationView::new(quotation, items, Utc::now()))
    }

    /// Reemplaza las líneas y recalcula el total
    pub async fn update_items(
        &self,
        principal: &Principal,
        quotation_id: i64,
        items: Vec<QuotationItemInput>,
    ) -> AppResult<QuotationView> {
        let current = self.load(principal, quotation_id).await?;
        current.status.ensure_items_editable()?;
        let total_amount = compute_total(&items)?;

        let (quotation, items) = self
            .store
            .replace_quotation_items(quotation_id, items, total_amount)
            .await?;

        info!(
            "✏️ Quotation {} items replaced (total {})",
            quotation.quotation_number, quotation.total_amount
        );
        Ok(QuotationView::new(quotation, items, Utc::now()))
    }

    pub async fn transition(
        &self,
        principal: &Principal,
        quotation_id: i64,
        to: QuotationStatus,
    ) -> AppResult<QuotationView> {
        let current = self.load(principal, quotation_id).await?;
        current.status.ensure_transition(to)?;

        let quotation = self.store.update_quotation_status(quotation_id, to).await?;
        let items = self.store.quotation_items(quotation_id).await?;

        info!(
            "🔁 Quotation {} moved {} -> {}",
            quotation.quotation_number, current.status, quotation.status
        );
        Ok(QuotationView::new(quotation, items, Utc::now()))
    }

    pub async fn get_quotation(
        &self,
        principal: &Principal,
        quotation_id: i64,
    ) -> AppResult<QuotationView> {
        let quotation = self.load(principal, quotation_id).await?;
        let items = self.store.quotation_items(quotation_id).await?;
        Ok(QuotationView::new(quotation, items, Utc::now()))
    }

    pub async fn list_quotations(
        &self,
        principal: &Principal,
        garage_id: i64,
    ) -> AppResult<Vec<QuotationSummary>> {
        access_guard::ensure(principal, garage_id, "quotations")?;
        let now = Utc::now();
        Ok(self
            .store
            .list_quotations(garage_id)
            .await?
            .into_iter()
            .map(|q| QuotationSummary::new(q, now))
            .collect())
    }

    /// Cargar y verificar acceso
    pub(crate) async fn load(&self, principal: &Principal, quotation_id: i64) -> AppResult<Quotation> {
        let quotation = self
            .store
            .find_quotation(quotation_id)
            .await?
            .ok_or_else(|| not_found_error("Quotation", quotation_id))?;
        access_guard::ensure(principal, quotation.garage_id, "quotation")?;
        Ok(quotation)
    }
}
