//! Services module
//!
//! Este módulo contiene la lógica de negocio del ledger. Cada servicio
//! recibe el `Principal` ya autenticado, aplica el Access Guard y delega la
//! persistencia en un `LedgerStore`.

pub mod access_guard;
pub mod directory_service;
pub mod gate_pass_service;
pub mod invoice_service;
pub mod payment_service;
pub mod quotation_service;

use std::sync::Arc;

use crate::repositories::LedgerStore;

pub use directory_service::DirectoryService;
pub use gate_pass_service::GatePassService;
pub use invoice_service::InvoiceService;
pub use payment_service::{PaymentDraft, PaymentService};
pub use quotation_service::{QuotationDraft, QuotationService};

/// Conjunto de servicios sobre un mismo store
#[derive(Clone)]
pub struct LedgerServices {
    pub directory: DirectoryService,
    pub quotations: QuotationService,
    pub invoices: InvoiceService,
    pub payments: PaymentService,
    pub gate_passes: GatePassService,
}

impl LedgerServices {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            directory: DirectoryService::new(store.clone()),
            quotations: QuotationService::new(store.clone()),
            invoices: InvoiceService::new(store.clone()),
            payments: PaymentService::new(store.clone()),
            gate_passes: GatePassService::new(store),
        }
    }
}
