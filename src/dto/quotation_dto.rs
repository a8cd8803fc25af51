use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::quotation::{QuotationItemInput, QuotationStatus};
use crate::services::QuotationDraft;

// Las líneas se validan en el modelo (InvalidItem), no aquí
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuotationRequest {
    pub garage_id: Option<i64>,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub valid_until: DateTime<Utc>,
    pub items: Vec<QuotationItemInput>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl CreateQuotationRequest {
    pub fn into_draft(self, garage_id: i64) -> QuotationDraft {
        QuotationDraft {
            garage_id,
            customer_id: self.customer_id,
            vehicle_id: self.vehicle_id,
            valid_until: self.valid_until,
            items: self.items,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemsRequest {
    pub items: Vec<QuotationItemInput>,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: QuotationStatus,
}
