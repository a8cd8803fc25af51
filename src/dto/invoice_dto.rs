use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::payment::PaymentMethod;

// Request para crear una factura directa (sin cotización)
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub garage_id: Option<i64>,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub total_amount: Decimal,
}

// Request para registrar un pago; received_by sale del token
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[validate(length(max = 255))]
    pub reference: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}
