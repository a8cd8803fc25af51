use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::dto::invoice_dto::{CreateInvoiceRequest, RecordPaymentRequest};
use crate::dto::{ApiResponse, GarageQuery};
use crate::models::auth::Principal;
use crate::models::invoice::{Invoice, InvoiceBalance};
use crate::models::payment::Payment;
use crate::services::PaymentDraft;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_invoice_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/:id", get(get_invoice))
        .route("/:id/balance", get(invoice_balance))
        .route("/:id/payments", get(list_payments).post(record_payment))
}

async fn create_invoice(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Invoice>>), AppError> {
    let garage_id = principal.resolve_garage(request.garage_id)?;
    let invoice = state
        .services
        .invoices
        .create_invoice(
            &principal,
            garage_id,
            request.customer_id,
            request.vehicle_id,
            request.total_amount,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(invoice, "Invoice created")),
    ))
}

async fn list_invoices(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<GarageQuery>,
) -> Result<Json<ApiResponse<Vec<Invoice>>>, AppError> {
    let garage_id = principal.resolve_garage(query.garage_id)?;
    let invoices = state
        .services
        .invoices
        .list_invoices(&principal, garage_id)
        .await?;
    Ok(Json(ApiResponse::success(invoices)))
}

async fn get_invoice(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Invoice>>, AppError> {
    let invoice = state.services.invoices.get_invoice(&principal, id).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

async fn invoice_balance(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<InvoiceBalance>>, AppError> {
    let balance = state.services.payments.invoice_balance(&principal, id).await?;
    Ok(Json(ApiResponse::success(balance)))
}

async fn list_payments(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, AppError> {
    let payments = state.services.payments.list_payments(&principal, id).await?;
    Ok(Json(ApiResponse::success(payments)))
}

async fn record_payment(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), AppError> {
    request.validate()?;
    let draft = PaymentDraft {
        amount: request.amount,
        payment_method: request.payment_method,
        reference: request.reference,
        received_by: Some(principal.user_id),
        notes: request.notes,
    };
    let payment = state
        .services
        .payments
        .record_payment(&principal, id, draft)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(payment, "Payment recorded")),
    ))
}
