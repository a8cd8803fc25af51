use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::dto::quotation_dto::{CreateQuotationRequest, TransitionRequest, UpdateItemsRequest};
use crate::dto::{ApiResponse, GarageQuery};
use crate::models::auth::Principal;
use crate::models::invoice::Invoice;
use crate::models::quotation::{QuotationSummary, QuotationView};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_quotation_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quotations).post(create_quotation))
        .route("/:id", get(get_quotation))
        .route("/:id/items", put(update_items))
        .route("/:id/transition", post(transition))
        .route("/:id/invoice", post(invoice_quotation))
}

async fn create_quotation(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateQuotationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<QuotationView>>), AppError> {
    request.validate()?;
    let garage_id = principal.resolve_garage(request.garage_id)?;
    let view = state
        .services
        .quotations
        .create_quotation(&principal, request.into_draft(garage_id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(view, "Quotation created")),
    ))
}

async fn list_quotations(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<GarageQuery>,
) -> Result<Json<ApiResponse<Vec<QuotationSummary>>>, AppError> {
    let garage_id = principal.resolve_garage(query.garage_id)?;
    let rows = state
        .services
        .quotations
        .list_quotations(&principal, garage_id)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

async fn get_quotation(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<QuotationView>>, AppError> {
    let view = state.services.quotations.get_quotation(&principal, id).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn update_items(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(request): Json<UpdateItemsRequest>,
) -> Result<Json<ApiResponse<QuotationView>>, AppError> {
    let view = state
        .services
        .quotations
        .update_items(&principal, id, request.items)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn transition(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<ApiResponse<QuotationView>>, AppError> {
    let view = state
        .services
        .quotations
        .transition(&principal, id, request.status)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn invoice_quotation(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ApiResponse<Invoice>>), AppError> {
    let invoice = state
        .services
        .invoices
        .invoice_from_quotation(&principal, id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(invoice, "Invoice issued")),
    ))
}
