use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::dto::directory_dto::CreateCustomerRequest;
use crate::dto::{ApiResponse, GarageQuery};
use crate::models::auth::Principal;
use crate::models::customer::Customer;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_customer_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer))
}

async fn create_customer(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Customer>>), AppError> {
    request.validate()?;
    let garage_id = principal.resolve_garage(request.garage_id)?;
    let customer = state
        .services
        .directory
        .register_customer(&principal, request.into_new(garage_id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(customer, "Customer registered")),
    ))
}

async fn list_customers(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<GarageQuery>,
) -> Result<Json<ApiResponse<Vec<Customer>>>, AppError> {
    let garage_id = principal.resolve_garage(query.garage_id)?;
    let customers = state
        .services
        .directory
        .list_customers(&principal, garage_id)
        .await?;
    Ok(Json(ApiResponse::success(customers)))
}

async fn get_customer(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let customer = state.services.directory.get_customer(&principal, id).await?;
    Ok(Json(ApiResponse::success(customer)))
}
