use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::dto::ApiResponse;
use crate::models::auth::Principal;
use crate::models::payment::Payment;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_payment_router() -> Router<AppState> {
    Router::new().route("/:id", get(get_payment))
}

async fn get_payment(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let payment = state.services.payments.get_payment(&principal, id).await?;
    Ok(Json(ApiResponse::success(payment)))
}
