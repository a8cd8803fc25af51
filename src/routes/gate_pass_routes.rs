use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::dto::gate_pass_dto::IssueGatePassRequest;
use crate::dto::{ApiResponse, GarageQuery};
use crate::models::auth::Principal;
use crate::models::gate_pass::GatePass;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_gate_pass_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_gate_passes).post(issue_gate_pass))
        .route("/:id", get(get_gate_pass))
}

async fn issue_gate_pass(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<IssueGatePassRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GatePass>>), AppError> {
    request.validate()?;
    let garage_id = principal.resolve_garage(request.garage_id)?;
    let pass = state
        .services
        .gate_passes
        .issue_pass(&principal, request.into_new(garage_id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(pass, "Gate pass issued")),
    ))
}

async fn list_gate_passes(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<GarageQuery>,
) -> Result<Json<ApiResponse<Vec<GatePass>>>, AppError> {
    let garage_id = principal.resolve_garage(query.garage_id)?;
    let passes = state
        .services
        .gate_passes
        .list_gate_passes(&principal, garage_id)
        .await?;
    Ok(Json(ApiResponse::success(passes)))
}

async fn get_gate_pass(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<GatePass>>, AppError> {
    let pass = state.services.gate_passes.get_gate_pass(&principal, id).await?;
    Ok(Json(ApiResponse::success(pass)))
}
