use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::dto::directory_dto::CreateVehicleRequest;
use crate::dto::{ApiResponse, GarageQuery};
use crate::models::auth::Principal;
use crate::models::vehicle::Vehicle;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/:id", get(get_vehicle))
}

async fn create_vehicle(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    request.validate()?;
    let garage_id = principal.resolve_garage(request.garage_id)?;
    let vehicle = state
        .services
        .directory
        .register_vehicle(&principal, request.into_new(garage_id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(vehicle, "Vehicle registered")),
    ))
}

async fn list_vehicles(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<GarageQuery>,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, AppError> {
    let garage_id = principal.resolve_garage(query.garage_id)?;
    let vehicles = state
        .services
        .directory
        .list_vehicles(&principal, garage_id)
        .await?;
    Ok(Json(ApiResponse::success(vehicles)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let vehicle = state.services.directory.get_vehicle(&principal, id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}
