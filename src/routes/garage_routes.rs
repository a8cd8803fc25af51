use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::dto::directory_dto::CreateGarageRequest;
use crate::dto::ApiResponse;
use crate::models::auth::Principal;
use crate::models::garage::Garage;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_garage_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_garages).post(create_garage))
        .route("/:id", get(get_garage).delete(delete_garage))
}

async fn create_garage(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateGarageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Garage>>), AppError> {
    request.validate()?;
    let garage = state
        .services
        .directory
        .create_garage(&principal, request.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(garage, "Garage created")),
    ))
}

async fn list_garages(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<ApiResponse<Vec<Garage>>>, AppError> {
    let garages = state.services.directory.list_garages(&principal).await?;
    Ok(Json(ApiResponse::success(garages)))
}

async fn get_garage(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Garage>>, AppError> {
    let garage = state.services.directory.get_garage(&principal, id).await?;
    Ok(Json(ApiResponse::success(garage)))
}

async fn delete_garage(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.services.directory.delete_garage(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
