//! Rutas HTTP
//!
//! Un router por recurso, anidados bajo `/api`.

pub mod customer_routes;
pub mod garage_routes;
pub mod gate_pass_routes;
pub mod invoice_routes;
pub mod payment_routes;
pub mod quotation_routes;
pub mod vehicle_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Router completo de la API, sin capas transversales
pub fn create_api_router() -> Router<AppState> {
    let api = Router::new()
        .nest("/garages", garage_routes::create_garage_router())
        .nest("/customers", customer_routes::create_customer_router())
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/quotations", quotation_routes::create_quotation_router())
        .nest("/invoices", invoice_routes::create_invoice_router())
        .nest("/payments", payment_routes::create_payment_router())
        .nest("/gate-passes", gate_pass_routes::create_gate_pass_router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
