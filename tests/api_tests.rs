use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use garage_ledger::build_router;
use garage_ledger::config::environment::{EnvironmentConfig, StoreBackend};
use garage_ledger::models::auth::TenantScope;
use garage_ledger::repositories::MemoryLedgerStore;
use garage_ledger::state::AppState;
use garage_ledger::utils::jwt::{generate_token, JwtConfig};

const SECRET: &str = "integration-test-secret";

fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        jwt_secret: SECRET.to_string(),
        jwt_expiration: 3600,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout: Duration::from_secs(5),
        store_timeout: Duration::from_secs(1),
        store_backend: StoreBackend::Memory,
        log_level: tracing::Level::INFO,
    }
}

fn create_test_app() -> Router {
    build_router(AppState::new(Arc::new(MemoryLedgerStore::new()), test_config()))
}

fn token(user_id: i64, scope: TenantScope) -> String {
    let config = JwtConfig {
        secret: SECRET.to_string(),
        expiration: 3600,
    };
    generate_token(user_id, scope, &config).unwrap()
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Crea garage, cliente y vehículo; devuelve (garage_id, customer_id, vehicle_id)
async fn seed(app: &Router, admin: &str, plate: &str) -> (i64, i64, i64) {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/garages",
        Some(admin),
        Some(json!({
            "name": "Central Motors",
            "address": "12 Station Road",
            "phone": "555-0100",
            "email": "desk@central.test"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let garage_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        app,
        Method::POST,
        "/api/customers",
        Some(admin),
        Some(json!({
            "garage_id": garage_id,
            "first_name": "Lucia",
            "last_name": "Fernandez",
            "phone": "555-0123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let customer_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        app,
        Method::POST,
        "/api/vehicles",
        Some(admin),
        Some(json!({
            "garage_id": garage_id,
            "customer_id": customer_id,
            "registration_number": plate,
            "make": "Seat",
            "model": "Ibiza"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let vehicle_id = body["data"]["id"].as_i64().unwrap();

    (garage_id, customer_id, vehicle_id)
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
    let app = create_test_app();
    let (status, body) = call(&app, Method::GET, "/api/invoices/1", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let (status, _) = call(&app, Method::GET, "/api/invoices/1", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_quote_invoice_and_pay_over_http() {
    let app = create_test_app();
    let admin = token(1, TenantScope::AllGarages);
    let (garage_id, customer_id, vehicle_id) = seed(&app, &admin, "ab 123 cd").await;
    let staff = token(2, TenantScope::Garage(garage_id));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/quotations",
        Some(&staff),
        Some(json!({
            "customer_id": customer_id,
            "vehicle_id": vehicle_id,
            "valid_until": "2099-01-01T00:00:00Z",
            "items": [
                {"item_type": "part", "item_id": 7, "description": "Filter", "quantity": 2, "price": "100.00"},
                {"item_type": "custom", "description": "Labour", "quantity": 1, "price": "50.00"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["quotation"]["quotation_number"], "QUO-000001");
    assert_eq!(body["data"]["quotation"]["total_amount"], "250.00");
    assert_eq!(body["data"]["effective_status"], "draft");
    let quotation_id = body["data"]["quotation"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/quotations/{}/transition", quotation_id),
        Some(&staff),
        Some(json!({"status": "accepted"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ILLEGAL_TRANSITION");

    for next in ["sent", "accepted"] {
        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/quotations/{}/transition", quotation_id),
            Some(&staff),
            Some(json!({"status": next})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/quotations/{}/invoice", quotation_id),
        Some(&staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["invoice_number"], "INV-000001");
    let invoice_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/invoices/{}/payments", invoice_id),
        Some(&staff),
        Some(json!({"amount": "300.00", "payment_method": "cash"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "OVER_PAYMENT");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/invoices/{}/payments", invoice_id),
        Some(&staff),
        Some(json!({"amount": "100.00", "payment_method": "bank_transfer"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_REFERENCE");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/invoices/{}/payments", invoice_id),
        Some(&staff),
        Some(json!({"amount": "100.00", "payment_method": "bank_transfer", "reference": "TRX-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["payment_number"], "PAY-000001");
    assert_eq!(body["data"]["received_by"], 2);
    let payment_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/invoices/{}/balance", invoice_id),
        Some(&staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["remaining"], "150.00");

    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/api/payments/{}", payment_id),
        Some(&staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cross_tenant_access_is_forbidden() {
    let app = create_test_app();
    let admin = token(1, TenantScope::AllGarages);
    let (garage_id, customer_id, vehicle_id) = seed(&app, &admin, "GP 1").await;
    let (other_garage, _, _) = seed(&app, &admin, "GP 2").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/gate-passes",
        Some(&admin),
        Some(json!({
            "garage_id": garage_id,
            "customer_id": customer_id,
            "vehicle_id": vehicle_id,
            "purpose": "Collected by owner"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["pass_number"], "GP-000001");
    let pass_id = body["data"]["id"].as_i64().unwrap();

    let outsider = token(3, TenantScope::Garage(other_garage));
    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/gate-passes/{}", pass_id),
        Some(&outsider),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/api/customers?garage_id={}", garage_id),
        Some(&outsider),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Un admin debe indicar el garage en los listados
    let (status, body) = call(&app, Method::GET, "/api/invoices", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_garage_with_records_cannot_be_deleted() {
    let app = create_test_app();
    let admin = token(1, TenantScope::AllGarages);
    let (garage_id, _, _) = seed(&app, &admin, "DEL 1").await;

    let staff = token(5, TenantScope::Garage(garage_id));
    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/garages/{}", garage_id),
        Some(&staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &app,
        Method::DELETE,
        &format!("/api/garages/{}", garage_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_invalid_request_body_reports_validation_details() {
    let app = create_test_app();
    let admin = token(1, TenantScope::AllGarages);
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/garages",
        Some(&admin),
        Some(json!({
            "name": "",
            "address": "Somewhere",
            "phone": "555-0100",
            "email": "not-an-email"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"].is_object());
}
