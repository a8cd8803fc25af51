//! Tests contra PostgreSQL real.
//!
//! Requieren `DATABASE_URL` apuntando a una base desechable:
//! `cargo test --test pg_store -- --ignored`

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use futures::future::join_all;
use rust_decimal::Decimal;

use garage_ledger::config::database::DatabaseConfig;
use garage_ledger::database;
use garage_ledger::models::customer::NewCustomer;
use garage_ledger::models::garage::NewGarage;
use garage_ledger::models::invoice::NewInvoice;
use garage_ledger::models::payment::{NewPayment, PaymentMethod};
use garage_ledger::models::quotation::{ItemType, NewQuotation, QuotationItemInput};
use garage_ledger::models::vehicle::NewVehicle;
use garage_ledger::repositories::{LedgerStore, PgLedgerStore};
use garage_ledger::utils::errors::AppError;

async fn store() -> Arc<PgLedgerStore> {
    let config = DatabaseConfig::from_env().unwrap();
    let pool = database::connect(&config).await.unwrap();
    database::run_migrations(&pool).await.unwrap();
    Arc::new(PgLedgerStore::new(pool, Duration::from_secs(5)))
}

/// Garage nuevo con un cliente y su vehículo
async fn parties_fixture(store: &PgLedgerStore) -> (i64, i64, i64) {
    let garage = store
        .insert_garage(NewGarage {
            name: "Pg Motors".to_string(),
            address: "3 Dock Lane".to_string(),
            phone: "555-0300".to_string(),
            email: "pg@garage.test".to_string(),
        })
        .await
        .unwrap();
    let customer = store
        .insert_customer(NewCustomer {
            garage_id: garage.id,
            first_name: "Jon".to_string(),
            last_name: "Snow".to_string(),
            phone: "555-0301".to_string(),
            email: None,
            address: None,
            company: None,
        })
        .await
        .unwrap();
    let vehicle = store
        .insert_vehicle(NewVehicle {
            garage_id: garage.id,
            customer_id: customer.id,
            registration_number: format!("PG {}", garage.id),
            make: "Volvo".to_string(),
            model: "V60".to_string(),
            year: None,
            color: None,
        })
        .await
        .unwrap();
    (garage.id, customer.id, vehicle.id)
}

/// Garage nuevo con una factura de 100.00
async fn invoice_fixture(store: &PgLedgerStore) -> (i64, i64) {
    let (garage_id, customer_id, vehicle_id) = parties_fixture(store).await;
    let invoice = store
        .insert_invoice(NewInvoice {
            garage_id,
            customer_id,
            vehicle_id,
            quotation_id: None,
            total_amount: Decimal::new(10000, 2),
        })
        .await
        .unwrap();
    (garage_id, invoice.id)
}

fn line(description: &str, quantity: i32) -> QuotationItemInput {
    QuotationItemInput {
        item_type: ItemType::Part,
        item_id: None,
        description: description.to_string(),
        quantity,
        price: Decimal::new(1500, 2),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_concurrent_payments_are_serialized_per_invoice() {
    let store = store().await;
    let (garage_id, invoice_id) = invoice_fixture(&store).await;

    let tasks = (0..8).map(|_| {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .insert_payment(NewPayment {
                    invoice_id,
                    garage_id,
                    amount: Decimal::new(2500, 2),
                    payment_method: PaymentMethod::Cash,
                    reference: None,
                    received_by: None,
                    notes: None,
                })
                .await
        })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let numbers: HashSet<String> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|p| p.payment_number().to_string())
        .collect();
    assert_eq!(numbers.len(), 4);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(AppError::OverPayment(_)))));
    assert_eq!(
        store.paid_total(invoice_id).await.unwrap(),
        Decimal::new(10000, 2)
    );
}

#[tokio::test]
#[ignore]
async fn test_payments_are_append_only() {
    let store = store().await;
    let (garage_id, invoice_id) = invoice_fixture(&store).await;
    let payment = store
        .insert_payment(NewPayment {
            invoice_id,
            garage_id,
            amount: Decimal::ONE,
            payment_method: PaymentMethod::Cash,
            reference: None,
            received_by: None,
            notes: None,
        })
        .await
        .unwrap();

    let update = sqlx::query("UPDATE payments SET amount = 0 WHERE id = $1")
        .bind(payment.id())
        .execute(store.pool())
        .await;
    assert!(update.is_err());
}

#[tokio::test]
#[ignore]
async fn test_customer_for_missing_garage_is_not_found() {
    let store = store().await;
    let result = store
        .insert_customer(NewCustomer {
            garage_id: i64::MAX,
            first_name: "Arya".to_string(),
            last_name: "Stark".to_string(),
            phone: "555-0302".to_string(),
            email: None,
            address: None,
            company: None,
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore]
async fn test_rejected_item_rolls_back_quotation_and_number() {
    let store = store().await;
    let (garage_id, customer_id, vehicle_id) = parties_fixture(&store).await;
    let quotation = |total: Decimal| NewQuotation {
        garage_id,
        customer_id,
        vehicle_id,
        valid_until: Utc::now() + chrono::Duration::days(7),
        total_amount: total,
        notes: None,
    };

    // La segunda línea viola CHECK (quantity > 0) después de numerar
    let failed = store
        .insert_quotation(
            quotation(Decimal::new(1500, 2)),
            vec![line("Filter", 1), line("Gasket", 0)],
        )
        .await;
    assert!(failed.is_err());
    assert!(store.list_quotations(garage_id).await.unwrap().is_empty());

    let (created, items) = store
        .insert_quotation(quotation(Decimal::new(1500, 2)), vec![line("Filter", 1)])
        .await
        .unwrap();
    assert_eq!(created.quotation_number, "QUO-000001");
    assert_eq!(items.len(), 1);
    assert_eq!(store.list_quotations(garage_id).await.unwrap().len(), 1);
}
