//! Store PostgreSQL
//!
//! Cada operación atómica abre su propia transacción. La numeración usa un
//! upsert-incremento sobre `number_sequences`, que Postgres serializa por fila
//! (garage, tipo); el chequeo de sobrepago bloquea la fila de la factura con
//! `FOR UPDATE` antes de sumar los pagos existentes.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::{bounded, LedgerStore};
use crate::models::customer::{Customer, NewCustomer};
use crate::models::garage::{Garage, NewGarage};
use crate::models::gate_pass::{GatePass, NewGatePass};
use crate::models::invoice::{Invoice, NewInvoice};
use crate::models::payment::{NewPayment, Payment};
use crate::models::quotation::{
    NewQuotation, Quotation, QuotationItem, QuotationItemInput, QuotationStatus,
};
use crate::models::sequence::SequenceKind;
use crate::models::vehicle::{NewVehicle, Vehicle};
use crate::utils::errors::{conflict_error, not_found_error, tenant_mismatch_error, AppError, AppResult};

pub struct PgLedgerStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Asignar el siguiente número de la secuencia (garage, tipo)
async fn next_number(
    conn: &mut PgConnection,
    garage_id: i64,
    kind: SequenceKind,
) -> AppResult<String> {
    let (value,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO number_sequences (garage_id, kind, last_value)
        VALUES ($1, $2, 1)
        ON CONFLICT (garage_id, kind)
        DO UPDATE SET last_value = number_sequences.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(garage_id)
    .bind(kind.as_str())
    .fetch_one(&mut *conn)
    .await?;

    Ok(kind.format(value))
}

async fn insert_items(
    conn: &mut PgConnection,
    quotation_id: i64,
    items: Vec<QuotationItemInput>,
) -> AppResult<Vec<QuotationItem>> {
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as::<_, QuotationItem>(
            r#"
            INSERT INTO quotation_items (quotation_id, item_type, item_id, description, quantity, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(quotation_id)
        .bind(item.item_type)
        .bind(item.item_id)
        .bind(item.description)
        .bind(item.quantity)
        .bind(item.price)
        .fetch_one(&mut *conn)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

async fn lock_quotation(conn: &mut PgConnection, quotation_id: i64) -> AppResult<Quotation> {
    sqlx::query_as::<_, Quotation>("SELECT * FROM quotations WHERE id = $1 FOR UPDATE")
        .bind(quotation_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found_error("Quotation", quotation_id))
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn insert_garage(&self, new: NewGarage) -> AppResult<Garage> {
        bounded(self.timeout, "insert_garage", async {
            let garage = sqlx::query_as::<_, Garage>(
                r#"
                INSERT INTO garages (name, address, phone, email)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(new.name)
            .bind(new.address)
            .bind(new.phone)
            .bind(new.email)
            .fetch_one(&self.pool)
            .await?;
            Ok(garage)
        })
        .await
    }

    async fn find_garage(&self, id: i64) -> AppResult<Option<Garage>> {
        bounded(self.timeout, "find_garage", async {
            let garage = sqlx::query_as::<_, Garage>("SELECT * FROM garages WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(garage)
        })
        .await
    }

    async fn list_garages(&self) -> AppResult<Vec<Garage>> {
        bounded(self.timeout, "list_garages", async {
            let garages = sqlx::query_as::<_, Garage>("SELECT * FROM garages ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
            Ok(garages)
        })
        .await
    }

    async fn delete_garage(&self, id: i64) -> AppResult<()> {
        bounded(self.timeout, "delete_garage", async {
            let mut tx = self.pool.begin().await?;

            let exists: Option<(i64,)> =
                sqlx::query_as("SELECT id FROM garages WHERE id = $1 FOR UPDATE")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if exists.is_none() {
                return Err(not_found_error("Garage", id));
            }

            let (has_dependents,): (bool,) = sqlx::query_as(
                r#"
                SELECT EXISTS(SELECT 1 FROM customers WHERE garage_id = $1)
                    OR EXISTS(SELECT 1 FROM vehicles WHERE garage_id = $1)
                    OR EXISTS(SELECT 1 FROM quotations WHERE garage_id = $1)
                    OR EXISTS(SELECT 1 FROM invoices WHERE garage_id = $1)
                    OR EXISTS(SELECT 1 FROM payments WHERE garage_id = $1)
                    OR EXISTS(SELECT 1 FROM gate_passes WHERE garage_id = $1)
                "#,
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            if has_dependents {
                return Err(AppError::Conflict(format!(
                    "garage '{}' still owns ledger records and cannot be deleted",
                    id
                )));
            }

            sqlx::query("DELETE FROM number_sequences WHERE garage_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM garages WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn insert_customer(&self, new: NewCustomer) -> AppResult<Customer> {
        bounded(self.timeout, "insert_customer", async {
            let mut tx = self.pool.begin().await?;

            // FOR SHARE bloquea un delete_garage concurrente hasta el commit
            let garage: Option<(i64,)> =
                sqlx::query_as("SELECT id FROM garages WHERE id = $1 FOR SHARE")
                    .bind(new.garage_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if garage.is_none() {
                return Err(not_found_error("Garage", new.garage_id));
            }

            let customer = sqlx::query_as::<_, Customer>(
                r#"
                INSERT INTO customers (garage_id, first_name, last_name, phone, email, address, company)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(new.garage_id)
            .bind(new.first_name)
            .bind(new.last_name)
            .bind(new.phone)
            .bind(new.email)
            .bind(new.address)
            .bind(new.company)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(customer)
        })
        .await
    }

    async fn find_customer(&self, id: i64) -> AppResult<Option<Customer>> {
        bounded(self.timeout, "find_customer", async {
            let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(customer)
        })
        .await
    }

    async fn list_customers(&self, garage_id: i64) -> AppResult<Vec<Customer>> {
        bounded(self.timeout, "list_customers", async {
            let customers = sqlx::query_as::<_, Customer>(
                "SELECT * FROM customers WHERE garage_id = $1 ORDER BY id",
            )
            .bind(garage_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(customers)
        })
        .await
    }

    async fn insert_vehicle(&self, new: NewVehicle) -> AppResult<Vehicle> {
        bounded(self.timeout, "insert_vehicle", async {
            let mut tx = self.pool.begin().await?;

            let owner: Option<(i64,)> =
                sqlx::query_as("SELECT garage_id FROM customers WHERE id = $1")
                    .bind(new.customer_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            match owner {
                Some((garage_id,)) if garage_id == new.garage_id => {}
                Some(_) => {
                    return Err(tenant_mismatch_error("Customer", new.customer_id, new.garage_id))
                }
                None => return Err(not_found_error("Customer", new.customer_id)),
            }

            let vehicle = sqlx::query_as::<_, Vehicle>(
                r#"
                INSERT INTO vehicles (garage_id, customer_id, registration_number, make, model, year, color)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (garage_id, registration_number) DO NOTHING
                RETURNING *
                "#,
            )
            .bind(new.garage_id)
            .bind(new.customer_id)
            .bind(&new.registration_number)
            .bind(new.make)
            .bind(new.model)
            .bind(new.year)
            .bind(new.color)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                conflict_error("Vehicle", "registration number", &new.registration_number)
            })?;

            tx.commit().await?;
            Ok(vehicle)
        })
        .await
    }

    async fn find_vehicle(&self, id: i64) -> AppResult<Option<Vehicle>> {
        bounded(self.timeout, "find_vehicle", async {
            let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(vehicle)
        })
        .await
    }

    async fn list_vehicles(&self, garage_id: i64) -> AppResult<Vec<Vehicle>> {
        bounded(self.timeout, "list_vehicles", async {
            let vehicles = sqlx::query_as::<_, Vehicle>(
                "SELECT * FROM vehicles WHERE garage_id = $1 ORDER BY id",
            )
            .bind(garage_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(vehicles)
        })
        .await
    }

    async fn insert_quotation(
        &self,
        new: NewQuotation,
        items: Vec<QuotationItemInput>,
    ) -> AppResult<(Quotation, Vec<QuotationItem>)> {
        bounded(self.timeout, "insert_quotation", async {
            let mut tx = self.pool.begin().await?;

            let number = next_number(&mut tx, new.garage_id, SequenceKind::Quotation).await?;
            let quotation = sqlx::query_as::<_, Quotation>(
                r#"
                INSERT INTO quotations (garage_id, customer_id, vehicle_id, quotation_number, status, valid_until, total_amount, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                "#,
            )
            .bind(new.garage_id)
            .bind(new.customer_id)
            .bind(new.vehicle_id)
            .bind(number)
            .bind(QuotationStatus::Draft)
            .bind(new.valid_until)
            .bind(new.total_amount)
            .bind(new.notes)
            .fetch_one(&mut *tx)
            .await?;

            let items = insert_items(&mut tx, quotation.id, items).await?;

            // Si algo falla antes de aquí, el drop de `tx` hace rollback completo
            tx.commit().await?;
            Ok((quotation, items))
        })
        .await
    }

    async fn find_quotation(&self, id: i64) -> AppResult<Option<Quotation>> {
        bounded(self.timeout, "find_quotation", async {
            let quotation = sqlx::query_as::<_, Quotation>("SELECT * FROM quotations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(quotation)
        })
        .await
    }

    async fn quotation_items(&self, quotation_id: i64) -> AppResult<Vec<QuotationItem>> {
        bounded(self.timeout, "quotation_items", async {
            let items = sqlx::query_as::<_, QuotationItem>(
                "SELECT * FROM quotation_items WHERE quotation_id = $1 ORDER BY id",
            )
            .bind(quotation_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(items)
        })
        .await
    }

    async fn list_quotations(&self, garage_id: i64) -> AppResult<Vec<Quotation>> {
        bounded(self.timeout, "list_quotations", async {
            let quotations = sqlx::query_as::<_, Quotation>(
                "SELECT * FROM quotations WHERE garage_id = $1 ORDER BY created_at DESC, id DESC",
            )
            .bind(garage_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(quotations)
        })
        .await
    }

    async fn replace_quotation_items(
        &self,
        quotation_id: i64,
        items: Vec<QuotationItemInput>,
        total_amount: Decimal,
    ) -> AppResult<(Quotation, Vec<QuotationItem>)> {
        bounded(self.timeout, "replace_quotation_items", async {
            let mut tx = self.pool.begin().await?;

            let current = lock_quotation(&mut tx, quotation_id).await?;
            current.status.ensure_items_editable()?;

            sqlx::query("DELETE FROM quotation_items WHERE quotation_id = $1")
                .bind(quotation_id)
                .execute(&mut *tx)
                .await?;
            let items = insert_items(&mut tx, quotation_id, items).await?;

            let quotation = sqlx::query_as::<_, Quotation>(
                "UPDATE quotations SET total_amount = $2 WHERE id = $1 RETURNING *",
            )
            .bind(quotation_id)
            .bind(total_amount)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok((quotation, items))
        })
        .await
    }

    async fn update_quotation_status(
        &self,
        quotation_id: i64,
        to: QuotationStatus,
    ) -> AppResult<Quotation> {
        bounded(self.timeout, "update_quotation_status", async {
            let mut tx = self.pool.begin().await?;

            let current = lock_quotation(&mut tx, quotation_id).await?;
            current.status.ensure_transition(to)?;

            let quotation = sqlx::query_as::<_, Quotation>(
                "UPDATE quotations SET status = $2 WHERE id = $1 RETURNING *",
            )
            .bind(quotation_id)
            .bind(to)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(quotation)
        })
        .await
    }

    async fn insert_invoice(&self, new: NewInvoice) -> AppResult<Invoice> {
        bounded(self.timeout, "insert_invoice", async {
            let mut tx = self.pool.begin().await?;

            let number = next_number(&mut tx, new.garage_id, SequenceKind::Invoice).await?;
            // La unicidad de quotation_id la garantiza el índice único
            let invoice = sqlx::query_as::<_, Invoice>(
                r#"
                INSERT INTO invoices (garage_id, customer_id, vehicle_id, quotation_id, invoice_number, total_amount)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(new.garage_id)
            .bind(new.customer_id)
            .bind(new.vehicle_id)
            .bind(new.quotation_id)
            .bind(number)
            .bind(new.total_amount)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(invoice)
        })
        .await
    }

    async fn find_invoice(&self, id: i64) -> AppResult<Option<Invoice>> {
        bounded(self.timeout, "find_invoice", async {
            let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(invoice)
        })
        .await
    }

    async fn list_invoices(&self, garage_id: i64) -> AppResult<Vec<Invoice>> {
        bounded(self.timeout, "list_invoices", async {
            let invoices = sqlx::query_as::<_, Invoice>(
                "SELECT * FROM invoices WHERE garage_id = $1 ORDER BY created_at DESC, id DESC",
            )
            .bind(garage_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(invoices)
        })
        .await
    }

    async fn insert_payment(&self, new: NewPayment) -> AppResult<Payment> {
        bounded(self.timeout, "insert_payment", async {
            let mut tx = self.pool.begin().await?;

            // Bloqueo de la factura: dos pagos concurrentes se serializan aquí
            let invoice = sqlx::query_as::<_, Invoice>(
                "SELECT * FROM invoices WHERE id = $1 FOR UPDATE",
            )
            .bind(new.invoice_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Invoice", new.invoice_id))?;
            if invoice.garage_id != new.garage_id {
                return Err(tenant_mismatch_error("Invoice", invoice.id, new.garage_id));
            }

            let (paid,): (Decimal,) = sqlx::query_as(
                "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE invoice_id = $1",
            )
            .bind(invoice.id)
            .fetch_one(&mut *tx)
            .await?;
            invoice.ensure_accepts_payment(paid, new.amount)?;

            let number = next_number(&mut tx, new.garage_id, SequenceKind::Payment).await?;
            let payment = sqlx::query_as::<_, Payment>(
                r#"
                INSERT INTO payments (invoice_id, garage_id, payment_number, amount, payment_method, reference, received_by, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                "#,
            )
            .bind(new.invoice_id)
            .bind(new.garage_id)
            .bind(number)
            .bind(new.amount)
            .bind(new.payment_method)
            .bind(new.reference)
            .bind(new.received_by)
            .bind(new.notes)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(payment)
        })
        .await
    }

    async fn find_payment(&self, id: i64) -> AppResult<Option<Payment>> {
        bounded(self.timeout, "find_payment", async {
            let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(payment)
        })
        .await
    }

    async fn payments_for_invoice(&self, invoice_id: i64) -> AppResult<Vec<Payment>> {
        bounded(self.timeout, "payments_for_invoice", async {
            let payments = sqlx::query_as::<_, Payment>(
                "SELECT * FROM payments WHERE invoice_id = $1 ORDER BY id",
            )
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(payments)
        })
        .await
    }

    async fn paid_total(&self, invoice_id: i64) -> AppResult<Decimal> {
        bounded(self.timeout, "paid_total", async {
            let (paid,): (Decimal,) = sqlx::query_as(
                "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE invoice_id = $1",
            )
            .bind(invoice_id)
            .fetch_one(&self.pool)
            .await?;
            Ok(paid)
        })
        .await
    }

    async fn insert_gate_pass(&self, new: NewGatePass) -> AppResult<GatePass> {
        bounded(self.timeout, "insert_gate_pass", async {
            let mut tx = self.pool.begin().await?;

            let number = next_number(&mut tx, new.garage_id, SequenceKind::GatePass).await?;
            let pass = sqlx::query_as::<_, GatePass>(
                r#"
                INSERT INTO gate_passes (garage_id, customer_id, vehicle_id, pass_number, purpose, security_notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(new.garage_id)
            .bind(new.customer_id)
            .bind(new.vehicle_id)
            .bind(number)
            .bind(new.purpose)
            .bind(new.security_notes)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(pass)
        })
        .await
    }

    async fn find_gate_pass(&self, id: i64) -> AppResult<Option<GatePass>> {
        bounded(self.timeout, "find_gate_pass", async {
            let pass = sqlx::query_as::<_, GatePass>("SELECT * FROM gate_passes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(pass)
        })
        .await
    }

    async fn list_gate_passes(&self, garage_id: i64) -> AppResult<Vec<GatePass>> {
        bounded(self.timeout, "list_gate_passes", async {
            let passes = sqlx::query_as::<_, GatePass>(
                "SELECT * FROM gate_passes WHERE garage_id = $1 ORDER BY created_at DESC, id DESC",
            )
            .bind(garage_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(passes)
        })
        .await
    }
}
