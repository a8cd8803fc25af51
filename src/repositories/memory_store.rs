//! Store en memoria
//!
//! Un único `Mutex` serializa todas las escrituras, lo que equivale a una
//! transacción serializable: cada operación valida todo antes de mutar, así
//! que un error nunca deja estado a medias.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, MutexGuard};

use super::{bounded, LedgerStore, DEFAULT_STORE_TIMEOUT};
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

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    sequences: HashMap<(i64, SequenceKind), i64>,
    garages: BTreeMap<i64, Garage>,
    customers: BTreeMap<i64, Customer>,
    vehicles: BTreeMap<i64, Vehicle>,
    quotations: BTreeMap<i64, Quotation>,
    quotation_items: BTreeMap<i64, QuotationItem>,
    invoices: BTreeMap<i64, Invoice>,
    payments: BTreeMap<i64, Payment>,
    gate_passes: BTreeMap<i64, GatePass>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Equivalente al upsert-incremento de `number_sequences`
    fn next_number(&mut self, garage_id: i64, kind: SequenceKind) -> String {
        let value = self.sequences.entry((garage_id, kind)).or_insert(0);
        *value += 1;
        kind.format(*value)
    }

    fn has_dependents(&self, garage_id: i64) -> bool {
        self.customers.values().any(|c| c.garage_id == garage_id)
            || self.vehicles.values().any(|v| v.garage_id == garage_id)
            || self.quotations.values().any(|q| q.garage_id == garage_id)
            || self.invoices.values().any(|i| i.garage_id == garage_id)
            || self.payments.values().any(|p| p.garage_id() == garage_id)
            || self.gate_passes.values().any(|g| g.garage_id() == garage_id)
    }

    fn items_of(&self, quotation_id: i64) -> Vec<QuotationItem> {
        self.quotation_items
            .values()
            .filter(|item| item.quotation_id == quotation_id)
            .cloned()
            .collect()
    }

    fn insert_items(&mut self, quotation_id: i64, items: Vec<QuotationItemInput>) -> Vec<QuotationItem> {
        items
            .into_iter()
            .map(|input| {
                let item = QuotationItem {
                    id: self.next_id(),
                    quotation_id,
                    item_type: input.item_type,
                    item_id: input.item_id,
                    description: input.description,
                    quantity: input.quantity,
                    price: input.price,
                };
                self.quotation_items.insert(item.id, item.clone());
                item
            })
            .collect()
    }

    fn paid_total(&self, invoice_id: i64) -> Decimal {
        self.payments
            .values()
            .filter(|p| p.invoice_id() == invoice_id)
            .map(|p| p.amount())
            .sum()
    }
}

pub struct MemoryLedgerStore {
    state: Mutex<MemoryState>,
    timeout: Duration,
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            timeout,
        }
    }

    async fn lock(&self, operation: &'static str) -> AppResult<MutexGuard<'_, MemoryState>> {
        bounded(self.timeout, operation, async { Ok(self.state.lock().await) }).await
    }
}

fn newest_first<T: Clone>(rows: impl Iterator<Item = T>) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.reverse();
    rows
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert_garage(&self, new: NewGarage) -> AppResult<Garage> {
        let mut state = self.lock("insert_garage").await?;
        let garage = Garage {
            id: state.next_id(),
            name: new.name,
            address: new.address,
            phone: new.phone,
            email: new.email,
            created_at: Utc::now(),
        };
        state.garages.insert(garage.id, garage.clone());
        Ok(garage)
    }

    async fn find_garage(&self, id: i64) -> AppResult<Option<Garage>> {
        let state = self.lock("find_garage").await?;
        Ok(state.garages.get(&id).cloned())
    }

    async fn list_garages(&self) -> AppResult<Vec<Garage>> {
        let state = self.lock("list_garages").await?;
        Ok(state.garages.values().cloned().collect())
    }

    async fn delete_garage(&self, id: i64) -> AppResult<()> {
        let mut state = self.lock("delete_garage").await?;
        if !state.garages.contains_key(&id) {
            return Err(not_found_error("Garage", id));
        }
        if state.has_dependents(id) {
            return Err(AppError::Conflict(format!(
                "garage '{}' still owns ledger records and cannot be deleted",
                id
            )));
        }
        state.garages.remove(&id);
        state.sequences.retain(|(garage_id, _), _| *garage_id != id);
        Ok(())
    }

    async fn insert_customer(&self, new: NewCustomer) -> AppResult<Customer> {
        let mut state = self.lock("insert_customer").await?;
        if !state.garages.contains_key(&new.garage_id) {
            return Err(not_found_error("Garage", new.garage_id));
        }
        let customer = Customer {
            id: state.next_id(),
            garage_id: new.garage_id,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            email: new.email,
            address: new.address,
            company: new.company,
            created_at: Utc::now(),
        };
        state.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn find_customer(&self, id: i64) -> AppResult<Option<Customer>> {
        let state = self.lock("find_customer").await?;
        Ok(state.customers.get(&id).cloned())
    }

    async fn list_customers(&self, garage_id: i64) -> AppResult<Vec<Customer>> {
        let state = self.lock("list_customers").await?;
        Ok(state
            .customers
            .values()
            .filter(|c| c.garage_id == garage_id)
            .cloned()
            .collect())
    }

    async fn insert_vehicle(&self, new: NewVehicle) -> AppResult<Vehicle> {
        let mut state = self.lock("insert_vehicle").await?;
        let duplicate = state.vehicles.values().any(|v| {
            v.garage_id == new.garage_id && v.registration_number == new.registration_number
        });
        if duplicate {
            return Err(conflict_error(
                "Vehicle",
                "registration number",
                &new.registration_number,
            ));
        }
        match state.customers.get(&new.customer_id) {
            Some(customer) if customer.garage_id == new.garage_id => {}
            Some(_) => return Err(tenant_mismatch_error("Customer", new.customer_id, new.garage_id)),
            None => return Err(not_found_error("Customer", new.customer_id)),
        }

        let vehicle = Vehicle {
            id: state.next_id(),
            garage_id: new.garage_id,
            customer_id: new.customer_id,
            registration_number: new.registration_number,
            make: new.make,
            model: new.model,
            year: new.year,
            color: new.color,
            created_at: Utc::now(),
        };
        state.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn find_vehicle(&self, id: i64) -> AppResult<Option<Vehicle>> {
        let state = self.lock("find_vehicle").await?;
        Ok(state.vehicles.get(&id).cloned())
    }

    async fn list_vehicles(&self, garage_id: i64) -> AppResult<Vec<Vehicle>> {
        let state = self.lock("list_vehicles").await?;
        Ok(state
            .vehicles
            .values()
            .filter(|v| v.garage_id == garage_id)
            .cloned()
            .collect())
    }

    async fn insert_quotation(
        &self,
        new: NewQuotation,
        items: Vec<QuotationItemInput>,
    ) -> AppResult<(Quotation, Vec<QuotationItem>)> {
        let mut state = self.lock("insert_quotation").await?;
        let quotation = Quotation {
            id: state.next_id(),
            garage_id: new.garage_id,
            customer_id: new.customer_id,
            vehicle_id: new.vehicle_id,
            quotation_number: state.next_number(new.garage_id, SequenceKind::Quotation),
            status: QuotationStatus::Draft,
            created_at: Utc::now(),
            valid_until: new.valid_until,
            total_amount: new.total_amount,
            notes: new.notes,
        };
        let items = state.insert_items(quotation.id, items);
        state.quotations.insert(quotation.id, quotation.clone());
        Ok((quotation, items))
    }

    async fn find_quotation(&self, id: i64) -> AppResult<Option<Quotation>> {
        let state = self.lock("find_quotation").await?;
        Ok(state.quotations.get(&id).cloned())
    }

    async fn quotation_items(&self, quotation_id: i64) -> AppResult<Vec<QuotationItem>> {
        let state = self.lock("quotation_items").await?;
        Ok(state.items_of(quotation_id))
    }

    async fn list_quotations(&self, garage_id: i64) -> AppResult<Vec<Quotation>> {
        let state = self.lock("list_quotations").await?;
        Ok(newest_first(
            state
                .quotations
                .values()
                .filter(|q| q.garage_id == garage_id)
                .cloned(),
        ))
    }

    async fn replace_quotation_items(
        &self,
        quotation_id: i64,
        items: Vec<QuotationItemInput>,
        total_amount: Decimal,
    ) -> AppResult<(Quotation, Vec<QuotationItem>)> {
        let mut state = self.lock("replace_quotation_items").await?;
        let current = state
            .quotations
            .get(&quotation_id)
            .cloned()
            .ok_or_else(|| not_found_error("Quotation", quotation_id))?;
        current.status.ensure_items_editable()?;

        state
            .quotation_items
            .retain(|_, item| item.quotation_id != quotation_id);
        let items = state.insert_items(quotation_id, items);

        let updated = Quotation {
            total_amount,
            ..current
        };
        state.quotations.insert(quotation_id, updated.clone());
        Ok((updated, items))
    }

    async fn update_quotation_status(
        &self,
        quotation_id: i64,
        to: QuotationStatus,
    ) -> AppResult<Quotation> {
        let mut state = self.lock("update_quotation_status").await?;
        let quotation = state
            .quotations
            .get_mut(&quotation_id)
            .ok_or_else(|| not_found_error("Quotation", quotation_id))?;
        quotation.status.ensure_transition(to)?;
        quotation.status = to;
        Ok(quotation.clone())
    }

    async fn insert_invoice(&self, new: NewInvoice) -> AppResult<Invoice> {
        let mut state = self.lock("insert_invoice").await?;
        if let Some(quotation_id) = new.quotation_id {
            if state
                .invoices
                .values()
                .any(|i| i.quotation_id == Some(quotation_id))
            {
                return Err(conflict_error("Invoice", "quotation", &quotation_id.to_string()));
            }
        }
        let invoice = Invoice {
            id: state.next_id(),
            garage_id: new.garage_id,
            customer_id: new.customer_id,
            vehicle_id: new.vehicle_id,
            quotation_id: new.quotation_id,
            invoice_number: state.next_number(new.garage_id, SequenceKind::Invoice),
            total_amount: new.total_amount,
            created_at: Utc::now(),
        };
        state.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn find_invoice(&self, id: i64) -> AppResult<Option<Invoice>> {
        let state = self.lock("find_invoice").await?;
        Ok(state.invoices.get(&id).cloned())
    }

    async fn list_invoices(&self, garage_id: i64) -> AppResult<Vec<Invoice>> {
        let state = self.lock("list_invoices").await?;
        Ok(newest_first(
            state
                .invoices
                .values()
                .filter(|i| i.garage_id == garage_id)
                .cloned(),
        ))
    }

    async fn insert_payment(&self, new: NewPayment) -> AppResult<Payment> {
        let mut state = self.lock("insert_payment").await?;
        let invoice = state
            .invoices
            .get(&new.invoice_id)
            .cloned()
            .ok_or_else(|| not_found_error("Invoice", new.invoice_id))?;
        if invoice.garage_id != new.garage_id {
            return Err(tenant_mismatch_error("Invoice", invoice.id, new.garage_id));
        }

        invoice.ensure_accepts_payment(state.paid_total(invoice.id), new.amount)?;

        let id = state.next_id();
        let number = state.next_number(new.garage_id, SequenceKind::Payment);
        let payment = Payment::issue(id, number, new, Utc::now());
        state.payments.insert(id, payment.clone());
        Ok(payment)
    }

    async fn find_payment(&self, id: i64) -> AppResult<Option<Payment>> {
        let state = self.lock("find_payment").await?;
        Ok(state.payments.get(&id).cloned())
    }

    async fn payments_for_invoice(&self, invoice_id: i64) -> AppResult<Vec<Payment>> {
        let state = self.lock("payments_for_invoice").await?;
        Ok(state
            .payments
            .values()
            .filter(|p| p.invoice_id() == invoice_id)
            .cloned()
            .collect())
    }

    async fn paid_total(&self, invoice_id: i64) -> AppResult<Decimal> {
        let state = self.lock("paid_total").await?;
        Ok(state.paid_total(invoice_id))
    }

    async fn insert_gate_pass(&self, new: NewGatePass) -> AppResult<GatePass> {
        let mut state = self.lock("insert_gate_pass").await?;
        let id = state.next_id();
        let number = state.next_number(new.garage_id, SequenceKind::GatePass);
        let pass = GatePass::issue(id, number, new, Utc::now());
        state.gate_passes.insert(id, pass.clone());
        Ok(pass)
    }

    async fn find_gate_pass(&self, id: i64) -> AppResult<Option<GatePass>> {
        let state = self.lock("find_gate_pass").await?;
        Ok(state.gate_passes.get(&id).cloned())
    }

    async fn list_gate_passes(&self, garage_id: i64) -> AppResult<Vec<GatePass>> {
        let state = self.lock("list_gate_passes").await?;
        Ok(newest_first(
            state
                .gate_passes
                .values()
                .filter(|g| g.garage_id() == garage_id)
                .cloned(),
        ))
    }
}
