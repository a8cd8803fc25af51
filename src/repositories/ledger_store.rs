//! Contrato de persistencia del ledger
//!
//! Las operaciones que deben ser atómicas (numeración, cotización + líneas,
//! verificación de sobrepago + inserción) son una sola llamada del trait, de
//! modo que cada implementación las ejecute dentro de su propia transacción.
//! Ninguna operación de actualización existe para pagos ni pases de salida.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::customer::{Customer, NewCustomer};
use crate::models::garage::{Garage, NewGarage};
use crate::models::gate_pass::{GatePass, NewGatePass};
use crate::models::invoice::{Invoice, NewInvoice};
use crate::models::payment::{NewPayment, Payment};
use crate::models::quotation::{
    NewQuotation, Quotation, QuotationItem, QuotationItemInput, QuotationStatus,
};
use crate::models::vehicle::{NewVehicle, Vehicle};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    // Garages

    async fn insert_garage(&self, new: NewGarage) -> AppResult<Garage>;

    async fn find_garage(&self, id: i64) -> AppResult<Option<Garage>>;

    async fn list_garages(&self) -> AppResult<Vec<Garage>>;

    /// Rechaza con `Conflict` mientras existan registros dependientes
    async fn delete_garage(&self, id: i64) -> AppResult<()>;

    // Clientes y vehículos

    async fn insert_customer(&self, new: NewCustomer) -> AppResult<Customer>;

    async fn find_customer(&self, id: i64) -> AppResult<Option<Customer>>;

    async fn list_customers(&self, garage_id: i64) -> AppResult<Vec<Customer>>;

    /// `Conflict` si la matrícula ya existe en el garage
    async fn insert_vehicle(&self, new: NewVehicle) -> AppResult<Vehicle>;

    async fn find_vehicle(&self, id: i64) -> AppResult<Option<Vehicle>>;

    async fn list_vehicles(&self, garage_id: i64) -> AppResult<Vec<Vehicle>>;

    // Cotizaciones

    /// Asigna número, inserta cotización y líneas en una única transacción
    async fn insert_quotation(
        &self,
        new: NewQuotation,
        items: Vec<QuotationItemInput>,
    ) -> AppResult<(Quotation, Vec<QuotationItem>)>;

    async fn find_quotation(&self, id: i64) -> AppResult<Option<Quotation>>;

    async fn quotation_items(&self, quotation_id: i64) -> AppResult<Vec<QuotationItem>>;

    async fn list_quotations(&self, garage_id: i64) -> AppResult<Vec<Quotation>>;

    /// Reemplaza las líneas y el total bajo bloqueo, re-verificando el estado
    async fn replace_quotation_items(
        &self,
        quotation_id: i64,
        items: Vec<QuotationItemInput>,
        total_amount: Decimal,
    ) -> AppResult<(Quotation, Vec<QuotationItem>)>;

    /// Cambia el estado almacenado bajo bloqueo, re-verificando la transición
    async fn update_quotation_status(
        &self,
        quotation_id: i64,
        to: QuotationStatus,
    ) -> AppResult<Quotation>;

    // Facturas

    async fn insert_invoice(&self, new: NewInvoice) -> AppResult<Invoice>;

    async fn find_invoice(&self, id: i64) -> AppResult<Option<Invoice>>;

    async fn list_invoices(&self, garage_id: i64) -> AppResult<Vec<Invoice>>;

    // Pagos

    /// Bloquea la factura, verifica sobrepago, asigna número e inserta
    async fn insert_payment(&self, new: NewPayment) -> AppResult<Payment>;

    async fn find_payment(&self, id: i64) -> AppResult<Option<Payment>>;

    async fn payments_for_invoice(&self, invoice_id: i64) -> AppResult<Vec<Payment>>;

    async fn paid_total(&self, invoice_id: i64) -> AppResult<Decimal>;

    // Pases de salida

    async fn insert_gate_pass(&self, new: NewGatePass) -> AppResult<GatePass>;

    async fn find_gate_pass(&self, id: i64) -> AppResult<Option<GatePass>>;

    async fn list_gate_passes(&self, garage_id: i64) -> AppResult<Vec<GatePass>>;
}
