//! Emisión de pases de salida

use std::sync::Arc;

use tracing::info;

use crate::models::auth::Principal;
use crate::models::gate_pass::{GatePass, NewGatePass};
use crate::repositories::LedgerStore;
use crate::services::access_guard;
use crate::services::directory_service::ensure_parties;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Clone)]
pub struct GatePassService {
    store: Arc<dyn LedgerStore>,
}

impl GatePassService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn issue_pass(&self, principal: &Principal, mut new: NewGatePass) -> AppResult<GatePass> {
        access_guard::ensure(principal, new.garage_id, "gate passes")?;

        new.purpose = new.purpose.trim().to_string();
        if new.purpose.is_empty() {
            return Err(AppError::InvalidInput(
                "gate pass purpose must not be empty".to_string(),
            ));
        }
        ensure_parties(
            self.store.as_ref(),
            new.garage_id,
            new.customer_id,
            new.vehicle_id,
        )
        .await?;

        let pass = self.store.insert_gate_pass(new).await?;
        info!(
            "🚧 Gate pass {} issued for vehicle {} in garage {}",
            pass.pass_number(),
            pass.vehicle_id(),
            pass.garage_id()
        );
        Ok(pass)
    }

    pub async fn get_gate_pass(&self, principal: &Principal, id: i64) -> AppResult<GatePass> {
        let pass = self
            .store
            .find_gate_pass(id)
            .await?
            .ok_or_else(|| not_found_error("Gate pass", id))?;
        access_guard::ensure(principal, pass.garage_id(), "gate pass")?;
        Ok(pass)
    }

    pub async fn list_gate_passes(
        &self,
        principal: &Principal,
        garage_id: i64,
    ) -> AppResult<Vec<GatePass>> {
        access_guard::ensure(principal, garage_id, "gate passes")?;
        self.store.list_gate_passes(garage_id).await
    }
}
