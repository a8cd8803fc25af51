//! Repositorios del ledger
//!
//! `LedgerStore` es la frontera de persistencia; existen dos implementaciones:
//! PostgreSQL (producción) y memoria (modo standalone y tests).

pub mod ledger_store;
pub mod memory_store;
pub mod pg_store;

pub use ledger_store::LedgerStore;
pub use memory_store::MemoryLedgerStore;
pub use pg_store::PgLedgerStore;

use std::future::Future;
use std::time::Duration;

use crate::utils::errors::{AppError, AppResult};

/// Timeout por defecto de cada operación del store
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Ejecutar una operación del store con un límite de tiempo.
/// Si se agota, el llamador recibe `StoreUnavailable` y puede reintentar.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("⏳ Operación '{}' excedió {:?}", operation, limit);
            Err(AppError::StoreUnavailable(format!(
                "{} timed out after {:?}",
                operation, limit
            )))
        }
    }
}
