//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::LedgerStore;
use crate::services::LedgerServices;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub services: LedgerServices,
    pub jwt: JwtConfig,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>, config: EnvironmentConfig) -> Self {
        Self {
            services: LedgerServices::new(store),
            jwt: JwtConfig::from(&config),
            config,
        }
    }
}
