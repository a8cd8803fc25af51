//! Servicio de directorio
//!
//! Garages, clientes y vehículos de cada tenant. También aporta la
//! verificación de pertenencia cliente/vehículo que usan cotizaciones,
//! facturas y pases de salida.

use std::sync::Arc;

use tracing::info;

use crate::models::auth::{Principal, TenantScope};
use crate::models::customer::{Customer, NewCustomer};
use crate::models::garage::{Garage, NewGarage};
use crate::models::vehicle::{normalize_registration, NewVehicle, Vehicle};
use crate::repositories::LedgerStore;
use crate::services::access_guard;
use crate::utils::errors::{not_found_error, tenant_mismatch_error, AppError, AppResult};

#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn LedgerStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    // Garages

    pub async fn create_garage(&self, principal: &Principal, new: NewGarage) -> AppResult<Garage> {
        access_guard::ensure_platform_admin(principal)?;
        if new.name.trim().is_empty() {
            return Err(AppError::InvalidInput("garage name must not be empty".to_string()));
        }

        let garage = self.store.insert_garage(new).await?;
        info!("🏢 Garage {} created: {}", garage.id, garage.name);
        Ok(garage)
    }

    pub async fn get_garage(&self, principal: &Principal, id: i64) -> AppResult<Garage> {
        let garage = self
            .store
            .find_garage(id)
            .await?
            .ok_or_else(|| not_found_error("Garage", id))?;
        access_guard::ensure(principal, garage.id, "garage")?;
        Ok(garage)
    }

    /// El admin ve todos los garages; el staff solo el suyo
    pub async fn list_garages(&self, principal: &Principal) -> AppResult<Vec<Garage>> {
        match principal.scope {
            TenantScope::AllGarages => self.store.list_garages().await,
            TenantScope::Garage(garage_id) => Ok(self
                .store
                .find_garage(garage_id)
                .await?
                .into_iter()
                .collect()),
        }
    }

    pub async fn delete_garage(&self, principal: &Principal, id: i64) -> AppResult<()> {
        access_guard::ensure_platform_admin(principal)?;
        self.store.delete_garage(id).await?;
        info!("🗑️ Garage {} deleted", id);
        Ok(())
    }

    // Clientes

    pub async fn register_customer(
        &self,
        principal: &Principal,
        new: NewCustomer,
    ) -> AppResult<Customer> {
        access_guard::ensure(principal, new.garage_id, "customers")?;
        if new.first_name.trim().is_empty() || new.last_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "customer first and last name are required".to_string(),
            ));
        }

        let customer = self.store.insert_customer(new).await?;
        info!(
            "👤 Customer {} registered in garage {}",
            customer.id, customer.garage_id
        );
        Ok(customer)
    }

    pub async fn get_customer(&self, principal: &Principal, id: i64) -> AppResult<Customer> {
        let customer = self
            .store
            .find_customer(id)
            .await?
            .ok_or_else(|| not_found_error("Customer", id))?;
        access_guard::ensure(principal, customer.garage_id, "customer")?;
        Ok(customer)
    }

    pub async fn list_customers(
        &self,
        principal: &Principal,
        garage_id: i64,
    ) -> AppResult<Vec<Customer>> {
        access_guard::ensure(principal, garage_id, "customers")?;
        self.store.list_customers(garage_id).await
    }

    // Vehículos

    pub async fn register_vehicle(
        &self,
        principal: &Principal,
        mut new: NewVehicle,
    ) -> AppResult<Vehicle> {
        access_guard::ensure(principal, new.garage_id, "vehicles")?;

        new.registration_number = normalize_registration(&new.registration_number);
        if new.registration_number.is_empty() {
            return Err(AppError::InvalidInput(
                "registration number must not be empty".to_string(),
            ));
        }

        let vehicle = self.store.insert_vehicle(new).await?;
        info!(
            "🚗 Vehicle {} ({}) registered in garage {}",
            vehicle.id, vehicle.registration_number, vehicle.garage_id
        );
        Ok(vehicle)
    }

    pub async fn get_vehicle(&self, principal: &Principal, id: i64) -> AppResult<Vehicle> {
        let vehicle = self
            .store
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))?;
        access_guard::ensure(principal, vehicle.garage_id, "vehicle")?;
        Ok(vehicle)
    }

    pub async fn list_vehicles(
        &self,
        principal: &Principal,
        garage_id: i64,
    ) -> AppResult<Vec<Vehicle>> {
        access_guard::ensure(principal, garage_id, "vehicles")?;
        self.store.list_vehicles(garage_id).await
    }
}

/// Verificar que cliente y vehículo existen, pertenecen al garage y que el
/// vehículo es de ese cliente.
pub(crate) async fn ensure_parties(
    store: &dyn LedgerStore,
    garage_id: i64,
    customer_id: i64,
    vehicle_id: i64,
) -> AppResult<(Customer, Vehicle)> {
    let customer = store
        .find_customer(customer_id)
        .await?
        .ok_or_else(|| not_found_error("Customer", customer_id))?;
    if customer.garage_id != garage_id {
        return Err(tenant_mismatch_error("Customer", customer_id, garage_id));
    }

    let vehicle = store
        .find_vehicle(vehicle_id)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;
    if vehicle.garage_id != garage_id {
        return Err(tenant_mismatch_error("Vehicle", vehicle_id, garage_id));
    }
    if vehicle.customer_id != customer_id {
        return Err(AppError::InvalidInput(format!(
            "vehicle {} does not belong to customer {}",
            vehicle_id, customer_id
        )));
    }

    Ok((customer, vehicle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryLedgerStore;

    fn garage(name: &str) -> NewGarage {
        NewGarage {
            name: name.to_string(),
            address: "1 Main St".to_string(),
            phone: "555-0100".to_string(),
            email: "desk@garage.test".to_string(),
        }
    }

    fn customer(garage_id: i64) -> NewCustomer {
        NewCustomer {
            garage_id,
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            phone: "555-0101".to_string(),
            email: None,
            address: None,
            company: None,
        }
    }

    fn vehicle(garage_id: i64, customer_id: i64, registration: &str) -> NewVehicle {
        NewVehicle {
            garage_id,
            customer_id,
            registration_number: registration.to_string(),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: Some(2019),
            color: None,
        }
    }

    #[tokio::test]
    async fn test_only_admin_creates_garages() {
        let service = DirectoryService::new(Arc::new(MemoryLedgerStore::new()));
        let admin = Principal::platform_admin(1);

        let created = service.create_garage(&admin, garage("North")).await.unwrap();
        let staff = Principal::scoped(2, created.id);
        assert!(matches!(
            service.create_garage(&staff, garage("South")).await,
            Err(AppError::Unauthorized(_))
        ));

        let visible = service.list_garages(&staff).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, created.id);
    }

    #[tokio::test]
    async fn test_registration_is_normalized_and_unique() {
        let service = DirectoryService::new(Arc::new(MemoryLedgerStore::new()));
        let admin = Principal::platform_admin(1);
        let g = service.create_garage(&admin, garage("North")).await.unwrap();
        let staff = Principal::scoped(2, g.id);
        let c = service.register_customer(&staff, customer(g.id)).await.unwrap();

        let v = service
            .register_vehicle(&staff, vehicle(g.id, c.id, " ab 12  cd "))
            .await
            .unwrap();
        assert_eq!(v.registration_number, "AB 12 CD");

        assert!(matches!(
            service.register_vehicle(&staff, vehicle(g.id, c.id, "AB 12 CD")).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_foreign_customer_is_a_tenant_mismatch() {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let service = DirectoryService::new(store.clone());
        let admin = Principal::platform_admin(1);
        let north = service.create_garage(&admin, garage("North")).await.unwrap();
        let south = service.create_garage(&admin, garage("South")).await.unwrap();
        let foreign = service.register_customer(&admin, customer(south.id)).await.unwrap();

        assert!(matches!(
            service
                .register_vehicle(&admin, vehicle(north.id, foreign.id, "XY 99"))
                .await,
            Err(AppError::TenantMismatch(_))
        ));

        let staff = Principal::scoped(3, north.id);
        assert!(matches!(
            service.get_customer(&staff, foreign.id).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_parties_checks_vehicle_owner() {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let service = DirectoryService::new(store.clone());
        let admin = Principal::platform_admin(1);
        let g = service.create_garage(&admin, garage("North")).await.unwrap();
        let owner = service.register_customer(&admin, customer(g.id)).await.unwrap();
        let other = service.register_customer(&admin, customer(g.id)).await.unwrap();
        let v = service
            .register_vehicle(&admin, vehicle(g.id, owner.id, "OWN 1"))
            .await
            .unwrap();

        assert!(ensure_parties(store.as_ref(), g.id, owner.id, v.id).await.is_ok());
        assert!(matches!(
            ensure_parties(store.as_ref(), g.id, other.id, v.id).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            ensure_parties(store.as_ref(), g.id, 404, v.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_customer_for_missing_garage_is_not_found() {
        let service = DirectoryService::new(Arc::new(MemoryLedgerStore::new()));
        let admin = Principal::platform_admin(1);

        assert!(matches!(
            service.register_customer(&admin, customer(999)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_lists_follow_registration_order() {
        let service = DirectoryService::new(Arc::new(MemoryLedgerStore::new()));
        let admin = Principal::platform_admin(1);
        let g = service.create_garage(&admin, garage("North")).await.unwrap();

        let mut zapata = customer(g.id);
        zapata.last_name = "Zapata".to_string();
        let mut abad = customer(g.id);
        abad.last_name = "Abad".to_string();
        let first = service.register_customer(&admin, zapata).await.unwrap();
        let second = service.register_customer(&admin, abad).await.unwrap();

        let listed = service.list_customers(&admin, g.id).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        let zz = service
            .register_vehicle(&admin, vehicle(g.id, first.id, "ZZ 99"))
            .await
            .unwrap();
        let aa = service
            .register_vehicle(&admin, vehicle(g.id, second.id, "AA 01"))
            .await
            .unwrap();
        let vehicle_ids: Vec<i64> = service
            .list_vehicles(&admin, g.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(vehicle_ids, vec![zz.id, aa.id]);
    }
}
