use serde::Deserialize;
use validator::Validate;

use crate::models::customer::NewCustomer;
use crate::models::garage::NewGarage;
use crate::models::vehicle::NewVehicle;

// Request para crear un garage
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGarageRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(min = 3, max = 50))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
}

impl From<CreateGarageRequest> for NewGarage {
    fn from(request: CreateGarageRequest) -> Self {
        Self {
            name: request.name,
            address: request.address,
            phone: request.phone,
            email: request.email,
        }
    }
}

// Request para registrar un cliente
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    pub garage_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 3, max = 50))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
}

impl CreateCustomerRequest {
    pub fn into_new(self, garage_id: i64) -> NewCustomer {
        NewCustomer {
            garage_id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            company: self.company,
        }
    }
}

// Request para registrar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    pub garage_id: Option<i64>,
    pub customer_id: i64,
    #[validate(length(min = 1, max = 20))]
    pub registration_number: String,
    #[validate(length(min = 1, max = 100))]
    pub make: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    pub color: Option<String>,
}

impl CreateVehicleRequest {
    pub fn into_new(self, garage_id: i64) -> NewVehicle {
        NewVehicle {
            garage_id,
            customer_id: self.customer_id,
            registration_number: self.registration_number,
            make: self.make,
            model: self.model,
            year: self.year,
            color: self.color,
        }
    }
}
