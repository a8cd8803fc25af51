use serde::Deserialize;
use validator::Validate;

use crate::models::gate_pass::NewGatePass;

#[derive(Debug, Deserialize, Validate)]
pub struct IssueGatePassRequest {
    pub garage_id: Option<i64>,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub purpose: String,
    #[validate(length(max = 2000))]
    pub security_notes: Option<String>,
}

impl IssueGatePassRequest {
    pub fn into_new(self, garage_id: i64) -> NewGatePass {
        NewGatePass {
            garage_id,
            customer_id: self.customer_id,
            vehicle_id: self.vehicle_id,
            purpose: self.purpose,
            security_notes: self.security_notes,
        }
    }
}
