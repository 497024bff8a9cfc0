use serde::{Deserialize, Serialize};
use validator::Validate;

use super::hex;
use crate::model::client::Client;
use crate::model::job::Job;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientView {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub invoicing_ref: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub lifetime_spend: f64,
    pub job_count: usize,
}

impl ClientView {
    /// `jobs` must be the client's own jobs.
    pub fn new(client: Client, jobs: &[Job]) -> Self {
        ClientView {
            id: hex(&client.id),
            name: client.name,
            email: client.email,
            phone: client.phone,
            address: client.address,
            notes: client.notes,
            invoicing_ref: client.invoicing_ref,
            created_at: client.created_at,
            updated_at: client.updated_at,
            lifetime_spend: jobs.iter().filter_map(|j| j.price).sum(),
            job_count: jobs.len(),
        }
    }
}
