//! External invoicing integration. Only a stub that mints references exists.

use async_trait::async_trait;
use chrono::Local;
use tracing::info;

use crate::model::client::Client;
use crate::model::payment::Payment;

#[derive(Debug, thiserror::Error)]
pub enum InvoicingError {
    #[error("Invoicing system unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait InvoicingService: Send + Sync {
    /// Registers the client and returns the external reference.
    async fn create_client(&self, client: &Client) -> Result<String, InvoicingError>;
    /// Raises an invoice for the payment and returns its reference.
    async fn create_invoice(&self, payment: &Payment) -> Result<String, InvoicingError>;
}

#[derive(Debug, Clone, Default)]
pub struct StubInvoicingService;

#[async_trait]
impl InvoicingService for StubInvoicingService {
    async fn create_client(&self, client: &Client) -> Result<String, InvoicingError> {
        let reference = format!("INV-CL-{}-{}", client.id.to_hex(), Local::now().format("%Y%m%d"));
        info!(client_id = %client.id, %reference, "Stub invoicing: client registered");
        Ok(reference)
    }

    async fn create_invoice(&self, payment: &Payment) -> Result<String, InvoicingError> {
        let reference = format!("INV-PAY-{}-{}", payment.id.to_hex(), Local::now().format("%Y%m%d"));
        info!(payment_id = %payment.id, %reference, "Stub invoicing: invoice raised");
        Ok(reference)
    }
}
