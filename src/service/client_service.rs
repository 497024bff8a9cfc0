use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::dto::client_dto::{ClientView, CreateClientRequest, UpdateClientRequest};
use crate::dto::job_dto::JobView;
use crate::dto::quote_dto::QuoteView;
use crate::dto::report_dto::InvoicingResponse;
use crate::model::client::Client;
use crate::model::job::Job;
use crate::repository::Repositories;
use crate::service::directory::job_views;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::invoicing::InvoicingService;

#[async_trait]
pub trait ClientService: Send + Sync {
    async fn list_clients(&self) -> ServiceResult<Vec<ClientView>>;
    async fn get_client(&self, id: ObjectId) -> ServiceResult<ClientView>;
    async fn create_client(&self, req: CreateClientRequest) -> ServiceResult<ClientView>;
    async fn update_client(&self, id: ObjectId, req: UpdateClientRequest) -> ServiceResult<ClientView>;
    /// Only clients without quotes or jobs can go.
    async fn delete_client(&self, id: ObjectId) -> ServiceResult<()>;
    async fn client_quotes(&self, id: ObjectId) -> ServiceResult<Vec<QuoteView>>;
    async fn client_jobs(&self, id: ObjectId) -> ServiceResult<Vec<JobView>>;
    async fn create_in_invoicing(&self, id: ObjectId) -> ServiceResult<InvoicingResponse>;
}

pub struct ClientServiceImpl {
    pub repos: Repositories,
    pub invoicing: Arc<dyn InvoicingService>,
}

impl ClientServiceImpl {
    pub fn new(repos: Repositories, invoicing: Arc<dyn InvoicingService>) -> Self {
        Self { repos, invoicing }
    }

    async fn view(&self, client: Client) -> ServiceResult<ClientView> {
        let jobs = self.repos.jobs.list_by_client(client.id).await?;
        Ok(ClientView::new(client, &jobs))
    }
}

#[async_trait]
impl ClientService for ClientServiceImpl {
    #[instrument(skip(self))]
    async fn list_clients(&self) -> ServiceResult<Vec<ClientView>> {
        let clients = self.repos.clients.list().await?;
        let mut jobs_by_client: HashMap<ObjectId, Vec<Job>> = HashMap::new();
        for job in self.repos.jobs.list().await? {
            jobs_by_client.entry(job.client_id).or_default().push(job);
        }
        Ok(clients
            .into_iter()
            .map(|c| {
                let jobs = jobs_by_client.remove(&c.id).unwrap_or_default();
                ClientView::new(c, &jobs)
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_client(&self, id: ObjectId) -> ServiceResult<ClientView> {
        let client = self.repos.clients.get_by_id(id).await?;
        self.view(client).await
    }

    #[instrument(skip(self, req), fields(name = %req.name))]
    async fn create_client(&self, req: CreateClientRequest) -> ServiceResult<ClientView> {
        let now = Utc::now().to_rfc3339();
        let client = Client {
            id: ObjectId::new(),
            name: req.name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            notes: req.notes,
            invoicing_ref: None,
            created_at: now.clone(),
            updated_at: now,
        };
        let client = self.repos.clients.create(client).await?;
        info!(client_id = %client.id, "Client created");
        Ok(ClientView::new(client, &[]))
    }

    #[instrument(skip(self, req))]
    async fn update_client(&self, id: ObjectId, req: UpdateClientRequest) -> ServiceResult<ClientView> {
        let mut client = self.repos.clients.get_by_id(id).await?;
        if let Some(name) = req.name {
            client.name = name;
        }
        if let Some(email) = req.email {
            client.email = Some(email);
        }
        if let Some(phone) = req.phone {
            client.phone = Some(phone);
        }
        if let Some(address) = req.address {
            client.address = Some(address);
        }
        if let Some(notes) = req.notes {
            client.notes = Some(notes);
        }
        client.updated_at = Utc::now().to_rfc3339();
        let client = self.repos.clients.update(client).await?;
        info!(client_id = %client.id, "Client updated");
        self.view(client).await
    }

    #[instrument(skip(self))]
    async fn delete_client(&self, id: ObjectId) -> ServiceResult<()> {
        self.repos.clients.get_by_id(id).await?;
        let has_quotes = !self.repos.quotes.list(Some(id)).await?.is_empty();
        let has_jobs = !self.repos.jobs.list_by_client(id).await?.is_empty();
        if has_quotes || has_jobs {
            warn!(client_id = %id, has_quotes, has_jobs, "Client still has dependents");
            return Err(ServiceError::Conflict(
                "Cannot delete client with existing quotes or jobs".to_string(),
            ));
        }
        let res = self.repos.clients.delete(id).await;
        match &res {
            Ok(_) => info!(client_id = %id, "Client deleted"),
            Err(e) => error!("Failed to delete client: {e}"),
        }
        Ok(res?)
    }

    #[instrument(skip(self))]
    async fn client_quotes(&self, id: ObjectId) -> ServiceResult<Vec<QuoteView>> {
        let client = self.repos.clients.get_by_id(id).await?;
        let converted: HashSet<ObjectId> = self
            .repos
            .jobs
            .list_by_client(id)
            .await?
            .into_iter()
            .filter_map(|j| j.quote_id)
            .collect();
        let quotes = self.repos.quotes.list(Some(id)).await?;
        Ok(quotes
            .into_iter()
            .map(|q| {
                let has_job = converted.contains(&q.id);
                QuoteView::new(q, Some(client.name.clone()), has_job)
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn client_jobs(&self, id: ObjectId) -> ServiceResult<Vec<JobView>> {
        self.repos.clients.get_by_id(id).await?;
        let jobs = self.repos.jobs.list_by_client(id).await?;
        job_views(&self.repos, jobs).await
    }

    #[instrument(skip(self))]
    async fn create_in_invoicing(&self, id: ObjectId) -> ServiceResult<InvoicingResponse> {
        let mut client = self.repos.clients.get_by_id(id).await?;
        let reference = self.invoicing.create_client(&client).await.map_err(|e| {
            error!("Invoicing failed for client {}: {}", id, e);
            ServiceError::InternalError(e.to_string())
        })?;
        client.invoicing_ref = Some(reference.clone());
        client.updated_at = Utc::now().to_rfc3339();
        self.repos.clients.update(client).await?;
        Ok(InvoicingResponse {
            message: "Client created in invoicing system".to_string(),
            invoicing_ref: reference,
        })
    }
}
