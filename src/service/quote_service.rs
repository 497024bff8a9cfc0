use std::collections::HashSet;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::dto::job_dto::JobView;
use crate::dto::parse_object_id;
use crate::dto::quote_dto::{
    CreateQuoteRequest, ExtraRequest, QuoteExtraView, QuoteView, UpdateExtraRequest, UpdateQuoteRequest,
};
use crate::dto::report_dto::QuoteStats;
use crate::model::job::{Job, JobStage};
use crate::model::quote::{Quote, QuoteExtra};
use crate::repository::Repositories;
use crate::scheduling::payment_schedule;
use crate::service::directory::{job_view, Directory};
use crate::service::report_service::quote_stats;
use crate::util::dates::parse_optional_date;
use crate::util::error::{ServiceError, ServiceResult};

#[async_trait]
pub trait QuoteService: Send + Sync {
    async fn list_quotes(&self, client_id: Option<ObjectId>) -> ServiceResult<Vec<QuoteView>>;
    async fn get_quote(&self, id: ObjectId) -> ServiceResult<QuoteView>;
    async fn create_quote(&self, req: CreateQuoteRequest, created_by: Option<ObjectId>) -> ServiceResult<QuoteView>;
    async fn update_quote(&self, id: ObjectId, req: UpdateQuoteRequest) -> ServiceResult<QuoteView>;
    async fn delete_quote(&self, id: ObjectId) -> ServiceResult<()>;
    /// Turns an accepted quote into a job, once.
    async fn convert_to_job(&self, id: ObjectId) -> ServiceResult<JobView>;
    async fn stats(&self) -> ServiceResult<QuoteStats>;
    async fn list_extras(&self, quote_id: ObjectId) -> ServiceResult<Vec<QuoteExtraView>>;
    async fn add_extra(&self, quote_id: ObjectId, req: ExtraRequest) -> ServiceResult<QuoteExtraView>;
    async fn update_extra(
        &self,
        quote_id: ObjectId,
        extra_id: ObjectId,
        req: UpdateExtraRequest,
    ) -> ServiceResult<QuoteExtraView>;
    async fn delete_extra(&self, quote_id: ObjectId, extra_id: ObjectId) -> ServiceResult<()>;
}

pub struct QuoteServiceImpl {
    pub repos: Repositories,
}

impl QuoteServiceImpl {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn views(&self, quotes: Vec<Quote>) -> ServiceResult<Vec<QuoteView>> {
        let directory = Directory::load(&self.repos).await?;
        let converted: HashSet<ObjectId> = self
            .repos
            .jobs
            .list()
            .await?
            .into_iter()
            .filter_map(|j| j.quote_id)
            .collect();
        Ok(quotes
            .into_iter()
            .map(|q| {
                let client_name = directory.client_name(&q.client_id);
                let has_job = converted.contains(&q.id);
                QuoteView::new(q, client_name, has_job)
            })
            .collect())
    }

    async fn view(&self, quote: Quote) -> ServiceResult<QuoteView> {
        let id = quote.id;
        self.views(vec![quote])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("Quote {} not found", id)))
    }

    async fn save(&self, mut quote: Quote) -> ServiceResult<Quote> {
        quote.updated_at = Utc::now().to_rfc3339();
        Ok(self.repos.quotes.update(quote).await?)
    }
}

fn new_extras(requests: Vec<ExtraRequest>) -> Vec<QuoteExtra> {
    requests
        .into_iter()
        .map(|e| QuoteExtra { id: ObjectId::new(), description: e.description, price: e.price })
        .collect()
}

fn find_extra(quote: &Quote, extra_id: ObjectId) -> ServiceResult<usize> {
    quote
        .extras
        .iter()
        .position(|e| e.id == extra_id)
        .ok_or_else(|| ServiceError::NotFound("Extra does not belong to this quote".to_string()))
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    #[instrument(skip(self))]
    async fn list_quotes(&self, client_id: Option<ObjectId>) -> ServiceResult<Vec<QuoteView>> {
        let quotes = self.repos.quotes.list(client_id).await?;
        self.views(quotes).await
    }

    #[instrument(skip(self))]
    async fn get_quote(&self, id: ObjectId) -> ServiceResult<QuoteView> {
        let quote = self.repos.quotes.get_by_id(id).await?;
        self.view(quote).await
    }

    #[instrument(skip(self, req), fields(name = %req.name))]
    async fn create_quote(&self, req: CreateQuoteRequest, created_by: Option<ObjectId>) -> ServiceResult<QuoteView> {
        info!("Creating quote");
        let client_id = parse_object_id("client_id", &req.client_id)?;
        self.repos.clients.get_by_id(client_id).await?;

        let now = Utc::now().to_rfc3339();
        let quote = Quote {
            id: ObjectId::new(),
            client_id,
            name: req.name,
            category: req.category,
            initial_amount: req.initial_amount,
            final_amount: req.final_amount,
            material_cost: req.material_cost,
            status: req.status.unwrap_or_default(),
            negotiation_details: req.negotiation_details,
            deposit_paid_date: parse_optional_date("deposit_paid_date", req.deposit_paid_date.as_deref())?,
            estimated_build_days: req.estimated_build_days,
            estimated_fitting_days: req.estimated_fitting_days,
            created_by,
            extras: new_extras(req.extras),
            created_at: now.clone(),
            updated_at: now,
        };
        let quote = self.repos.quotes.create(quote).await?;
        info!(quote_id = %quote.id, "Quote created");
        self.view(quote).await
    }

    #[instrument(skip(self, req))]
    async fn update_quote(&self, id: ObjectId, req: UpdateQuoteRequest) -> ServiceResult<QuoteView> {
        let mut quote = self.repos.quotes.get_by_id(id).await?;
        if let Some(name) = req.name {
            quote.name = name;
        }
        if let Some(category) = req.category {
            quote.category = category;
        }
        if let Some(amount) = req.initial_amount {
            quote.initial_amount = amount;
        }
        if let Some(amount) = req.final_amount {
            if amount.is_some_and(|a| a < 0.0) {
                return Err(ServiceError::InvalidInput("final_amount must not be negative".to_string()));
            }
            quote.final_amount = amount;
        }
        if let Some(cost) = req.material_cost {
            quote.material_cost = cost;
        }
        if let Some(status) = req.status {
            quote.status = status;
        }
        if let Some(details) = req.negotiation_details {
            quote.negotiation_details = Some(details);
        }
        if let Some(date) = req.deposit_paid_date {
            quote.deposit_paid_date = parse_optional_date("deposit_paid_date", date.as_deref())?;
        }
        if let Some(days) = req.estimated_build_days {
            quote.estimated_build_days = days;
        }
        if let Some(days) = req.estimated_fitting_days {
            quote.estimated_fitting_days = days;
        }
        if let Some(extras) = req.extras {
            debug!("Replacing {} extras with {}", quote.extras.len(), extras.len());
            quote.extras = new_extras(extras);
        }
        let quote = self.save(quote).await?;
        info!(quote_id = %quote.id, "Quote updated");
        self.view(quote).await
    }

    #[instrument(skip(self))]
    async fn delete_quote(&self, id: ObjectId) -> ServiceResult<()> {
        self.repos.quotes.get_by_id(id).await?;
        if self.repos.jobs.find_by_quote(id).await?.is_some() {
            warn!(quote_id = %id, "Refusing to delete a converted quote");
            return Err(ServiceError::Conflict("Quote has a job and cannot be deleted".to_string()));
        }
        let res = self.repos.quotes.delete(id).await;
        match &res {
            Ok(_) => info!(quote_id = %id, "Quote deleted"),
            Err(e) => error!("Failed to delete quote: {e}"),
        }
        Ok(res?)
    }

    #[instrument(skip(self))]
    async fn convert_to_job(&self, id: ObjectId) -> ServiceResult<JobView> {
        let quote = self.repos.quotes.get_by_id(id).await?;
        if self.repos.jobs.find_by_quote(id).await?.is_some() {
            return Err(ServiceError::Conflict("Quote has already been converted to a job".to_string()));
        }
        if !quote.status.is_accepted() {
            return Err(ServiceError::Conflict("Cannot convert quote to job: quote is not accepted".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let job = Job {
            id: ObjectId::new(),
            client_id: quote.client_id,
            quote_id: Some(quote.id),
            name: quote.name.clone(),
            category: quote.category.clone(),
            stage: JobStage::NotStarted,
            booking_date: None,
            build_start_date: None,
            build_duration_days: None,
            fitting_date: None,
            fitting_date_status: Default::default(),
            price: Some(quote.agreed_amount()),
            client_needs_update: false,
            client_contacted: false,
            estimated_build_days: quote.estimated_build_days,
            estimated_fitting_days: quote.estimated_fitting_days,
            actual_build_days: None,
            actual_fitting_days: None,
            created_at: now.clone(),
            updated_at: now,
        };
        let job = self.repos.jobs.create(job).await?;
        if let Some(payments) = payment_schedule::generate(&job) {
            self.repos.payments.replace_for_job(job.id, payments).await?;
        }
        info!(quote_id = %id, job_id = %job.id, "Quote converted to job");
        job_view(&self.repos, job).await
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> ServiceResult<QuoteStats> {
        let quotes = self.repos.quotes.list(None).await?;
        Ok(quote_stats(&quotes))
    }

    #[instrument(skip(self))]
    async fn list_extras(&self, quote_id: ObjectId) -> ServiceResult<Vec<QuoteExtraView>> {
        let quote = self.repos.quotes.get_by_id(quote_id).await?;
        Ok(quote.extras.iter().map(|e| QuoteExtraView::new(&quote.id, e)).collect())
    }

    #[instrument(skip(self, req))]
    async fn add_extra(&self, quote_id: ObjectId, req: ExtraRequest) -> ServiceResult<QuoteExtraView> {
        let mut quote = self.repos.quotes.get_by_id(quote_id).await?;
        let extra = QuoteExtra { id: ObjectId::new(), description: req.description, price: req.price };
        let view = QuoteExtraView::new(&quote.id, &extra);
        quote.extras.push(extra);
        self.save(quote).await?;
        info!(%quote_id, extra_id = %view.id, "Extra added");
        Ok(view)
    }

    #[instrument(skip(self, req))]
    async fn update_extra(
        &self,
        quote_id: ObjectId,
        extra_id: ObjectId,
        req: UpdateExtraRequest,
    ) -> ServiceResult<QuoteExtraView> {
        let mut quote = self.repos.quotes.get_by_id(quote_id).await?;
        let index = find_extra(&quote, extra_id)?;
        let extra = &mut quote.extras[index];
        if let Some(description) = req.description {
            extra.description = description;
        }
        if let Some(price) = req.price {
            extra.price = price;
        }
        let view = QuoteExtraView::new(&quote_id, extra);
        self.save(quote).await?;
        Ok(view)
    }

    #[instrument(skip(self))]
    async fn delete_extra(&self, quote_id: ObjectId, extra_id: ObjectId) -> ServiceResult<()> {
        let mut quote = self.repos.quotes.get_by_id(quote_id).await?;
        let index = find_extra(&quote, extra_id)?;
        quote.extras.remove(index);
        self.save(quote).await?;
        info!(%quote_id, %extra_id, "Extra removed");
        Ok(())
    }
}
