use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{error, info, instrument};

use crate::dto::parse_object_id;
use crate::dto::payment_dto::{CreatePaymentRequest, PaymentFilter, PaymentView, UpdatePaymentStatusRequest};
use crate::dto::report_dto::InvoicingResponse;
use crate::model::payment::{Payment, PaymentStatus};
use crate::repository::Repositories;
use crate::service::directory::Directory;
use crate::util::dates::{parse_optional_date, today};
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::invoicing::InvoicingService;

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn list_payments(&self, filter: PaymentFilter) -> ServiceResult<Vec<PaymentView>>;
    async fn get_payment(&self, id: ObjectId) -> ServiceResult<PaymentView>;
    async fn create_payment(&self, req: CreatePaymentRequest) -> ServiceResult<PaymentView>;
    async fn update_status(&self, id: ObjectId, req: UpdatePaymentStatusRequest) -> ServiceResult<PaymentView>;
    async fn create_in_invoicing(&self, id: ObjectId) -> ServiceResult<InvoicingResponse>;
}

pub struct PaymentServiceImpl {
    pub repos: Repositories,
    pub invoicing: Arc<dyn InvoicingService>,
}

impl PaymentServiceImpl {
    pub fn new(repos: Repositories, invoicing: Arc<dyn InvoicingService>) -> Self {
        Self { repos, invoicing }
    }

    async fn view(&self, payment: Payment) -> ServiceResult<PaymentView> {
        let directory = Directory::load(&self.repos).await?;
        Ok(directory.payment_view(payment))
    }
}

/// Paid with no date means paid today; a paid date on a due payment settles it.
fn apply_status_change(payment: &mut Payment, status: Option<PaymentStatus>, paid_date: Option<Option<chrono::NaiveDate>>) {
    if let Some(status) = status {
        payment.status = status;
        if status == PaymentStatus::Paid && payment.paid_date.is_none() {
            payment.paid_date = Some(today());
        }
    }
    if let Some(paid_date) = paid_date {
        payment.paid_date = paid_date;
        if payment.paid_date.is_some() && payment.status == PaymentStatus::Due {
            payment.status = PaymentStatus::Paid;
        }
    }
}

#[async_trait]
impl PaymentService for PaymentServiceImpl {
    #[instrument(skip(self))]
    async fn list_payments(&self, filter: PaymentFilter) -> ServiceResult<Vec<PaymentView>> {
        let job_id = filter
            .job_id
            .as_deref()
            .map(|raw| parse_object_id("job_id", raw))
            .transpose()?;
        let payments = match job_id {
            Some(job_id) => self.repos.payments.list_for_job(job_id).await?,
            None => self.repos.payments.list().await?,
        };
        let directory = Directory::load(&self.repos).await?;
        Ok(payments
            .into_iter()
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .map(|p| directory.payment_view(p))
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_payment(&self, id: ObjectId) -> ServiceResult<PaymentView> {
        let payment = self.repos.payments.get_by_id(id).await?;
        self.view(payment).await
    }

    #[instrument(skip(self, req), fields(job_id = %req.job_id))]
    async fn create_payment(&self, req: CreatePaymentRequest) -> ServiceResult<PaymentView> {
        let job_id = parse_object_id("job_id", &req.job_id)?;
        self.repos.jobs.get_by_id(job_id).await?;

        let mut payment = Payment::new_due(
            job_id,
            req.payment_type,
            req.amount,
            parse_optional_date("due_date", req.due_date.as_deref())?,
        );
        let paid_date = parse_optional_date("paid_date", req.paid_date.as_deref())?;
        apply_status_change(&mut payment, req.status, paid_date.map(Some));

        let payment = self.repos.payments.create(payment).await?;
        info!(payment_id = %payment.id, "Payment created");
        self.view(payment).await
    }

    #[instrument(skip(self, req))]
    async fn update_status(&self, id: ObjectId, req: UpdatePaymentStatusRequest) -> ServiceResult<PaymentView> {
        let mut payment = self.repos.payments.get_by_id(id).await?;
        let paid_date = match req.paid_date {
            Some(raw) => Some(parse_optional_date("paid_date", raw.as_deref())?),
            None => None,
        };
        apply_status_change(&mut payment, req.status, paid_date);
        payment.updated_at = Utc::now().to_rfc3339();
        let payment = self.repos.payments.update(payment).await?;
        info!(payment_id = %payment.id, status = ?payment.status, "Payment status updated");
        self.view(payment).await
    }

    #[instrument(skip(self))]
    async fn create_in_invoicing(&self, id: ObjectId) -> ServiceResult<InvoicingResponse> {
        let mut payment = self.repos.payments.get_by_id(id).await?;
        let reference = self.invoicing.create_invoice(&payment).await.map_err(|e| {
            error!("Invoicing failed for payment {}: {}", id, e);
            ServiceError::InternalError(e.to_string())
        })?;
        payment.invoicing_ref = Some(reference.clone());
        payment.updated_at = Utc::now().to_rfc3339();
        self.repos.payments.update(payment).await?;
        Ok(InvoicingResponse {
            message: "Invoice created in invoicing system".to_string(),
            invoicing_ref: reference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payment::PaymentType;
    use chrono::NaiveDate;

    fn due() -> Payment {
        Payment::new_due(ObjectId::new(), PaymentType::Deposit, 100.0, None)
    }

    #[test]
    fn test_paid_without_date_stamps_today() {
        let mut p = due();
        apply_status_change(&mut p, Some(PaymentStatus::Paid), None);
        assert_eq!(p.status, PaymentStatus::Paid);
        assert_eq!(p.paid_date, Some(today()));
    }

    #[test]
    fn test_paid_date_settles_due_payment() {
        let mut p = due();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        apply_status_change(&mut p, None, Some(Some(date)));
        assert_eq!(p.status, PaymentStatus::Paid);
        assert_eq!(p.paid_date, Some(date));
    }

    #[test]
    fn test_clearing_paid_date_keeps_status() {
        let mut p = due();
        apply_status_change(&mut p, Some(PaymentStatus::Paid), None);
        apply_status_change(&mut p, None, Some(None));
        assert_eq!(p.paid_date, None);
        assert_eq!(p.status, PaymentStatus::Paid);
    }
}
