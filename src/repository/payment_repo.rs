use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use tracing::{info, instrument};

use crate::model::payment::Payment;
use crate::repository::mongo_store::{collect, MongoStore, PAYMENTS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: Payment) -> RepositoryResult<Payment>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Payment>;
    async fn list(&self) -> RepositoryResult<Vec<Payment>>;
    async fn list_for_job(&self, job_id: ObjectId) -> RepositoryResult<Vec<Payment>>;
    async fn update(&self, payment: Payment) -> RepositoryResult<Payment>;
    /// Swaps the job's whole payment schedule for `payments` atomically.
    async fn replace_for_job(&self, job_id: ObjectId, payments: Vec<Payment>) -> RepositoryResult<Vec<Payment>>;
}

pub struct MongoPaymentRepository {
    store: MongoStore,
    collection: mongodb::Collection<Payment>,
}

impl MongoPaymentRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoPaymentRepository { store: store.clone(), collection: store.collection(PAYMENTS) }
    }
}

#[async_trait]
impl PaymentRepository for MongoPaymentRepository {
    #[instrument(skip(self, payment), fields(job_id = %payment.job_id))]
    async fn create(&self, payment: Payment) -> RepositoryResult<Payment> {
        self.collection.insert_one(&payment, None).await?;
        info!(payment_id = %payment.id, "Payment created");
        Ok(payment)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Payment> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::missing("Payment", &id))
    }

    async fn list(&self) -> RepositoryResult<Vec<Payment>> {
        let options = FindOptions::builder().sort(doc! { "due_date": 1 }).build();
        collect(self.collection.find(None, options).await?).await
    }

    async fn list_for_job(&self, job_id: ObjectId) -> RepositoryResult<Vec<Payment>> {
        collect(self.collection.find(doc! { "job_id": job_id }, None).await?).await
    }

    #[instrument(skip(self, payment), fields(id = %payment.id))]
    async fn update(&self, payment: Payment) -> RepositoryResult<Payment> {
        let result = self
            .collection
            .replace_one(doc! { "_id": payment.id }, &payment, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::missing("Payment", &payment.id));
        }
        Ok(payment)
    }

    #[instrument(skip(self, payments), fields(count = payments.len()))]
    async fn replace_for_job(&self, job_id: ObjectId, payments: Vec<Payment>) -> RepositoryResult<Vec<Payment>> {
        let mut session = self.store.begin().await?;
        self.collection
            .delete_many_with_session(doc! { "job_id": job_id }, None, &mut session)
            .await?;
        if !payments.is_empty() {
            self.collection
                .insert_many_with_session(&payments, None, &mut session)
                .await?;
        }
        session.commit_transaction().await?;
        info!(%job_id, "Payment schedule replaced");
        Ok(payments)
    }
}
