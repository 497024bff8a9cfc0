use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use mongodb::options::FindOptions;
use tracing::{error, info, instrument};

use crate::model::job::Job;
use crate::repository::mongo_store::{collect, MongoStore, ASSIGNMENTS, JOBS, PAYMENTS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: Job) -> RepositoryResult<Job>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Job>;
    /// Ordered by build start, unscheduled jobs last
    async fn list(&self) -> RepositoryResult<Vec<Job>>;
    async fn list_by_client(&self, client_id: ObjectId) -> RepositoryResult<Vec<Job>>;
    async fn find_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Option<Job>>;
    async fn update(&self, job: Job) -> RepositoryResult<Job>;
    /// Removes the job with its assignments and payments in one transaction.
    async fn delete_cascade(&self, id: ObjectId) -> RepositoryResult<()>;
}

/// Unscheduled jobs sort after scheduled ones; ties keep creation order.
pub fn sort_by_schedule(jobs: &mut [Job]) {
    jobs.sort_by_key(|job| (job.build_start_date.is_none(), job.build_start_date, job.id));
}

pub struct MongoJobRepository {
    store: MongoStore,
    collection: mongodb::Collection<Job>,
}

impl MongoJobRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoJobRepository { store: store.clone(), collection: store.collection(JOBS) }
    }

    async fn find_sorted(&self, filter: Option<Document>) -> RepositoryResult<Vec<Job>> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let mut jobs = collect(self.collection.find(filter, options).await?).await?;
        sort_by_schedule(&mut jobs);
        Ok(jobs)
    }
}

#[async_trait]
impl JobRepository for MongoJobRepository {
    #[instrument(skip(self, job), fields(name = %job.name))]
    async fn create(&self, job: Job) -> RepositoryResult<Job> {
        self.collection.insert_one(&job, None).await.map_err(|e| {
            error!("Failed to create job: {}", e);
            RepositoryError::from(e)
        })?;
        info!(job_id = %job.id, "Job created");
        Ok(job)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Job> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::missing("Job", &id))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepositoryResult<Vec<Job>> {
        self.find_sorted(None).await
    }

    #[instrument(skip(self))]
    async fn list_by_client(&self, client_id: ObjectId) -> RepositoryResult<Vec<Job>> {
        self.find_sorted(Some(doc! { "client_id": client_id })).await
    }

    #[instrument(skip(self))]
    async fn find_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Option<Job>> {
        Ok(self.collection.find_one(doc! { "quote_id": quote_id }, None).await?)
    }

    #[instrument(skip(self, job), fields(id = %job.id))]
    async fn update(&self, job: Job) -> RepositoryResult<Job> {
        let result = self.collection.replace_one(doc! { "_id": job.id }, &job, None).await?;
        if result.matched_count == 0 {
            error!("No job found to update for ID: {}", job.id);
            return Err(RepositoryError::missing("Job", &job.id));
        }
        info!("Job updated");
        Ok(job)
    }

    #[instrument(skip(self))]
    async fn delete_cascade(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut session = self.store.begin().await?;
        let deleted = self
            .collection
            .delete_one_with_session(doc! { "_id": id }, None, &mut session)
            .await?;
        if deleted.deleted_count == 0 {
            session.abort_transaction().await?;
            return Err(RepositoryError::missing("Job", &id));
        }
        let assignments = self
            .store
            .collection::<Document>(ASSIGNMENTS)
            .delete_many_with_session(doc! { "job_id": id }, None, &mut session)
            .await?;
        let payments = self
            .store
            .collection::<Document>(PAYMENTS)
            .delete_many_with_session(doc! { "job_id": id }, None, &mut session)
            .await?;
        session.commit_transaction().await?;
        info!(
            assignments = assignments.deleted_count,
            payments = payments.deleted_count,
            "Job deleted with its children"
        );
        Ok(())
    }
}
