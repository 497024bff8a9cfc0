use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use tracing::{info, instrument};

use crate::model::job_assignment::JobAssignment;
use crate::repository::mongo_store::{collect, MongoStore, ASSIGNMENTS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn create(&self, assignment: JobAssignment) -> RepositoryResult<JobAssignment>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<JobAssignment>;
    async fn list(&self) -> RepositoryResult<Vec<JobAssignment>>;
    async fn list_for_job(&self, job_id: ObjectId) -> RepositoryResult<Vec<JobAssignment>>;
    async fn list_for_user(&self, user_id: ObjectId) -> RepositoryResult<Vec<JobAssignment>>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    /// Swaps the job's whole roster for `assignments` atomically.
    async fn replace_for_job(
        &self,
        job_id: ObjectId,
        assignments: Vec<JobAssignment>,
    ) -> RepositoryResult<Vec<JobAssignment>>;
}

pub struct MongoAssignmentRepository {
    store: MongoStore,
    collection: mongodb::Collection<JobAssignment>,
}

impl MongoAssignmentRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoAssignmentRepository { store: store.clone(), collection: store.collection(ASSIGNMENTS) }
    }

    async fn find(&self, filter: Option<Document>) -> RepositoryResult<Vec<JobAssignment>> {
        collect(self.collection.find(filter, None).await?).await
    }
}

#[async_trait]
impl AssignmentRepository for MongoAssignmentRepository {
    #[instrument(skip(self, assignment), fields(job_id = %assignment.job_id, user_id = %assignment.user_id))]
    async fn create(&self, assignment: JobAssignment) -> RepositoryResult<JobAssignment> {
        self.collection.insert_one(&assignment, None).await?;
        info!("Assignment created");
        Ok(assignment)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<JobAssignment> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::missing("Assignment", &id))
    }

    async fn list(&self) -> RepositoryResult<Vec<JobAssignment>> {
        self.find(None).await
    }

    async fn list_for_job(&self, job_id: ObjectId) -> RepositoryResult<Vec<JobAssignment>> {
        self.find(Some(doc! { "job_id": job_id })).await
    }

    async fn list_for_user(&self, user_id: ObjectId) -> RepositoryResult<Vec<JobAssignment>> {
        self.find(Some(doc! { "user_id": user_id })).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::missing("Assignment", &id));
        }
        Ok(())
    }

    #[instrument(skip(self, assignments), fields(count = assignments.len()))]
    async fn replace_for_job(
        &self,
        job_id: ObjectId,
        assignments: Vec<JobAssignment>,
    ) -> RepositoryResult<Vec<JobAssignment>> {
        let mut session = self.store.begin().await?;
        self.collection
            .delete_many_with_session(doc! { "job_id": job_id }, None, &mut session)
            .await?;
        if !assignments.is_empty() {
            self.collection
                .insert_many_with_session(&assignments, None, &mut session)
                .await?;
        }
        session.commit_transaction().await?;
        info!(%job_id, "Job roster replaced");
        Ok(assignments)
    }
}
