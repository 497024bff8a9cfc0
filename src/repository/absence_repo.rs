use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use tracing::{info, instrument};

use crate::model::staff_absence::StaffAbsence;
use crate::repository::mongo_store::{collect, MongoStore, ABSENCES};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait AbsenceRepository: Send + Sync {
    async fn create(&self, absence: StaffAbsence) -> RepositoryResult<StaffAbsence>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<StaffAbsence>;
    async fn list(&self) -> RepositoryResult<Vec<StaffAbsence>>;
    /// Ordered by start date
    async fn list_for_user(&self, user_id: ObjectId) -> RepositoryResult<Vec<StaffAbsence>>;
    async fn update(&self, absence: StaffAbsence) -> RepositoryResult<StaffAbsence>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoAbsenceRepository {
    collection: mongodb::Collection<StaffAbsence>,
}

impl MongoAbsenceRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoAbsenceRepository { collection: store.collection(ABSENCES) }
    }
}

#[async_trait]
impl AbsenceRepository for MongoAbsenceRepository {
    #[instrument(skip(self, absence), fields(user_id = %absence.user_id))]
    async fn create(&self, absence: StaffAbsence) -> RepositoryResult<StaffAbsence> {
        self.collection.insert_one(&absence, None).await?;
        info!(absence_id = %absence.id, "Absence recorded");
        Ok(absence)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<StaffAbsence> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::missing("Absence", &id))
    }

    async fn list(&self) -> RepositoryResult<Vec<StaffAbsence>> {
        let options = FindOptions::builder().sort(doc! { "start_date": 1 }).build();
        collect(self.collection.find(None, options).await?).await
    }

    async fn list_for_user(&self, user_id: ObjectId) -> RepositoryResult<Vec<StaffAbsence>> {
        let options = FindOptions::builder().sort(doc! { "start_date": 1 }).build();
        collect(self.collection.find(doc! { "user_id": user_id }, options).await?).await
    }

    #[instrument(skip(self, absence), fields(id = %absence.id))]
    async fn update(&self, absence: StaffAbsence) -> RepositoryResult<StaffAbsence> {
        let result = self
            .collection
            .replace_one(doc! { "_id": absence.id }, &absence, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::missing("Absence", &absence.id));
        }
        Ok(absence)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::missing("Absence", &id));
        }
        Ok(())
    }
}
