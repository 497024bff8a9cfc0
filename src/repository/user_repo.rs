use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use mongodb::options::FindOptions;
use tracing::{error, info, instrument};

use crate::model::user::{User, UserRole};
use crate::repository::mongo_store::{collect, MongoStore, ABSENCES, ASSIGNMENTS, USERS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Rejects duplicate usernames and emails with `AlreadyExists`.
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    /// Sorted by username
    async fn list(&self) -> RepositoryResult<Vec<User>>;
    async fn count_by_role(&self, role: UserRole) -> RepositoryResult<u64>;
    async fn update(&self, user: User) -> RepositoryResult<User>;
    /// Removes the user together with their absences and assignments.
    async fn delete_cascade(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoUserRepository {
    store: MongoStore,
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoUserRepository { store: store.clone(), collection: store.collection(USERS) }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: User) -> RepositoryResult<User> {
        match self.collection.insert_one(&user, None).await {
            Ok(_) => {
                info!(user_id = %user.id, "User inserted");
                Ok(user)
            }
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(e.into())
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "username": username }, None).await?)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }, None).await?)
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        let options = FindOptions::builder().sort(doc! { "username": 1 }).build();
        collect(self.collection.find(None, options).await?).await
    }

    async fn count_by_role(&self, role: UserRole) -> RepositoryResult<u64> {
        Ok(self
            .collection
            .count_documents(doc! { "role": role.as_str() }, None)
            .await?)
    }

    #[instrument(skip(self, user), fields(id = %user.id))]
    async fn update(&self, user: User) -> RepositoryResult<User> {
        let result = self.collection.replace_one(doc! { "_id": user.id }, &user, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No user found to update for ID: {}", user.id)));
        }
        Ok(user)
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
            return Err(RepositoryError::missing("User", &id));
        }
        for name in [ABSENCES, ASSIGNMENTS] {
            self.store
                .collection::<Document>(name)
                .delete_many_with_session(doc! { "user_id": id }, None, &mut session)
                .await?;
        }
        session.commit_transaction().await?;
        info!("User deleted with absences and assignments");
        Ok(())
    }
}
