use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use tracing::{error, info, instrument};

use crate::model::client::Client;
use crate::repository::mongo_store::{collect, MongoStore, CLIENTS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, client: Client) -> RepositoryResult<Client>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Client>;
    /// Sorted by name
    async fn list(&self) -> RepositoryResult<Vec<Client>>;
    async fn update(&self, client: Client) -> RepositoryResult<Client>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoClientRepository {
    collection: mongodb::Collection<Client>,
}

impl MongoClientRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoClientRepository { collection: store.collection(CLIENTS) }
    }
}

#[async_trait]
impl ClientRepository for MongoClientRepository {
    #[instrument(skip(self, client), fields(name = %client.name))]
    async fn create(&self, client: Client) -> RepositoryResult<Client> {
        match self.collection.insert_one(&client, None).await {
            Ok(_) => {
                info!(client_id = %client.id, "Client created");
                Ok(client)
            }
            Err(e) => {
                error!("Failed to create client: {}", e);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Client> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::missing("Client", &id))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepositoryResult<Vec<Client>> {
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
        collect(self.collection.find(None, options).await?).await
    }

    #[instrument(skip(self, client), fields(id = %client.id))]
    async fn update(&self, client: Client) -> RepositoryResult<Client> {
        let result = self
            .collection
            .replace_one(doc! { "_id": client.id }, &client, None)
            .await?;
        if result.matched_count == 0 {
            error!("No client found to update for ID: {}", client.id);
            return Err(RepositoryError::missing("Client", &client.id));
        }
        info!("Client updated");
        Ok(client)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::missing("Client", &id));
        }
        info!("Client deleted");
        Ok(())
    }
}
