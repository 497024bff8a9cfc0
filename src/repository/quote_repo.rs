use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use tracing::{error, info, instrument};

use crate::model::quote::Quote;
use crate::repository::mongo_store::{collect, MongoStore, QUOTES};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Quotes own their extras; every write stores the whole document so the
/// extras list is replaced in the same atomic write.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote>;
    /// Newest first, optionally for one client
    async fn list(&self, client_id: Option<ObjectId>) -> RepositoryResult<Vec<Quote>>;
    async fn update(&self, quote: Quote) -> RepositoryResult<Quote>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoQuoteRepository {
    collection: mongodb::Collection<Quote>,
}

impl MongoQuoteRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoQuoteRepository { collection: store.collection(QUOTES) }
    }
}

#[async_trait]
impl QuoteRepository for MongoQuoteRepository {
    #[instrument(skip(self, quote), fields(name = %quote.name))]
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote> {
        info!("Creating new quote");
        match self.collection.insert_one(&quote, None).await {
            Ok(_) => {
                info!(quote_id = %quote.id, "Quote created successfully");
                Ok(quote)
            }
            Err(e) => {
                error!("Failed to create quote: {}", e);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote> {
        match self.collection.find_one(doc! { "_id": id }, None).await {
            Ok(Some(quote)) => Ok(quote),
            Ok(None) => {
                error!("Quote not found for ID: {}", id);
                Err(RepositoryError::missing("Quote", &id))
            }
            Err(e) => {
                error!("Failed to fetch quote by ID: {}", e);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    async fn list(&self, client_id: Option<ObjectId>) -> RepositoryResult<Vec<Quote>> {
        let filter = client_id.map(|id| doc! { "client_id": id });
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let quotes = collect(self.collection.find(filter, options).await?).await?;
        info!("Fetched {} quotes", quotes.len());
        Ok(quotes)
    }

    #[instrument(skip(self, quote), fields(id = %quote.id))]
    async fn update(&self, quote: Quote) -> RepositoryResult<Quote> {
        let result = self
            .collection
            .replace_one(doc! { "_id": quote.id }, &quote, None)
            .await?;
        if result.matched_count == 0 {
            error!("No quote found to update for ID: {}", quote.id);
            return Err(RepositoryError::missing("Quote", &quote.id));
        }
        info!("Quote updated successfully");
        Ok(quote)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            error!("No quote found to delete for ID: {}", id);
            return Err(RepositoryError::missing("Quote", &id));
        }
        info!("Quote deleted successfully");
        Ok(())
    }
}
