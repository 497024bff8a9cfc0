use futures::stream::TryStreamExt;
use mongodb::options::{ClientOptions, Credential, IndexOptions, ResolverConfig};
use mongodb::{bson::doc, Client, ClientSession, Collection, Cursor, Database, IndexModel};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use crate::config::MongoConfig;
use crate::repository::repository_error::RepositoryResult;

pub const CLIENTS: &str = "clients";
pub const QUOTES: &str = "quotes";
pub const JOBS: &str = "jobs";
pub const ASSIGNMENTS: &str = "job_assignments";
pub const PAYMENTS: &str = "payments";
pub const USERS: &str = "users";
pub const ABSENCES: &str = "staff_absences";

/// One driver client and database handle shared by every Mongo repository.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    #[instrument(skip(config), fields(database = %config.database))]
    pub async fn connect(config: &MongoConfig) -> RepositoryResult<Self> {
        let mut client_options =
            ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
        client_options.app_name = Some("CabinetryBackend".to_string());
        client_options.max_pool_size = Some(config.pool_size);
        client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            client_options.credential = Some(
                Credential::builder()
                    .username(username.clone())
                    .password(password.clone())
                    .build(),
            );
        }

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database);
        info!("Connected to MongoDB database {}", config.database);
        Ok(MongoStore { client, db })
    }

    pub fn collection<T>(&self, name: &str) -> Collection<T> {
        self.db.collection::<T>(name)
    }

    /// Session with a transaction already started. Needs a replica set.
    pub async fn begin(&self) -> RepositoryResult<ClientSession> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;
        Ok(session)
    }

    /// Unique usernames and emails, plus lookup indexes for the child collections.
    #[instrument(skip(self))]
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let unique = IndexOptions::builder().unique(true).build();
        let users = self.collection::<bson::Document>(USERS);
        users
            .create_index(
                IndexModel::builder().keys(doc! { "username": 1 }).options(unique.clone()).build(),
                None,
            )
            .await?;
        users
            .create_index(IndexModel::builder().keys(doc! { "email": 1 }).options(unique).build(), None)
            .await?;

        for (name, key) in [
            (ASSIGNMENTS, "job_id"),
            (ASSIGNMENTS, "user_id"),
            (PAYMENTS, "job_id"),
            (ABSENCES, "user_id"),
            (JOBS, "client_id"),
            (QUOTES, "client_id"),
        ] {
            self.collection::<bson::Document>(name)
                .create_index(IndexModel::builder().keys(doc! { key: 1 }).build(), None)
                .await?;
        }
        info!("MongoDB indexes ensured");
        Ok(())
    }
}

pub async fn collect<T>(cursor: Cursor<T>) -> RepositoryResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    Ok(cursor.try_collect().await?)
}
