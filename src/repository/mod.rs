pub mod absence_repo;
pub mod assignment_repo;
pub mod client_repo;
pub mod job_repo;
pub mod memory_store;
pub mod mongo_store;
pub mod payment_repo;
pub mod quote_repo;
pub mod repository_error;
pub mod user_repo;

use std::sync::Arc;

use crate::config::MongoConfig;
use absence_repo::{AbsenceRepository, MongoAbsenceRepository};
use assignment_repo::{AssignmentRepository, MongoAssignmentRepository};
use client_repo::{ClientRepository, MongoClientRepository};
use job_repo::{JobRepository, MongoJobRepository};
use memory_store::InMemoryStore;
use mongo_store::MongoStore;
use payment_repo::{MongoPaymentRepository, PaymentRepository};
use quote_repo::{MongoQuoteRepository, QuoteRepository};
use repository_error::RepositoryResult;
use user_repo::{MongoUserRepository, UserRepository};

/// Handles to every collection, passed explicitly into each service.
#[derive(Clone)]
pub struct Repositories {
    pub clients: Arc<dyn ClientRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub absences: Arc<dyn AbsenceRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Repositories {
            clients: store.clone(),
            quotes: store.clone(),
            jobs: store.clone(),
            assignments: store.clone(),
            payments: store.clone(),
            users: store.clone(),
            absences: store,
        }
    }

    pub async fn mongo(config: &MongoConfig) -> RepositoryResult<Self> {
        let store = MongoStore::connect(config).await?;
        store.ensure_indexes().await?;
        Ok(Repositories {
            clients: Arc::new(MongoClientRepository::new(&store)),
            quotes: Arc::new(MongoQuoteRepository::new(&store)),
            jobs: Arc::new(MongoJobRepository::new(&store)),
            assignments: Arc::new(MongoAssignmentRepository::new(&store)),
            payments: Arc::new(MongoPaymentRepository::new(&store)),
            users: Arc::new(MongoUserRepository::new(&store)),
            absences: Arc::new(MongoAbsenceRepository::new(&store)),
        })
    }
}
