//! Process-local store implementing every repository trait. Multi-collection
//! writes happen under one write lock, so they are atomic like the Mongo
//! transactions they stand in for.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;
use tracing::debug;

use crate::model::client::Client;
use crate::model::job::Job;
use crate::model::job_assignment::JobAssignment;
use crate::model::payment::Payment;
use crate::model::quote::Quote;
use crate::model::staff_absence::StaffAbsence;
use crate::model::user::{User, UserRole};
use crate::repository::absence_repo::AbsenceRepository;
use crate::repository::assignment_repo::AssignmentRepository;
use crate::repository::client_repo::ClientRepository;
use crate::repository::job_repo::{sort_by_schedule, JobRepository};
use crate::repository::payment_repo::PaymentRepository;
use crate::repository::quote_repo::QuoteRepository;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::user_repo::UserRepository;

#[derive(Default)]
struct Tables {
    clients: BTreeMap<ObjectId, Client>,
    quotes: BTreeMap<ObjectId, Quote>,
    jobs: BTreeMap<ObjectId, Job>,
    assignments: BTreeMap<ObjectId, JobAssignment>,
    payments: BTreeMap<ObjectId, Payment>,
    users: BTreeMap<ObjectId, User>,
    absences: BTreeMap<ObjectId, StaffAbsence>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn insert_new<T>(table: &mut BTreeMap<ObjectId, T>, id: ObjectId, value: T, entity: &str) -> RepositoryResult<()> {
    if table.contains_key(&id) {
        return Err(RepositoryError::already_exists(format!("{} {} already exists", entity, id)));
    }
    table.insert(id, value);
    Ok(())
}

fn replace_existing<T>(table: &mut BTreeMap<ObjectId, T>, id: ObjectId, value: T, entity: &str) -> RepositoryResult<()> {
    match table.get_mut(&id) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(RepositoryError::missing(entity, &id)),
    }
}

fn fetch<T: Clone>(table: &BTreeMap<ObjectId, T>, id: ObjectId, entity: &str) -> RepositoryResult<T> {
    table.get(&id).cloned().ok_or_else(|| RepositoryError::missing(entity, &id))
}

fn remove<T>(table: &mut BTreeMap<ObjectId, T>, id: ObjectId, entity: &str) -> RepositoryResult<T> {
    table.remove(&id).ok_or_else(|| RepositoryError::missing(entity, &id))
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn create(&self, client: Client) -> RepositoryResult<Client> {
        let mut tables = self.tables.write().await;
        insert_new(&mut tables.clients, client.id, client.clone(), "Client")?;
        Ok(client)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Client> {
        fetch(&self.tables.read().await.clients, id, "Client")
    }

    async fn list(&self) -> RepositoryResult<Vec<Client>> {
        let mut clients: Vec<Client> = self.tables.read().await.clients.values().cloned().collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn update(&self, client: Client) -> RepositoryResult<Client> {
        let mut tables = self.tables.write().await;
        replace_existing(&mut tables.clients, client.id, client.clone(), "Client")?;
        Ok(client)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        remove(&mut self.tables.write().await.clients, id, "Client").map(|_| ())
    }
}

#[async_trait]
impl QuoteRepository for InMemoryStore {
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote> {
        let mut tables = self.tables.write().await;
        insert_new(&mut tables.quotes, quote.id, quote.clone(), "Quote")?;
        Ok(quote)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote> {
        fetch(&self.tables.read().await.quotes, id, "Quote")
    }

    async fn list(&self, client_id: Option<ObjectId>) -> RepositoryResult<Vec<Quote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .quotes
            .values()
            .rev()
            .filter(|q| client_id.map_or(true, |id| q.client_id == id))
            .cloned()
            .collect())
    }

    async fn update(&self, quote: Quote) -> RepositoryResult<Quote> {
        let mut tables = self.tables.write().await;
        replace_existing(&mut tables.quotes, quote.id, quote.clone(), "Quote")?;
        Ok(quote)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        remove(&mut self.tables.write().await.quotes, id, "Quote").map(|_| ())
    }
}

#[async_trait]
impl JobRepository for InMemoryStore {
    async fn create(&self, job: Job) -> RepositoryResult<Job> {
        let mut tables = self.tables.write().await;
        insert_new(&mut tables.jobs, job.id, job.clone(), "Job")?;
        Ok(job)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Job> {
        fetch(&self.tables.read().await.jobs, id, "Job")
    }

    async fn list(&self) -> RepositoryResult<Vec<Job>> {
        let mut jobs: Vec<Job> = self.tables.read().await.jobs.values().cloned().collect();
        sort_by_schedule(&mut jobs);
        Ok(jobs)
    }

    async fn list_by_client(&self, client_id: ObjectId) -> RepositoryResult<Vec<Job>> {
        let mut jobs: Vec<Job> = self
            .tables
            .read()
            .await
            .jobs
            .values()
            .filter(|j| j.client_id == client_id)
            .cloned()
            .collect();
        sort_by_schedule(&mut jobs);
        Ok(jobs)
    }

    async fn find_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Option<Job>> {
        let tables = self.tables.read().await;
        Ok(tables.jobs.values().find(|j| j.quote_id == Some(quote_id)).cloned())
    }

    async fn update(&self, job: Job) -> RepositoryResult<Job> {
        let mut tables = self.tables.write().await;
        replace_existing(&mut tables.jobs, job.id, job.clone(), "Job")?;
        Ok(job)
    }

    async fn delete_cascade(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.jobs, id, "Job")?;
        tables.assignments.retain(|_, a| a.job_id != id);
        tables.payments.retain(|_, p| p.job_id != id);
        debug!(job_id = %id, "Job and children removed from memory store");
        Ok(())
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryStore {
    async fn create(&self, assignment: JobAssignment) -> RepositoryResult<JobAssignment> {
        let mut tables = self.tables.write().await;
        insert_new(&mut tables.assignments, assignment.id, assignment.clone(), "Assignment")?;
        Ok(assignment)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<JobAssignment> {
        fetch(&self.tables.read().await.assignments, id, "Assignment")
    }

    async fn list(&self) -> RepositoryResult<Vec<JobAssignment>> {
        Ok(self.tables.read().await.assignments.values().cloned().collect())
    }

    async fn list_for_job(&self, job_id: ObjectId) -> RepositoryResult<Vec<JobAssignment>> {
        let tables = self.tables.read().await;
        Ok(tables.assignments.values().filter(|a| a.job_id == job_id).cloned().collect())
    }

    async fn list_for_user(&self, user_id: ObjectId) -> RepositoryResult<Vec<JobAssignment>> {
        let tables = self.tables.read().await;
        Ok(tables.assignments.values().filter(|a| a.user_id == user_id).cloned().collect())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        remove(&mut self.tables.write().await.assignments, id, "Assignment").map(|_| ())
    }

    async fn replace_for_job(
        &self,
        job_id: ObjectId,
        assignments: Vec<JobAssignment>,
    ) -> RepositoryResult<Vec<JobAssignment>> {
        let mut tables = self.tables.write().await;
        tables.assignments.retain(|_, a| a.job_id != job_id);
        for assignment in &assignments {
            tables.assignments.insert(assignment.id, assignment.clone());
        }
        Ok(assignments)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn create(&self, payment: Payment) -> RepositoryResult<Payment> {
        let mut tables = self.tables.write().await;
        insert_new(&mut tables.payments, payment.id, payment.clone(), "Payment")?;
        Ok(payment)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Payment> {
        fetch(&self.tables.read().await.payments, id, "Payment")
    }

    async fn list(&self) -> RepositoryResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self.tables.read().await.payments.values().cloned().collect();
        payments.sort_by_key(|p| (p.due_date.is_none(), p.due_date));
        Ok(payments)
    }

    async fn list_for_job(&self, job_id: ObjectId) -> RepositoryResult<Vec<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables.payments.values().filter(|p| p.job_id == job_id).cloned().collect())
    }

    async fn update(&self, payment: Payment) -> RepositoryResult<Payment> {
        let mut tables = self.tables.write().await;
        replace_existing(&mut tables.payments, payment.id, payment.clone(), "Payment")?;
        Ok(payment)
    }

    async fn replace_for_job(&self, job_id: ObjectId, payments: Vec<Payment>) -> RepositoryResult<Vec<Payment>> {
        let mut tables = self.tables.write().await;
        tables.payments.retain(|_, p| p.job_id != job_id);
        for payment in &payments {
            tables.payments.insert(payment.id, payment.clone());
        }
        Ok(payments)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: User) -> RepositoryResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(RepositoryError::already_exists(format!(
                "Duplicate key: username '{}' or email '{}'",
                user.username, user.email
            )));
        }
        insert_new(&mut tables.users, user.id, user.clone(), "User")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        let mut users: Vec<User> = self.tables.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn count_by_role(&self, role: UserRole) -> RepositoryResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().filter(|u| u.role == role).count() as u64)
    }

    async fn update(&self, user: User) -> RepositoryResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && (u.username == user.username || u.email == user.email))
        {
            return Err(RepositoryError::already_exists("Duplicate key: username or email"));
        }
        replace_existing(&mut tables.users, user.id, user.clone(), "User")?;
        Ok(user)
    }

    async fn delete_cascade(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.users, id, "User")?;
        tables.absences.retain(|_, a| a.user_id != id);
        tables.assignments.retain(|_, a| a.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl AbsenceRepository for InMemoryStore {
    async fn create(&self, absence: StaffAbsence) -> RepositoryResult<StaffAbsence> {
        let mut tables = self.tables.write().await;
        insert_new(&mut tables.absences, absence.id, absence.clone(), "Absence")?;
        Ok(absence)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<StaffAbsence> {
        fetch(&self.tables.read().await.absences, id, "Absence")
    }

    async fn list(&self) -> RepositoryResult<Vec<StaffAbsence>> {
        let mut absences: Vec<StaffAbsence> = self.tables.read().await.absences.values().cloned().collect();
        absences.sort_by_key(|a| a.start_date);
        Ok(absences)
    }

    async fn list_for_user(&self, user_id: ObjectId) -> RepositoryResult<Vec<StaffAbsence>> {
        let tables = self.tables.read().await;
        let mut absences: Vec<StaffAbsence> =
            tables.absences.values().filter(|a| a.user_id == user_id).cloned().collect();
        absences.sort_by_key(|a| a.start_date);
        Ok(absences)
    }

    async fn update(&self, absence: StaffAbsence) -> RepositoryResult<StaffAbsence> {
        let mut tables = self.tables.write().await;
        replace_existing(&mut tables.absences, absence.id, absence.clone(), "Absence")?;
        Ok(absence)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        remove(&mut self.tables.write().await.absences, id, "Absence").map(|_| ())
    }
}
