//! Name lookups for response views, loaded once per request.

use std::collections::HashMap;

use bson::oid::ObjectId;

use crate::dto::job_dto::{AssignmentView, JobExtras, JobView};
use crate::dto::payment_dto::PaymentView;
use crate::model::job::Job;
use crate::model::job_assignment::{AssignmentRole, JobAssignment};
use crate::model::payment::Payment;
use crate::repository::Repositories;
use crate::scheduling::job_status;
use crate::util::dates::today;
use crate::util::error::ServiceResult;

#[derive(Debug, Default)]
pub struct Directory {
    clients: HashMap<ObjectId, String>,
    users: HashMap<ObjectId, String>,
    jobs: HashMap<ObjectId, (String, ObjectId)>,
}

impl Directory {
    pub async fn load(repos: &Repositories) -> ServiceResult<Self> {
        let clients = repos.clients.list().await?;
        let users = repos.users.list().await?;
        let jobs = repos.jobs.list().await?;
        Ok(Directory {
            clients: clients.into_iter().map(|c| (c.id, c.name)).collect(),
            users: users.into_iter().map(|u| (u.id, u.full_name())).collect(),
            jobs: jobs.into_iter().map(|j| (j.id, (j.name, j.client_id))).collect(),
        })
    }

    pub fn client_name(&self, id: &ObjectId) -> Option<String> {
        self.clients.get(id).cloned()
    }

    pub fn user_name(&self, id: &ObjectId) -> Option<String> {
        self.users.get(id).cloned()
    }

    pub fn job_name(&self, id: &ObjectId) -> Option<String> {
        self.jobs.get(id).map(|(name, _)| name.clone())
    }

    /// Client name of the job's owner.
    pub fn job_client_name(&self, job_id: &ObjectId) -> Option<String> {
        self.jobs.get(job_id).and_then(|(_, client_id)| self.client_name(client_id))
    }

    pub fn payment_view(&self, payment: Payment) -> PaymentView {
        let job_name = self.job_name(&payment.job_id);
        let client_name = self.job_client_name(&payment.job_id);
        PaymentView::new(payment, job_name, client_name)
    }

    pub fn assignment_view(&self, assignment: JobAssignment) -> AssignmentView {
        let job_name = self.job_name(&assignment.job_id);
        let user_name = self.user_name(&assignment.user_id);
        AssignmentView::new(assignment, job_name, user_name)
    }

    /// Full names of the staff holding `role` among `assignments`.
    pub fn team(&self, assignments: &[JobAssignment], role: AssignmentRole) -> Vec<String> {
        assignments
            .iter()
            .filter(|a| a.role == role)
            .filter_map(|a| self.user_name(&a.user_id))
            .collect()
    }
}

/// Assembles job views with teams, payments and status in one pass over the
/// assignment and payment collections.
pub async fn job_views(repos: &Repositories, jobs: Vec<Job>) -> ServiceResult<Vec<JobView>> {
    let directory = Directory::load(repos).await?;
    let mut assignments: HashMap<ObjectId, Vec<JobAssignment>> = HashMap::new();
    for a in repos.assignments.list().await? {
        assignments.entry(a.job_id).or_default().push(a);
    }
    let mut payments: HashMap<ObjectId, Vec<Payment>> = HashMap::new();
    for p in repos.payments.list().await? {
        payments.entry(p.job_id).or_default().push(p);
    }

    let today = today();
    Ok(jobs
        .into_iter()
        .map(|job| {
            let crew = assignments.remove(&job.id).unwrap_or_default();
            let extras = JobExtras {
                client_name: directory.client_name(&job.client_id),
                build_team: directory.team(&crew, AssignmentRole::BuildTeam),
                fit_team: directory.team(&crew, AssignmentRole::FitTeam),
                payments: payments
                    .remove(&job.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| directory.payment_view(p))
                    .collect(),
            };
            let status = job_status::for_job(&job, today);
            JobView::new(job, status, extras)
        })
        .collect())
}

pub async fn job_view(repos: &Repositories, job: Job) -> ServiceResult<JobView> {
    let id = job.id;
    job_views(repos, vec![job])
        .await?
        .pop()
        .ok_or_else(|| crate::util::error::ServiceError::NotFound(format!("Job {} not found", id)))
}
