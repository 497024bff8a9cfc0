use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::dto::hex;
use crate::dto::job_dto::{
    AssignmentView, CalendarEvent, ClientUpdateEntry, CreateAssignmentRequest, CreateJobRequest, JobView,
    RescheduleJobRequest, ScheduleEntry, UpdateJobRequest,
};
use crate::dto::parse_object_id;
use crate::model::job::{Job, JobStage};
use crate::model::job_assignment::{AssignmentRole, JobAssignment};
use crate::model::user::UserRole;
use crate::repository::Repositories;
use crate::scheduling::auto_assign::{self, Candidate};
use crate::scheduling::{availability, payment_schedule, role_window, timeline, workload, DateWindow};
use crate::service::directory::{job_view, job_views, Directory};
use crate::util::dates::{parse_date, parse_optional_date, today};
use crate::util::error::{ServiceError, ServiceResult};

#[async_trait]
pub trait JobService: Send + Sync {
    async fn list_jobs(&self) -> ServiceResult<Vec<JobView>>;
    async fn get_job(&self, id: ObjectId) -> ServiceResult<JobView>;
    async fn create_job(&self, req: CreateJobRequest) -> ServiceResult<JobView>;
    async fn update_job(&self, id: ObjectId, req: UpdateJobRequest) -> ServiceResult<JobView>;
    async fn delete_job(&self, id: ObjectId) -> ServiceResult<()>;
    async fn update_stage(&self, id: ObjectId, stage: JobStage) -> ServiceResult<JobView>;
    async fn reschedule(&self, id: ObjectId, req: RescheduleJobRequest) -> ServiceResult<JobView>;
    /// Gantt rows for every unfinished job with a build start.
    async fn schedule(&self) -> ServiceResult<Vec<ScheduleEntry>>;
    /// Per-day events for the Monday to Sunday week containing `today`.
    async fn weekly_calendar(&self, today: NaiveDate) -> ServiceResult<Vec<CalendarEvent>>;
    async fn clients_needing_updates(&self) -> ServiceResult<Vec<ClientUpdateEntry>>;
    async fn list_assignments(&self, job_id: ObjectId) -> ServiceResult<Vec<AssignmentView>>;
    async fn add_assignment(&self, job_id: ObjectId, req: CreateAssignmentRequest) -> ServiceResult<AssignmentView>;
    async fn remove_assignment(&self, job_id: ObjectId, assignment_id: ObjectId) -> ServiceResult<()>;
    /// Replaces the job's roster with the least-loaded free staff.
    async fn auto_assign(&self, job_id: ObjectId) -> ServiceResult<Vec<AssignmentView>>;
}

pub struct JobServiceImpl {
    pub repos: Repositories,
}

impl JobServiceImpl {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Payment bookkeeping after a job write: a fresh schedule when the price
    /// changed, otherwise due dates follow moved milestones. Finishing the job
    /// brings completion payments forward to `today`.
    async fn refresh_payments(
        &self,
        job: &Job,
        regenerate: bool,
        dates_moved: bool,
        finished: bool,
        today: NaiveDate,
    ) -> ServiceResult<()> {
        let fresh = if regenerate { payment_schedule::generate(job) } else { None };
        let regenerated = fresh.is_some();
        let mut payments = match fresh {
            Some(schedule) => {
                info!(job_id = %job.id, "Regenerating payment schedule");
                self.repos.payments.replace_for_job(job.id, schedule).await?
            }
            None => {
                if !dates_moved && !finished {
                    return Ok(());
                }
                self.repos.payments.list_for_job(job.id).await?
            }
        };

        let before: Vec<Option<NaiveDate>> = payments.iter().map(|p| p.due_date).collect();
        if dates_moved && !regenerated {
            let moved = payment_schedule::sync_due_dates(job, &mut payments);
            debug!(job_id = %job.id, moved, "Synced payment due dates");
        }
        if finished {
            payment_schedule::settle_completion(&mut payments, today);
        }

        let now = Utc::now().to_rfc3339();
        for (mut payment, old_due) in payments.into_iter().zip(before) {
            if payment.due_date != old_due {
                payment.updated_at = now.clone();
                self.repos.payments.update(payment).await?;
            }
        }
        Ok(())
    }

    async fn team_lookup(&self) -> ServiceResult<HashMap<ObjectId, Vec<JobAssignment>>> {
        let mut by_job: HashMap<ObjectId, Vec<JobAssignment>> = HashMap::new();
        for a in self.repos.assignments.list().await? {
            by_job.entry(a.job_id).or_default().push(a);
        }
        Ok(by_job)
    }
}

/// A changed fitting date means the client has to be told again.
fn set_fitting_date(job: &mut Job, fitting_date: Option<NaiveDate>) {
    if job.fitting_date != fitting_date {
        job.fitting_date = fitting_date;
        job.client_needs_update = true;
        job.client_contacted = false;
    }
}

/// Moves the job to `stage`. Entering Fit records how long the build took.
/// Returns true when the job is now finished.
fn enter_stage(job: &mut Job, stage: JobStage, today: NaiveDate) -> bool {
    job.stage = stage;
    if stage == JobStage::Fit {
        if let Some(start) = job.build_start_date {
            job.actual_build_days = Some((today - start).num_days());
        }
    }
    stage == JobStage::Finished
}

fn reject_negative_price(price: Option<f64>) -> ServiceResult<()> {
    match price {
        Some(p) if p < 0.0 => Err(ServiceError::InvalidInput("price must not be negative".to_string())),
        _ => Ok(()),
    }
}

#[async_trait]
impl JobService for JobServiceImpl {
    #[instrument(skip(self))]
    async fn list_jobs(&self) -> ServiceResult<Vec<JobView>> {
        let jobs = self.repos.jobs.list().await?;
        debug!("Listing {} jobs", jobs.len());
        job_views(&self.repos, jobs).await
    }

    #[instrument(skip(self))]
    async fn get_job(&self, id: ObjectId) -> ServiceResult<JobView> {
        let job = self.repos.jobs.get_by_id(id).await?;
        job_view(&self.repos, job).await
    }

    #[instrument(skip(self, req), fields(name = %req.name))]
    async fn create_job(&self, req: CreateJobRequest) -> ServiceResult<JobView> {
        info!("Creating job");
        reject_negative_price(req.price)?;
        let client_id = parse_object_id("client_id", &req.client_id)?;
        self.repos.clients.get_by_id(client_id).await?;

        let quote_id = match req.quote_id.as_deref() {
            Some(raw) => {
                let quote_id = parse_object_id("quote_id", raw)?;
                self.repos.quotes.get_by_id(quote_id).await?;
                if self.repos.jobs.find_by_quote(quote_id).await?.is_some() {
                    return Err(ServiceError::Conflict("Quote already has a job".to_string()));
                }
                Some(quote_id)
            }
            None => None,
        };

        let now = Utc::now().to_rfc3339();
        let job = Job {
            id: ObjectId::new(),
            client_id,
            quote_id,
            name: req.name,
            category: req.category,
            stage: req.stage.unwrap_or_default(),
            booking_date: parse_optional_date("booking_date", req.booking_date.as_deref())?,
            build_start_date: parse_optional_date("build_start_date", req.build_start_date.as_deref())?,
            build_duration_days: req.build_duration_days,
            fitting_date: parse_optional_date("fitting_date", req.fitting_date.as_deref())?,
            fitting_date_status: req.fitting_date_status.unwrap_or_default(),
            price: req.price,
            client_needs_update: false,
            client_contacted: false,
            estimated_build_days: req.estimated_build_days,
            estimated_fitting_days: req.estimated_fitting_days,
            actual_build_days: None,
            actual_fitting_days: None,
            created_at: now.clone(),
            updated_at: now,
        };

        let job = self.repos.jobs.create(job).await?;
        if let Some(payments) = payment_schedule::generate(&job) {
            self.repos.payments.replace_for_job(job.id, payments).await?;
        }
        info!(job_id = %job.id, "Job created");
        job_view(&self.repos, job).await
    }

    #[instrument(skip(self, req))]
    async fn update_job(&self, id: ObjectId, req: UpdateJobRequest) -> ServiceResult<JobView> {
        let mut job = self.repos.jobs.get_by_id(id).await?;
        let today = today();
        let (old_build_start, old_fitting) = (job.build_start_date, job.fitting_date);

        if let Some(name) = req.name {
            job.name = name;
        }
        if let Some(category) = req.category {
            job.category = category;
        }
        if let Some(date) = req.booking_date {
            job.booking_date = parse_optional_date("booking_date", date.as_deref())?;
        }
        if let Some(date) = req.build_start_date {
            job.build_start_date = parse_optional_date("build_start_date", date.as_deref())?;
        }
        if let Some(days) = req.build_duration_days {
            job.build_duration_days = days;
        }
        if let Some(date) = req.fitting_date {
            let fitting_date = parse_optional_date("fitting_date", date.as_deref())?;
            set_fitting_date(&mut job, fitting_date);
        }
        if let Some(status) = req.fitting_date_status {
            job.fitting_date_status = status;
        }
        if let Some(days) = req.estimated_build_days {
            job.estimated_build_days = days;
        }
        if let Some(days) = req.estimated_fitting_days {
            job.estimated_fitting_days = days;
        }
        if let Some(days) = req.actual_build_days {
            job.actual_build_days = days;
        }
        if let Some(days) = req.actual_fitting_days {
            job.actual_fitting_days = days;
        }
        if let Some(flag) = req.client_needs_update {
            job.client_needs_update = flag;
        }
        if let Some(contacted) = req.client_contacted {
            job.client_contacted = contacted;
            if contacted {
                job.client_needs_update = false;
            }
        }

        let mut regenerate = false;
        if let Some(price) = req.price {
            reject_negative_price(price)?;
            job.price = price;
            // A cleared or zero price keeps the existing schedule.
            regenerate = price.is_some_and(|p| p > 0.0);
        }

        let mut finished = false;
        if let Some(stage) = req.stage {
            if stage != job.stage {
                finished = enter_stage(&mut job, stage, today);
            }
        }

        let dates_moved = old_build_start != job.build_start_date || old_fitting != job.fitting_date;
        job.updated_at = Utc::now().to_rfc3339();
        let job = self.repos.jobs.update(job).await?;
        self.refresh_payments(&job, regenerate, dates_moved, finished, today).await?;
        info!(job_id = %job.id, "Job updated");
        job_view(&self.repos, job).await
    }

    #[instrument(skip(self))]
    async fn delete_job(&self, id: ObjectId) -> ServiceResult<()> {
        self.repos.jobs.get_by_id(id).await?;
        let res = self.repos.jobs.delete_cascade(id).await;
        match &res {
            Ok(_) => info!(job_id = %id, "Job deleted with its assignments and payments"),
            Err(e) => error!("Failed to delete job: {e}"),
        }
        Ok(res?)
    }

    #[instrument(skip(self))]
    async fn update_stage(&self, id: ObjectId, stage: JobStage) -> ServiceResult<JobView> {
        let mut job = self.repos.jobs.get_by_id(id).await?;
        let today = today();
        let finished = enter_stage(&mut job, stage, today);
        job.updated_at = Utc::now().to_rfc3339();
        let job = self.repos.jobs.update(job).await?;
        self.refresh_payments(&job, false, false, finished, today).await?;
        info!(job_id = %job.id, stage = stage.as_str(), "Job stage changed");
        job_view(&self.repos, job).await
    }

    #[instrument(skip(self, req))]
    async fn reschedule(&self, id: ObjectId, req: RescheduleJobRequest) -> ServiceResult<JobView> {
        if req.build_start_date.is_none() && req.fitting_date.is_none() {
            return Err(ServiceError::InvalidInput(
                "build_start_date or fitting_date is required".to_string(),
            ));
        }
        let mut job = self.repos.jobs.get_by_id(id).await?;
        if let Some(raw) = req.build_start_date.as_deref() {
            job.build_start_date = Some(parse_date("build_start_date", raw)?);
        }
        if let Some(raw) = req.fitting_date.as_deref() {
            set_fitting_date(&mut job, Some(parse_date("fitting_date", raw)?));
        }
        job.updated_at = Utc::now().to_rfc3339();
        let job = self.repos.jobs.update(job).await?;
        self.refresh_payments(&job, false, true, false, today()).await?;
        info!(job_id = %job.id, "Job rescheduled");
        job_view(&self.repos, job).await
    }

    #[instrument(skip(self))]
    async fn schedule(&self) -> ServiceResult<Vec<ScheduleEntry>> {
        let directory = Directory::load(&self.repos).await?;
        let jobs = self.repos.jobs.list().await?;
        Ok(jobs
            .into_iter()
            .filter(|job| job.stage != JobStage::Finished)
            .filter_map(|job| {
                let stages = timeline::generate(&job)?;
                Some(ScheduleEntry {
                    id: hex(&job.id),
                    client: directory.client_name(&job.client_id).unwrap_or_default(),
                    name: job.name,
                    stages,
                })
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn weekly_calendar(&self, today: NaiveDate) -> ServiceResult<Vec<CalendarEvent>> {
        let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let week = DateWindow::new(monday, monday + Duration::days(6));
        let directory = Directory::load(&self.repos).await?;
        let teams = self.team_lookup().await?;

        let mut events = Vec::new();
        for job in self.repos.jobs.list().await? {
            if job.build_start_date.is_none() {
                continue;
            }
            let crew = teams.get(&job.id).map(Vec::as_slice).unwrap_or_default();
            let client_name = directory.client_name(&job.client_id).unwrap_or_default();
            for (date, stage) in timeline::calendar_days(&job, week) {
                let team = match stage {
                    JobStage::Build => directory.team(crew, AssignmentRole::BuildTeam),
                    JobStage::Fit => directory.team(crew, AssignmentRole::FitTeam),
                    _ => Vec::new(),
                };
                events.push(CalendarEvent {
                    job_id: hex(&job.id),
                    job_name: job.name.clone(),
                    client_name: client_name.clone(),
                    date,
                    stage,
                    team,
                });
            }
        }
        events.sort_by_key(|e| e.date);
        debug!(week_start = %week.start, "Calendar has {} events", events.len());
        Ok(events)
    }

    #[instrument(skip(self))]
    async fn clients_needing_updates(&self) -> ServiceResult<Vec<ClientUpdateEntry>> {
        let directory = Directory::load(&self.repos).await?;
        let jobs = self.repos.jobs.list().await?;
        Ok(jobs
            .into_iter()
            .filter(|job| job.client_needs_update)
            .map(|job| ClientUpdateEntry {
                job_id: hex(&job.id),
                client_id: hex(&job.client_id),
                client_name: directory.client_name(&job.client_id),
                job_name: job.name,
                fitting_date: job.fitting_date,
                fitting_date_status: job.fitting_date_status,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_assignments(&self, job_id: ObjectId) -> ServiceResult<Vec<AssignmentView>> {
        self.repos.jobs.get_by_id(job_id).await?;
        let directory = Directory::load(&self.repos).await?;
        let assignments = self.repos.assignments.list_for_job(job_id).await?;
        Ok(assignments.into_iter().map(|a| directory.assignment_view(a)).collect())
    }

    #[instrument(skip(self, req), fields(user_id = %req.user_id, role = ?req.role))]
    async fn add_assignment(&self, job_id: ObjectId, req: CreateAssignmentRequest) -> ServiceResult<AssignmentView> {
        let job = self.repos.jobs.get_by_id(job_id).await?;
        let user_id = parse_object_id("user_id", &req.user_id)?;
        let user = self
            .repos
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let existing = self.repos.assignments.list_for_job(job_id).await?;
        if existing.iter().any(|a| a.user_id == user_id && a.role == req.role) {
            return Err(ServiceError::Conflict(format!("{} is already on this team", user.full_name())));
        }

        if let Some(window) = role_window(&job, req.role) {
            let absences = self.repos.absences.list_for_user(user_id).await?;
            if let Some(absence) = availability::first_conflict(&absences, window.start, window.end, None) {
                warn!(%user_id, "Rejected assignment of absent staff member");
                return Err(ServiceError::Conflict(format!(
                    "{} is not available: absent from {} to {}",
                    user.full_name(),
                    absence.start_date,
                    absence.end_date
                )));
            }
        }

        let assignment = self
            .repos
            .assignments
            .create(JobAssignment::new(job_id, user_id, req.role))
            .await?;
        info!(assignment_id = %assignment.id, "Staff assigned to job");
        let directory = Directory::load(&self.repos).await?;
        Ok(directory.assignment_view(assignment))
    }

    #[instrument(skip(self))]
    async fn remove_assignment(&self, job_id: ObjectId, assignment_id: ObjectId) -> ServiceResult<()> {
        let assignment = self.repos.assignments.get_by_id(assignment_id).await?;
        if assignment.job_id != job_id {
            return Err(ServiceError::NotFound("Assignment does not belong to this job".to_string()));
        }
        self.repos.assignments.delete(assignment_id).await?;
        info!(%assignment_id, "Assignment removed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn auto_assign(&self, job_id: ObjectId) -> ServiceResult<Vec<AssignmentView>> {
        let job = self.repos.jobs.get_by_id(job_id).await?;

        let stages: HashMap<ObjectId, JobStage> =
            self.repos.jobs.list().await?.into_iter().map(|j| (j.id, j.stage)).collect();
        let assignments = self.repos.assignments.list().await?;
        let workloads = workload::workload_by_user(&assignments, &stages, Some(job_id));

        let mut absences_by_user: HashMap<ObjectId, Vec<_>> = HashMap::new();
        for absence in self.repos.absences.list().await? {
            absences_by_user.entry(absence.user_id).or_default().push(absence);
        }

        let candidates: Vec<Candidate> = self
            .repos
            .users
            .list()
            .await?
            .into_iter()
            .filter(|u| matches!(u.role, UserRole::CabinetMaker | UserRole::Fitter))
            .map(|u| Candidate {
                user_id: u.id,
                role: u.role,
                absences: absences_by_user.remove(&u.id).unwrap_or_default(),
                workload: workloads.get(&u.id).copied().unwrap_or(0),
            })
            .collect();

        let plan = auto_assign::plan(&job, &candidates);
        debug!(build = plan.build_team.len(), fit = plan.fit_team.len(), "Auto-assignment plan");
        let roster: Vec<JobAssignment> = plan
            .into_pairs()
            .into_iter()
            .map(|(user_id, role)| JobAssignment::new(job_id, user_id, role))
            .collect();

        let roster = self.repos.assignments.replace_for_job(job_id, roster).await?;
        info!(%job_id, assigned = roster.len(), "Auto-assigned staff");
        let directory = Directory::load(&self.repos).await?;
        Ok(roster.into_iter().map(|a| directory.assignment_view(a)).collect())
    }
}
