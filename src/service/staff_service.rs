use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use crate::dto::hex;
use crate::dto::staff_dto::{
    AbsenceView, AssignedWindow, CreateAbsenceRequest, StaffAvailability, StaffSchedule, StaffView,
    UpdateAbsenceRequest,
};
use crate::model::job::{Job, JobStage};
use crate::model::job_assignment::AssignmentRole;
use crate::model::staff_absence::StaffAbsence;
use crate::model::user::User;
use crate::repository::Repositories;
use crate::scheduling::{availability, role_window, workload, DateWindow};
use crate::service::directory::Directory;
use crate::util::dates::parse_date;
use crate::util::error::{ServiceError, ServiceResult};

/// How far ahead a staff member's schedule looks.
pub const SCHEDULE_HORIZON_DAYS: i64 = 30;

#[async_trait]
pub trait StaffService: Send + Sync {
    async fn list_staff(&self) -> ServiceResult<Vec<StaffView>>;
    async fn get_staff(&self, id: ObjectId) -> ServiceResult<StaffView>;
    /// Assignments and absences touching the next 30 days from `today`.
    async fn schedule(&self, id: ObjectId, today: NaiveDate) -> ServiceResult<StaffSchedule>;
    async fn availability(&self, start: NaiveDate, end: NaiveDate) -> ServiceResult<Vec<StaffAvailability>>;
    async fn list_absences(&self, user_id: ObjectId) -> ServiceResult<Vec<AbsenceView>>;
    async fn create_absence(&self, user_id: ObjectId, req: CreateAbsenceRequest) -> ServiceResult<AbsenceView>;
    async fn update_absence(
        &self,
        user_id: ObjectId,
        absence_id: ObjectId,
        req: UpdateAbsenceRequest,
    ) -> ServiceResult<AbsenceView>;
    async fn delete_absence(&self, user_id: ObjectId, absence_id: ObjectId) -> ServiceResult<()>;
}

pub struct StaffServiceImpl {
    pub repos: Repositories,
}

impl StaffServiceImpl {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn user(&self, id: ObjectId) -> ServiceResult<User> {
        self.repos
            .users
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Staff member not found".to_string()))
    }

    async fn workloads(&self) -> ServiceResult<HashMap<ObjectId, usize>> {
        let stages: HashMap<ObjectId, JobStage> =
            self.repos.jobs.list().await?.into_iter().map(|j| (j.id, j.stage)).collect();
        let assignments = self.repos.assignments.list().await?;
        Ok(workload::workload_by_user(&assignments, &stages, None))
    }

    /// The user's build and fit windows that overlap `range`, inclusive.
    async fn assigned_windows(
        &self,
        user_id: ObjectId,
        range: DateWindow,
        jobs: &HashMap<ObjectId, Job>,
        directory: &Directory,
    ) -> ServiceResult<Vec<AssignedWindow>> {
        let assignments = self.repos.assignments.list_for_user(user_id).await?;
        Ok(assignments
            .into_iter()
            .filter_map(|a| {
                let job = jobs.get(&a.job_id)?;
                let window = role_window(job, a.role)?;
                if !window.overlaps(range.start, range.end) {
                    return None;
                }
                Some(AssignedWindow {
                    job_id: hex(&job.id),
                    job_name: job.name.clone(),
                    client_name: directory.client_name(&job.client_id).unwrap_or_default(),
                    start_date: window.start,
                    end_date: window.end,
                    role: a.role,
                    stage: match a.role {
                        AssignmentRole::BuildTeam => JobStage::Build,
                        AssignmentRole::FitTeam => JobStage::Fit,
                    },
                })
            })
            .collect())
    }

    async fn job_index(&self) -> ServiceResult<HashMap<ObjectId, Job>> {
        Ok(self.repos.jobs.list().await?.into_iter().map(|j| (j.id, j)).collect())
    }

    /// An absence may not run backwards, overlap another absence of the same
    /// person, or fall on days they are booked on a job.
    async fn check_absence(
        &self,
        user_id: ObjectId,
        start: NaiveDate,
        end: NaiveDate,
        editing: Option<ObjectId>,
    ) -> ServiceResult<()> {
        if start > end {
            return Err(ServiceError::InvalidInput("end_date must not be before start_date".to_string()));
        }
        let absences = self.repos.absences.list_for_user(user_id).await?;
        if let Some(other) = availability::first_conflict(&absences, start, end, editing) {
            warn!(%user_id, other = %other.id, "Absence overlaps an existing one");
            return Err(ServiceError::Conflict(format!(
                "Absence overlaps with existing absence from {} to {}",
                other.start_date, other.end_date
            )));
        }

        let jobs = self.job_index().await?;
        let directory = Directory::load(&self.repos).await?;
        let booked = self
            .assigned_windows(user_id, DateWindow::new(start, end), &jobs, &directory)
            .await?;
        if let Some(window) = booked.first() {
            let team = match window.role {
                AssignmentRole::BuildTeam => "build team",
                AssignmentRole::FitTeam => "fit team",
            };
            return Err(ServiceError::Conflict(format!(
                "Staff member is assigned to {} on {} from {} to {}",
                team, window.job_name, window.start_date, window.end_date
            )));
        }
        Ok(())
    }

    async fn owned_absence(&self, user_id: ObjectId, absence_id: ObjectId) -> ServiceResult<StaffAbsence> {
        let absence = self.repos.absences.get_by_id(absence_id).await?;
        if absence.user_id != user_id {
            return Err(ServiceError::NotFound(
                "Absence does not belong to this staff member".to_string(),
            ));
        }
        Ok(absence)
    }
}

#[async_trait]
impl StaffService for StaffServiceImpl {
    #[instrument(skip(self))]
    async fn list_staff(&self) -> ServiceResult<Vec<StaffView>> {
        let workloads = self.workloads().await?;
        let users = self.repos.users.list().await?;
        Ok(users
            .into_iter()
            .filter(|u| u.role.is_workshop_staff())
            .map(|u| StaffView {
                current_workload: workloads.get(&u.id).copied().unwrap_or(0),
                user: u.into(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_staff(&self, id: ObjectId) -> ServiceResult<StaffView> {
        let user = self.user(id).await?;
        let workloads = self.workloads().await?;
        Ok(StaffView {
            current_workload: workloads.get(&id).copied().unwrap_or(0),
            user: user.into(),
        })
    }

    #[instrument(skip(self))]
    async fn schedule(&self, id: ObjectId, today: NaiveDate) -> ServiceResult<StaffSchedule> {
        let user = self.user(id).await?;
        let horizon = DateWindow::new(today, today + Duration::days(SCHEDULE_HORIZON_DAYS));
        let jobs = self.job_index().await?;
        let directory = Directory::load(&self.repos).await?;

        let assignments = self.assigned_windows(id, horizon, &jobs, &directory).await?;
        let absences = self
            .repos
            .absences
            .list_for_user(id)
            .await?
            .into_iter()
            .filter(|a| availability::overlaps(a, horizon.start, horizon.end))
            .map(|a| AbsenceView::new(a, Some(user.full_name())))
            .collect();
        Ok(StaffSchedule { assignments, absences })
    }

    #[instrument(skip(self))]
    async fn availability(&self, start: NaiveDate, end: NaiveDate) -> ServiceResult<Vec<StaffAvailability>> {
        if start > end {
            return Err(ServiceError::InvalidInput("end_date must not be before start_date".to_string()));
        }
        let range = DateWindow::new(start, end);
        let jobs = self.job_index().await?;
        let directory = Directory::load(&self.repos).await?;

        let mut report = Vec::new();
        for user in self.repos.users.list().await? {
            if !user.role.is_workshop_staff() {
                continue;
            }
            let absences = self.repos.absences.list_for_user(user.id).await?;
            let assignments = self.assigned_windows(user.id, range, &jobs, &directory).await?;
            report.push(StaffAvailability {
                user_id: hex(&user.id),
                name: user.full_name(),
                role: user.role,
                available: availability::is_available(&absences, start, end),
                workload: assignments.len(),
                assignments,
            });
        }
        debug!("Availability computed for {} staff", report.len());
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn list_absences(&self, user_id: ObjectId) -> ServiceResult<Vec<AbsenceView>> {
        let user = self.user(user_id).await?;
        let absences = self.repos.absences.list_for_user(user_id).await?;
        Ok(absences
            .into_iter()
            .map(|a| AbsenceView::new(a, Some(user.full_name())))
            .collect())
    }

    #[instrument(skip(self, req))]
    async fn create_absence(&self, user_id: ObjectId, req: CreateAbsenceRequest) -> ServiceResult<AbsenceView> {
        let user = self.user(user_id).await?;
        let start = parse_date("start_date", &req.start_date)?;
        let end = parse_date("end_date", &req.end_date)?;
        self.check_absence(user_id, start, end, None).await?;

        let now = Utc::now().to_rfc3339();
        let absence = StaffAbsence {
            id: ObjectId::new(),
            user_id,
            start_date: start,
            end_date: end,
            absence_type: req.absence_type,
            notes: req.notes,
            created_at: now.clone(),
            updated_at: now,
        };
        let absence = self.repos.absences.create(absence).await?;
        info!(absence_id = %absence.id, %user_id, "Absence recorded");
        Ok(AbsenceView::new(absence, Some(user.full_name())))
    }

    #[instrument(skip(self, req))]
    async fn update_absence(
        &self,
        user_id: ObjectId,
        absence_id: ObjectId,
        req: UpdateAbsenceRequest,
    ) -> ServiceResult<AbsenceView> {
        let user = self.user(user_id).await?;
        let mut absence = self.owned_absence(user_id, absence_id).await?;

        if req.start_date.is_some() || req.end_date.is_some() {
            let start = match req.start_date.as_deref() {
                Some(raw) => parse_date("start_date", raw)?,
                None => absence.start_date,
            };
            let end = match req.end_date.as_deref() {
                Some(raw) => parse_date("end_date", raw)?,
                None => absence.end_date,
            };
            self.check_absence(user_id, start, end, Some(absence_id)).await?;
            absence.start_date = start;
            absence.end_date = end;
        }
        if let Some(kind) = req.absence_type {
            absence.absence_type = kind;
        }
        if let Some(notes) = req.notes {
            absence.notes = Some(notes);
        }
        absence.updated_at = Utc::now().to_rfc3339();
        let absence = self.repos.absences.update(absence).await?;
        info!(%absence_id, "Absence updated");
        Ok(AbsenceView::new(absence, Some(user.full_name())))
    }

    #[instrument(skip(self))]
    async fn delete_absence(&self, user_id: ObjectId, absence_id: ObjectId) -> ServiceResult<()> {
        self.owned_absence(user_id, absence_id).await?;
        self.repos.absences.delete(absence_id).await?;
        info!(%absence_id, "Absence deleted");
        Ok(())
    }
}
