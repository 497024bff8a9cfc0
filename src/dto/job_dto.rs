use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::hex;
use super::payment_dto::PaymentView;
use crate::model::job::{FittingDateStatus, Job, JobStage};
use crate::model::job_assignment::{AssignmentRole, JobAssignment};
use crate::scheduling::job_status::JobStatus;
use crate::scheduling::timeline::StageWindow;
use crate::util::dates::double_option;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(equal = 24))]
    pub client_id: String,
    #[validate(length(equal = 24))]
    pub quote_id: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    pub stage: Option<JobStage>,
    pub booking_date: Option<String>,
    pub build_start_date: Option<String>,
    #[validate(range(max = 365))]
    pub build_duration_days: Option<u32>,
    pub fitting_date: Option<String>,
    pub fitting_date_status: Option<FittingDateStatus>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(max = 365))]
    pub estimated_build_days: Option<u32>,
    #[validate(range(max = 365))]
    pub estimated_fitting_days: Option<u32>,
}

/// Partial update. Nullable fields use `Some(None)` for an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    pub stage: Option<JobStage>,
    #[serde(default, deserialize_with = "double_option")]
    pub booking_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub build_start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(max = 365))]
    pub build_duration_days: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub fitting_date: Option<Option<String>>,
    pub fitting_date_status: Option<FittingDateStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub price: Option<Option<f64>>,
    pub client_needs_update: Option<bool>,
    pub client_contacted: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(max = 365))]
    pub estimated_build_days: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(max = 365))]
    pub estimated_fitting_days: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub actual_build_days: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub actual_fitting_days: Option<Option<i64>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateJobStageRequest {
    pub stage: JobStage,
}

/// Gantt drag-and-drop. Only the dates that are sent move.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RescheduleJobRequest {
    pub build_start_date: Option<String>,
    pub fitting_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAssignmentRequest {
    #[validate(length(equal = 24))]
    pub user_id: String,
    pub role: AssignmentRole,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: String,
    pub name: String,
    pub client_id: String,
    pub client_name: Option<String>,
    pub quote_id: Option<String>,
    pub category: String,
    pub stage: JobStage,
    pub booking_date: Option<NaiveDate>,
    pub build_start_date: Option<NaiveDate>,
    pub build_duration_days: Option<u32>,
    pub fitting_date: Option<NaiveDate>,
    pub fitting_date_status: FittingDateStatus,
    pub price: Option<f64>,
    pub client_needs_update: bool,
    pub client_contacted: bool,
    pub estimated_build_days: Option<u32>,
    pub estimated_fitting_days: Option<u32>,
    pub actual_build_days: Option<i64>,
    pub actual_fitting_days: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub build_team: Vec<String>,
    pub fit_team: Vec<String>,
    pub payments: Vec<PaymentView>,
    pub status: JobStatus,
}

/// Everything a job view needs beyond the job itself.
#[derive(Debug, Clone, Default)]
pub struct JobExtras {
    pub client_name: Option<String>,
    pub build_team: Vec<String>,
    pub fit_team: Vec<String>,
    pub payments: Vec<PaymentView>,
}

impl JobView {
    pub fn new(job: Job, status: JobStatus, extras: JobExtras) -> Self {
        JobView {
            id: hex(&job.id),
            name: job.name,
            client_id: hex(&job.client_id),
            client_name: extras.client_name,
            quote_id: job.quote_id.as_ref().map(hex),
            category: job.category,
            stage: job.stage,
            booking_date: job.booking_date,
            build_start_date: job.build_start_date,
            build_duration_days: job.build_duration_days,
            fitting_date: job.fitting_date,
            fitting_date_status: job.fitting_date_status,
            price: job.price,
            client_needs_update: job.client_needs_update,
            client_contacted: job.client_contacted,
            estimated_build_days: job.estimated_build_days,
            estimated_fitting_days: job.estimated_fitting_days,
            actual_build_days: job.actual_build_days,
            actual_fitting_days: job.actual_fitting_days,
            created_at: job.created_at,
            updated_at: job.updated_at,
            build_team: extras.build_team,
            fit_team: extras.fit_team,
            payments: extras.payments,
            status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub id: String,
    pub job_id: String,
    pub job_name: Option<String>,
    pub user_id: String,
    pub user_name: Option<String>,
    pub role: AssignmentRole,
    pub created_at: String,
}

impl AssignmentView {
    pub fn new(assignment: JobAssignment, job_name: Option<String>, user_name: Option<String>) -> Self {
        AssignmentView {
            id: hex(&assignment.id),
            job_id: hex(&assignment.job_id),
            job_name,
            user_id: hex(&assignment.user_id),
            user_name,
            role: assignment.role,
            created_at: assignment.created_at,
        }
    }
}

/// One row of the Gantt view.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub name: String,
    pub client: String,
    pub stages: Vec<StageWindow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub job_id: String,
    pub job_name: String,
    pub client_name: String,
    pub date: NaiveDate,
    pub stage: JobStage,
    pub team: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientUpdateEntry {
    pub job_id: String,
    pub job_name: String,
    pub client_id: String,
    pub client_name: Option<String>,
    pub fitting_date: Option<NaiveDate>,
    pub fitting_date_status: FittingDateStatus,
}
