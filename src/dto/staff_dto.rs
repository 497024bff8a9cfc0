use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::hex;
use super::user_dto::UserView;
use crate::model::job::JobStage;
use crate::model::job_assignment::AssignmentRole;
use crate::model::staff_absence::{AbsenceType, StaffAbsence};
use crate::model::user::UserRole;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAbsenceRequest {
    pub start_date: String,
    pub end_date: String,
    #[serde(rename = "type")]
    pub absence_type: AbsenceType,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAbsenceRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub absence_type: Option<AbsenceType>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffView {
    #[serde(flatten)]
    pub user: UserView,
    pub current_workload: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AbsenceView {
    pub id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub absence_type: AbsenceType,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub duration_days: i64,
}

impl AbsenceView {
    pub fn new(absence: StaffAbsence, user_name: Option<String>) -> Self {
        let duration_days = absence.duration_days();
        AbsenceView {
            id: hex(&absence.id),
            user_id: hex(&absence.user_id),
            user_name,
            start_date: absence.start_date,
            end_date: absence.end_date,
            absence_type: absence.absence_type,
            notes: absence.notes,
            created_at: absence.created_at,
            updated_at: absence.updated_at,
            duration_days,
        }
    }
}

/// A stretch of days a staff member is booked on a job.
#[derive(Debug, Clone, Serialize)]
pub struct AssignedWindow {
    pub job_id: String,
    pub job_name: String,
    pub client_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub role: AssignmentRole,
    pub stage: JobStage,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffSchedule {
    pub assignments: Vec<AssignedWindow>,
    pub absences: Vec<AbsenceView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffAvailability {
    pub user_id: String,
    pub name: String,
    pub role: UserRole,
    pub available: bool,
    pub assignments: Vec<AssignedWindow>,
    pub workload: usize,
}
