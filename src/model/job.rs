use bson::oid::ObjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Workshop phase of a job. Variant order is the production order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum JobStage {
    #[default]
    NotStarted,
    Planned,
    Build,
    Spray,
    Fit,
    Snag,
    Finished,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::NotStarted => "NotStarted",
            JobStage::Planned => "Planned",
            JobStage::Build => "Build",
            JobStage::Spray => "Spray",
            JobStage::Fit => "Fit",
            JobStage::Snag => "Snag",
            JobStage::Finished => "Finished",
        }
    }

    /// Stages that count towards a staff member's workload.
    pub fn is_active(&self) -> bool {
        !matches!(self, JobStage::NotStarted | JobStage::Finished)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FittingDateStatus {
    #[default]
    Planned,
    Provisional,
    Confirmed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub client_id: ObjectId,
    pub quote_id: Option<ObjectId>,
    pub name: String,
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
}
