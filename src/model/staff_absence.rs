use bson::oid::ObjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsenceType {
    Leave,
    Sickness,
    Training,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAbsence {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub absence_type: AbsenceType,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl StaffAbsence {
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
