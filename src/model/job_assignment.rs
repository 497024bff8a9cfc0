use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentRole {
    BuildTeam,
    FitTeam,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAssignment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub job_id: ObjectId,
    pub user_id: ObjectId,
    pub role: AssignmentRole,
    pub created_at: String,
}

impl JobAssignment {
    pub fn new(job_id: ObjectId, user_id: ObjectId, role: AssignmentRole) -> Self {
        JobAssignment {
            id: ObjectId::new(),
            job_id,
            user_id,
            role,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
