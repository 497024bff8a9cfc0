use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Manager,
    CabinetMaker,
    Fitter,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Manager => "Manager",
            UserRole::CabinetMaker => "CabinetMaker",
            UserRole::Fitter => "Fitter",
            UserRole::Staff => "Staff",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Admin" => Some(UserRole::Admin),
            "Manager" => Some(UserRole::Manager),
            "CabinetMaker" => Some(UserRole::CabinetMaker),
            "Fitter" => Some(UserRole::Fitter),
            "Staff" => Some(UserRole::Staff),
            _ => None,
        }
    }

    /// Roles that show up in staff listings and workload reports.
    pub fn is_workshop_staff(&self) -> bool {
        matches!(self, UserRole::Manager | UserRole::CabinetMaker | UserRole::Fitter)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
