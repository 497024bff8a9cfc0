//! Request payloads and response views.
//!
//! Requests derive `Validate` and carry dates and ids as strings; services
//! parse them. Views are assembled at read time and expose ids as hex.

pub mod client_dto;
pub mod job_dto;
pub mod payment_dto;
pub mod quote_dto;
pub mod report_dto;
pub mod staff_dto;
pub mod user_dto;

use bson::oid::ObjectId;

use crate::util::dates::DateParseError;
use crate::util::error::ServiceError;

pub fn hex(id: &ObjectId) -> String {
    id.to_hex()
}

pub fn parse_object_id(field: &str, raw: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| ServiceError::InvalidInput(format!("{} is not a valid id", field)))
}

impl From<DateParseError> for ServiceError {
    fn from(err: DateParseError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}
