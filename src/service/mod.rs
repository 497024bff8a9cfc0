pub mod client_service;
pub mod directory;
pub mod job_service;
pub mod payment_service;
pub mod quote_service;
pub mod report_service;
pub mod staff_service;
pub mod user_service;
