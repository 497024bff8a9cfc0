pub mod client_handler;
pub mod health_handler;
pub mod job_handler;
pub mod payment_handler;
pub mod quote_handler;
pub mod report_handler;
pub mod staff_handler;
pub mod user_handler;
