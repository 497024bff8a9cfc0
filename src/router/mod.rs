pub mod client_router;
pub mod job_router;
pub mod payment_router;
pub mod quote_router;
pub mod report_router;
pub mod staff_router;
pub mod user_router;
