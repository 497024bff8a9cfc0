pub mod client;
pub mod quote;
pub mod job;
pub mod job_assignment;
pub mod payment;
pub mod user;
pub mod staff_absence;
