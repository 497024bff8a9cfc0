pub mod dates;
pub mod error;
pub mod invoicing;
pub mod jwt;
pub mod logger;
pub mod password;
pub mod redis;
pub mod session;
