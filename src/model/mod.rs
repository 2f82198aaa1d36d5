pub mod auth;
pub mod external;
pub mod global_error;
pub mod id;
pub mod schedule;
pub mod timesheet;

pub use global_error::{AppError, ErrorCode};
