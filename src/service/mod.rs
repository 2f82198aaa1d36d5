pub mod credential;
pub mod external;
pub mod schedule;
pub mod seed;
pub mod timesheet;

pub use credential::CredentialService;
