pub mod schedule;
pub mod time_entry;
pub mod user;
