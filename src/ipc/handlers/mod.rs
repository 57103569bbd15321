pub mod attendance;
pub mod auth;
pub mod backup;
pub mod core;
pub mod dashboard;
pub mod grades;
pub mod students;
pub mod teachers;
pub mod views;
