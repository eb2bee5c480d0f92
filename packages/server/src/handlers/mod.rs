pub mod auth;
pub mod execute;
pub mod playlist;
pub mod problem;
pub mod submission;
