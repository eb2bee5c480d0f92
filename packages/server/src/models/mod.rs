pub mod auth;
pub mod playlist;
pub mod problem;
pub mod shared;
pub mod submission;
