mod auth;
mod common;
mod playlist;
mod submission;
