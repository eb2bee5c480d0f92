use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{playlist, problem::Difficulty};
use crate::error::AppError;

use super::shared::validate_title;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreatePlaylistRequest {
    #[schema(example = "Warm-up")]
    pub name: String,
    pub description: Option<String>,
}

pub fn validate_create_playlist(payload: &CreatePlaylistRequest) -> Result<(), AppError> {
    validate_title(&payload.name, "Name")
}

/// Problems to add to or remove from a playlist.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct PlaylistProblemsRequest {
    #[schema(example = json!([1, 2]))]
    pub problem_ids: Vec<i32>,
}

pub fn validate_problem_ids(payload: &PlaylistProblemsRequest) -> Result<(), AppError> {
    if payload.problem_ids.is_empty() {
        return Err(AppError::Validation("problem_ids must not be empty".into()));
    }
    if payload.problem_ids.len() > 100 {
        return Err(AppError::Validation("Too many problem_ids: max 100".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PlaylistProblemItem {
    pub id: i32,
    pub title: String,
    pub difficulty: Difficulty,
    pub added_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PlaylistResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
    pub problems: Vec<PlaylistProblemItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaylistResponse {
    pub fn new(m: playlist::Model, problems: Vec<PlaylistProblemItem>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            user_id: m.user_id,
            problems,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PlaylistProblemsResponse {
    /// Number of rows actually inserted or removed.
    #[schema(example = 2)]
    pub affected: u64,
}
