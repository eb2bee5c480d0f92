use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::problem::{self, Difficulty};
use crate::error::AppError;

pub use super::shared::{PageQuery, Pagination, escape_like};
use super::shared::{double_option, validate_title};

/// One hidden test case: program input and the output it must produce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TestCase {
    #[schema(example = "1 2")]
    pub input: String,
    #[schema(example = "3")]
    pub output: String,
}

/// A worked example shown with the problem statement.
#[derive(Clone, Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProblemExample {
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProblemRequest {
    #[schema(example = "Add Two Numbers")]
    pub title: String,
    /// Problem statement in Markdown.
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    #[schema(example = json!(["math"]))]
    pub tags: Vec<String>,
    #[serde(default)]
    pub constraints: String,
    pub hints: Option<String>,
    pub editorial: Option<String>,
    /// Language name -> example.
    #[serde(default)]
    pub examples: BTreeMap<String, ProblemExample>,
    pub test_cases: Vec<TestCase>,
    /// Language name -> starter code.
    #[serde(default)]
    pub code_snippets: BTreeMap<String, String>,
    /// Language name -> known-correct source, run against every test case.
    pub reference_solutions: BTreeMap<String, String>,
}

pub fn validate_create_problem(payload: &CreateProblemRequest) -> Result<(), AppError> {
    validate_title(&payload.title, "Title")?;
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    validate_tags(&payload.tags)
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateProblemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub tags: Option<Vec<String>>,
    pub constraints: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub hints: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub editorial: Option<Option<String>>,
    pub examples: Option<BTreeMap<String, ProblemExample>>,
    pub test_cases: Option<Vec<TestCase>>,
    pub code_snippets: Option<BTreeMap<String, String>>,
    pub reference_solutions: Option<BTreeMap<String, String>>,
}

impl UpdateProblemRequest {
    /// Whether the stored solutions must be re-run against the stored cases.
    pub fn needs_revalidation(&self) -> bool {
        self.test_cases.is_some() || self.reference_solutions.is_some()
    }
}

pub fn validate_update_problem(payload: &UpdateProblemRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title, "Title")?;
    }
    if let Some(ref description) = payload.description
        && description.trim().is_empty()
    {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    if let Some(ref tags) = payload.tags {
        validate_tags(tags)?;
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), AppError> {
    if tags.len() > 20 {
        return Err(AppError::Validation("At most 20 tags are allowed".into()));
    }
    if tags.iter().any(|t| t.trim().is_empty() || t.chars().count() > 32) {
        return Err(AppError::Validation("Tags must be 1-32 characters".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProblemResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[schema(value_type = Vec<String>)]
    pub tags: serde_json::Value,
    pub constraints: String,
    pub hints: Option<String>,
    pub editorial: Option<String>,
    #[schema(value_type = Object)]
    pub examples: serde_json::Value,
    #[schema(value_type = Vec<TestCase>)]
    pub test_cases: serde_json::Value,
    #[schema(value_type = Object)]
    pub code_snippets: serde_json::Value,
    /// Only returned to administrators.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub reference_solutions: Option<serde_json::Value>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProblemResponse {
    pub fn from_model(m: problem::Model, include_solutions: bool) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            difficulty: m.difficulty,
            tags: m.tags,
            constraints: m.constraints,
            hints: m.hints,
            editorial: m.editorial,
            examples: m.examples,
            test_cases: m.test_cases,
            code_snippets: m.code_snippets,
            reference_solutions: include_solutions.then_some(m.reference_solutions),
            user_id: m.user_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProblemListItem {
    pub id: i32,
    pub title: String,
    pub difficulty: Difficulty,
    #[schema(value_type = Vec<String>)]
    pub tags: serde_json::Value,
    /// Whether the caller has an accepted submission for this problem.
    pub solved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProblemListResponse {
    pub data: Vec<ProblemListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProblemListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Only problems carrying this tag.
    pub tag: Option<String>,
}

/// Language-name map decoded from a stored JSON column.
pub fn solutions_from_json(value: &serde_json::Value) -> Result<BTreeMap<String, String>, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Internal(format!("Corrupt reference solutions: {e}")))
}

pub fn test_cases_from_json(value: &serde_json::Value) -> Result<Vec<TestCase>, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Internal(format!("Corrupt test cases: {e}")))
}
