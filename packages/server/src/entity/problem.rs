use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    #[sea_orm(string_value = "EASY")]
    Easy,
    #[sea_orm(string_value = "MEDIUM")]
    Medium,
    #[sea_orm(string_value = "HARD")]
    Hard,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "problem")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String, // in Markdown
    pub difficulty: Difficulty,
    /// JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: serde_json::Value,
    #[sea_orm(column_type = "Text")]
    pub constraints: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub hints: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub editorial: Option<String>,

    /// JSON object: language -> {input, output, explanation}.
    #[sea_orm(column_type = "JsonBinary")]
    pub examples: serde_json::Value,
    /// JSON array of {input, output}, in declaration order.
    #[sea_orm(column_type = "JsonBinary")]
    pub test_cases: serde_json::Value,
    /// JSON object: language -> starter code.
    #[sea_orm(column_type = "JsonBinary")]
    pub code_snippets: serde_json::Value,
    /// JSON object: language -> known-correct source.
    #[sea_orm(column_type = "JsonBinary")]
    pub reference_solutions: serde_json::Value,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    #[sea_orm(has_many)]
    pub solved_by: HasMany<super::problem_solved::Entity>,

    #[sea_orm(has_many)]
    pub playlist_entries: HasMany<super::problem_in_playlist::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
