use common::Verdict;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One evaluation of user code against a problem's test cases.
///
/// The JSON array columns are index-aligned with the submitted stdin.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub source_code: String,
    pub language: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub stdin: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub stdout: serde_json::Value,
    /// NULL unless at least one case wrote to stderr.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub stderr: Option<serde_json::Value>,
    /// NULL unless at least one case produced compiler output.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub compile_output: Option<serde_json::Value>,
    /// Engine status description per case.
    #[sea_orm(column_type = "JsonBinary")]
    pub statuses: serde_json::Value,
    /// NULL unless at least one case reported memory usage.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub memory: Option<serde_json::Value>,
    /// NULL unless at least one case reported a running time.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub time: Option<serde_json::Value>,

    pub verdict: Verdict,

    #[sea_orm(has_many)]
    pub test_cases: HasMany<super::test_case_result::Entity>,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub problem_id: i32,
    #[sea_orm(belongs_to, from = "problem_id", to = "id")]
    pub problem: HasOne<super::problem::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
