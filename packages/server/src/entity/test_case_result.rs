use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "test_case_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "submission_test_case")]
    pub submission_id: i32,
    /// 1-based index into the submitted stdin.
    #[sea_orm(unique_key = "submission_test_case")]
    pub test_case: i32,

    pub passed: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub stdout: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub expected: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub stderr: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub compile_output: Option<String>,
    pub status: String,
    pub memory: Option<String>, // e.g. "1024 KB"
    pub time: Option<String>,   // e.g. "0.012 seconds"

    #[sea_orm(belongs_to, from = "submission_id", to = "id")]
    pub submission: HasOne<super::submission::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
