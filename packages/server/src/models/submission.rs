use chrono::{DateTime, Utc};
use common::Verdict;
use serde::{Deserialize, Serialize};

use crate::entity::{submission, test_case_result};
use crate::judge::persist::PersistedSubmission;

use super::shared::Pagination;

/// Request body for running code against a list of inputs.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ExecuteCodeRequest {
    #[schema(example = "a, b = map(int, input().split())\nprint(a + b)")]
    pub source_code: String,
    /// Judge0 language id (e.g. 71 for Python).
    #[schema(example = 71)]
    pub language_id: i32,
    /// One entry per test case.
    #[schema(example = json!(["1 2", "3 4"]))]
    pub stdin: Vec<String>,
    /// Index-aligned with `stdin`.
    #[schema(example = json!(["3", "7"]))]
    pub expected_outputs: Vec<String>,
    #[schema(example = 1)]
    pub problem_id: i32,
}

/// Query parameters for submission listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SubmissionListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
    /// Filter by verdict.
    pub verdict: Option<Verdict>,
}

/// Result of one test case.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TestCaseResultResponse {
    pub id: i32,
    /// 1-based position in the submitted stdin.
    #[schema(example = 1)]
    pub test_case: i32,
    pub passed: bool,
    #[schema(example = "3")]
    pub stdout: Option<String>,
    #[schema(example = "3")]
    pub expected: String,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    #[schema(example = "Accepted")]
    pub status: String,
    #[schema(example = "3168 KB")]
    pub memory: Option<String>,
    #[schema(example = "0.012 seconds")]
    pub time: Option<String>,
}

impl From<test_case_result::Model> for TestCaseResultResponse {
    fn from(m: test_case_result::Model) -> Self {
        Self {
            id: m.id,
            test_case: m.test_case,
            passed: m.passed,
            stdout: m.stdout,
            expected: m.expected,
            stderr: m.stderr,
            compile_output: m.compile_output,
            status: m.status,
            memory: m.memory,
            time: m.time,
        }
    }
}

/// Full submission details.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub user_id: i32,
    pub problem_id: i32,
    pub source_code: String,
    #[schema(example = "PYTHON")]
    pub language: String,
    #[schema(value_type = Vec<String>)]
    pub stdin: serde_json::Value,
    #[schema(value_type = Vec<Option<String>>)]
    pub stdout: serde_json::Value,
    /// Present only if some case wrote to stderr.
    #[schema(value_type = Option<Vec<Option<String>>>)]
    pub stderr: Option<serde_json::Value>,
    #[schema(value_type = Option<Vec<Option<String>>>)]
    pub compile_output: Option<serde_json::Value>,
    #[schema(value_type = Vec<String>)]
    pub statuses: serde_json::Value,
    #[schema(value_type = Option<Vec<Option<String>>>)]
    pub memory: Option<serde_json::Value>,
    #[schema(value_type = Option<Vec<Option<String>>>)]
    pub time: Option<serde_json::Value>,
    pub verdict: Verdict,
    /// Per-case results, ordered by case index. Omitted in list views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCaseResultResponse>>,
    pub created_at: DateTime<Utc>,
}

impl From<submission::Model> for SubmissionResponse {
    fn from(m: submission::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            problem_id: m.problem_id,
            source_code: m.source_code,
            language: m.language,
            stdin: m.stdin,
            stdout: m.stdout,
            stderr: m.stderr,
            compile_output: m.compile_output,
            statuses: m.statuses,
            memory: m.memory,
            time: m.time,
            verdict: m.verdict,
            test_cases: None,
            created_at: m.created_at,
        }
    }
}

impl From<PersistedSubmission> for SubmissionResponse {
    fn from(p: PersistedSubmission) -> Self {
        Self {
            test_cases: Some(p.test_cases.into_iter().map(Into::into).collect()),
            ..Self::from(p.submission)
        }
    }
}

/// Response of `POST /execute-code`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ExecuteCodeResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Code executed successfully")]
    pub message: String,
    pub submission: SubmissionResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListResponse {
    pub data: Vec<SubmissionResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionCountResponse {
    #[schema(example = 1)]
    pub problem_id: i32,
    /// Submissions by all users.
    #[schema(example = 12)]
    pub count: u64,
}
