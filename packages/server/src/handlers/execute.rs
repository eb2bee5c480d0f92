use axum::Json;
use axum::extract::State;
use common::Language;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::problem::find_problem;
use crate::judge::{self, Evaluation};
use crate::models::submission::{ExecuteCodeRequest, ExecuteCodeResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/execute-code",
    tag = "Execution",
    operation_id = "executeCode",
    summary = "Run code against test cases and record the submission",
    description = "Runs `source_code` once per `stdin` entry on the execution engine, compares each trimmed stdout with the matching trimmed `expected_outputs` entry, and stores the submission with one result per case. The verdict is `Accepted` only if every case matches. An accepted submission marks the problem solved for the caller.",
    request_body = ExecuteCodeRequest,
    responses(
        (status = 200, description = "Submission judged and stored", body = ExecuteCodeResponse),
        (status = 400, description = "Empty stdin, length mismatch or unknown language (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Execution engine failed or timed out (EXECUTION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, problem_id = payload.problem_id))]
pub async fn execute_code(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ExecuteCodeRequest>,
) -> Result<Json<ExecuteCodeResponse>, AppError> {
    let language = Language::from_id(payload.language_id).ok_or_else(|| {
        AppError::Validation(format!("Unsupported language id: {}", payload.language_id))
    })?;

    let evaluation = Evaluation {
        user_id: auth_user.user_id,
        problem_id: payload.problem_id,
        source_code: payload.source_code,
        language,
        stdin: payload.stdin,
        expected_outputs: payload.expected_outputs,
    };
    evaluation.check()?;

    find_problem(&state.db, evaluation.problem_id).await?;

    let stored = judge::evaluate(
        &state.db,
        state.executor.as_ref(),
        state.config.executor.poll_policy(),
        evaluation,
    )
    .await?;

    info!(
        submission_id = stored.submission.id,
        verdict = %stored.submission.verdict,
        "Code executed"
    );

    Ok(Json(ExecuteCodeResponse {
        success: true,
        message: "Code executed successfully".into(),
        submission: stored.into(),
    }))
}
