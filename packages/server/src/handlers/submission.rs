use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::submission;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::problem::find_problem;
use crate::judge::persist::load_submission;
use crate::models::shared::{PageQuery, Pagination};
use crate::models::submission::*;
use crate::state::AppState;

/// Paginate a submission query, newest first.
async fn list_page(
    db: &DatabaseConnection,
    mut select: Select<submission::Entity>,
    query: &SubmissionListQuery,
) -> Result<SubmissionListResponse, AppError> {
    let (page, per_page) = PageQuery {
        page: query.page,
        per_page: query.per_page,
    }
    .resolve();

    if let Some(verdict) = query.verdict {
        select = select.filter(submission::Column::Verdict.eq(verdict));
    }

    let total = select.clone().paginate(db, per_page).num_items().await?;

    let data = select
        .order_by_desc(submission::Column::CreatedAt)
        .order_by_desc(submission::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(db)
        .await?
        .into_iter()
        .map(SubmissionResponse::from)
        .collect();

    Ok(SubmissionListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/submissions",
    tag = "Submissions",
    operation_id = "listMySubmissions",
    summary = "List the caller's submissions",
    params(SubmissionListQuery),
    responses(
        (status = 200, description = "Submissions, newest first", body = SubmissionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    let select = submission::Entity::find()
        .filter(submission::Column::UserId.eq(auth_user.user_id));

    Ok(Json(list_page(&state.db, select, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/submissions/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get a submission with its per-case results",
    description = "Users can only read their own submissions; administrators can read any.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission details", body = SubmissionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let stored = load_submission(&state.db, id)
        .await?
        .filter(|s| auth_user.is_admin() || s.submission.user_id == auth_user.user_id)
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))?;

    Ok(Json(stored.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/problems/{id}/submissions",
    tag = "Submissions",
    operation_id = "listProblemSubmissions",
    summary = "List the caller's submissions for one problem",
    params(("id" = i32, Path, description = "Problem ID"), SubmissionListQuery),
    responses(
        (status = 200, description = "Submissions, newest first", body = SubmissionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(problem_id))]
pub async fn list_problem_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    find_problem(&state.db, problem_id).await?;

    let select = submission::Entity::find()
        .filter(submission::Column::UserId.eq(auth_user.user_id))
        .filter(submission::Column::ProblemId.eq(problem_id));

    Ok(Json(list_page(&state.db, select, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/problems/{id}/submissions/count",
    tag = "Submissions",
    operation_id = "countProblemSubmissions",
    summary = "Count submissions for a problem across all users",
    params(("id" = i32, Path, description = "Problem ID")),
    responses(
        (status = 200, description = "Submission count", body = SubmissionCountResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(problem_id))]
pub async fn count_problem_submissions(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
) -> Result<Json<SubmissionCountResponse>, AppError> {
    find_problem(&state.db, problem_id).await?;

    let count = submission::Entity::find()
        .filter(submission::Column::ProblemId.eq(problem_id))
        .count(&state.db)
        .await?;

    Ok(Json(SubmissionCountResponse { problem_id, count }))
}
