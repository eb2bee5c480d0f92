use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{problem, problem_in_playlist, problem_solved, submission, test_case_result};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::judge::validate::validate_reference_solutions;
use crate::models::problem::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/problems",
    tag = "Problems",
    operation_id = "createProblem",
    summary = "Create a new problem",
    description = "Creates a problem after running every reference solution against every test case. Any case that is not accepted, for any language, rejects the whole request. Requires the `ADMIN` role.",
    request_body = CreateProblemRequest,
    responses(
        (status = 201, description = "Problem created", body = ProblemResponse),
        (status = 400, description = "Validation error or reference solution rejected (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 502, description = "Execution engine failed (EXECUTION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_problem(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProblemRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_problem(&payload)?;

    validate_reference_solutions(
        state.executor.as_ref(),
        state.config.executor.poll_policy(),
        &payload.reference_solutions,
        &payload.test_cases,
    )
    .await?;

    let now = chrono::Utc::now();
    let new_problem = problem::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        difficulty: Set(payload.difficulty),
        tags: Set(serde_json::json!(payload.tags)),
        constraints: Set(payload.constraints),
        hints: Set(payload.hints),
        editorial: Set(payload.editorial),
        examples: Set(serde_json::json!(payload.examples)),
        test_cases: Set(serde_json::json!(payload.test_cases)),
        code_snippets: Set(serde_json::json!(payload.code_snippets)),
        reference_solutions: Set(serde_json::json!(payload.reference_solutions)),
        user_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_problem.insert(&state.db).await?;
    info!(problem_id = model.id, "Problem created");

    Ok((
        StatusCode::CREATED,
        Json(ProblemResponse::from_model(model, true)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/problems",
    tag = "Problems",
    operation_id = "listProblems",
    summary = "List problems with pagination and filters",
    description = "Returns a paginated list of problems, newest first. Supports case-insensitive title search, difficulty and tag filters. Each item says whether the caller has solved it.",
    params(ProblemListQuery),
    responses(
        (status = 200, description = "List of problems", body = ProblemListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_problems(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ProblemListQuery>,
) -> Result<Json<ProblemListResponse>, AppError> {
    let (page, per_page) = PageQuery {
        page: query.page,
        per_page: query.per_page,
    }
    .resolve();

    let mut select = problem::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(problem::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }
    if let Some(difficulty) = query.difficulty {
        select = select.filter(problem::Column::Difficulty.eq(difficulty));
    }
    if let Some(ref tag) = query.tag {
        select = select.filter(Expr::cust_with_values(
            r#""problem"."tags" @> $1"#,
            [serde_json::json!([tag.trim()])],
        ));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let problems = select
        .order_by_desc(problem::Column::CreatedAt)
        .order_by_desc(problem::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = problems.iter().map(|p| p.id).collect();
    let solved: HashSet<i32> = problem_solved::Entity::find()
        .filter(problem_solved::Column::UserId.eq(auth_user.user_id))
        .filter(problem_solved::Column::ProblemId.is_in(ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|s| s.problem_id)
        .collect();

    let data = problems
        .into_iter()
        .map(|p| ProblemListItem {
            solved: solved.contains(&p.id),
            id: p.id,
            title: p.title,
            difficulty: p.difficulty,
            tags: p.tags,
            created_at: p.created_at,
        })
        .collect();

    Ok(Json(ProblemListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/problems/solved",
    tag = "Problems",
    operation_id = "listSolvedProblems",
    summary = "Problems the caller has solved",
    description = "Returns every problem for which the caller has at least one accepted submission, most recently solved first.",
    responses(
        (status = 200, description = "Solved problems", body = Vec<ProblemListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_solved_problems(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProblemListItem>>, AppError> {
    let rows = problem_solved::Entity::find()
        .filter(problem_solved::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(problem_solved::Column::CreatedAt)
        .find_also_related(problem::Entity)
        .all(&state.db)
        .await?;

    let data = rows
        .into_iter()
        .filter_map(|(_, p)| p)
        .map(|p| ProblemListItem {
            id: p.id,
            title: p.title,
            difficulty: p.difficulty,
            tags: p.tags,
            solved: true,
            created_at: p.created_at,
        })
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/api/v1/problems/{id}",
    tag = "Problems",
    operation_id = "getProblem",
    summary = "Get a problem by ID",
    description = "Returns the full problem. Reference solutions are included only for administrators.",
    params(("id" = i32, Path, description = "Problem ID")),
    responses(
        (status = 200, description = "Problem details", body = ProblemResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_problem(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProblemResponse>, AppError> {
    let model = find_problem(&state.db, id).await?;
    Ok(Json(ProblemResponse::from_model(model, auth_user.is_admin())))
}

#[utoipa::path(
    patch,
    path = "/api/v1/problems/{id}",
    tag = "Problems",
    operation_id = "updateProblem",
    summary = "Update an existing problem",
    description = "Partially updates a problem; only provided fields are modified. When test cases or reference solutions change, every reference solution is re-run against every test case before anything is written. Requires the `ADMIN` role.",
    params(("id" = i32, Path, description = "Problem ID")),
    request_body = UpdateProblemRequest,
    responses(
        (status = 200, description = "Problem updated", body = ProblemResponse),
        (status = 400, description = "Validation error or reference solution rejected (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Problem changed during validation (CONFLICT)", body = ErrorBody),
        (status = 502, description = "Execution engine failed (EXECUTION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_problem(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProblemRequest>,
) -> Result<Json<ProblemResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_problem(&payload)?;

    let existing = find_problem(&state.db, id).await?;

    let checked = if payload.needs_revalidation() {
        let test_cases = match payload.test_cases {
            Some(ref cases) => cases.clone(),
            None => test_cases_from_json(&existing.test_cases)?,
        };
        let solutions = match payload.reference_solutions {
            Some(ref solutions) => solutions.clone(),
            None => solutions_from_json(&existing.reference_solutions)?,
        };
        validate_reference_solutions(
            state.executor.as_ref(),
            state.config.executor.poll_policy(),
            &solutions,
            &test_cases,
        )
        .await?;
        Some(CheckedPairing::new(&payload, &existing))
    } else {
        None
    };

    let txn = state.db.begin().await?;

    let existing = find_problem_for_update(&txn, id).await?;
    if let Some(checked) = checked
        && !checked.still_holds(&existing.test_cases, &existing.reference_solutions)
    {
        warn!(problem_id = id, "Problem changed while its solutions were being checked");
        return Err(AppError::Conflict(
            "Problem was modified during validation, retry the update".into(),
        ));
    }
    let mut active: problem::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(difficulty) = payload.difficulty {
        active.difficulty = Set(difficulty);
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(serde_json::json!(tags));
    }
    if let Some(constraints) = payload.constraints {
        active.constraints = Set(constraints);
    }
    if let Some(hints) = payload.hints {
        active.hints = Set(hints);
    }
    if let Some(editorial) = payload.editorial {
        active.editorial = Set(editorial);
    }
    if let Some(examples) = payload.examples {
        active.examples = Set(serde_json::json!(examples));
    }
    if let Some(test_cases) = payload.test_cases {
        active.test_cases = Set(serde_json::json!(test_cases));
    }
    if let Some(code_snippets) = payload.code_snippets {
        active.code_snippets = Set(serde_json::json!(code_snippets));
    }
    if let Some(solutions) = payload.reference_solutions {
        active.reference_solutions = Set(serde_json::json!(solutions));
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(ProblemResponse::from_model(model, true)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/problems/{id}",
    tag = "Problems",
    operation_id = "deleteProblem",
    summary = "Delete a problem by ID",
    description = "Permanently deletes a problem together with its submissions, test-case results, solved markers and playlist entries. Requires the `ADMIN` role.",
    params(("id" = i32, Path, description = "Problem ID")),
    responses(
        (status = 204, description = "Problem deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_problem(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;

    let _problem = find_problem_for_update(&txn, id).await?;

    test_case_result::Entity::delete_many()
        .filter(
            test_case_result::Column::SubmissionId.in_subquery(
                SeaQuery::select()
                    .column(submission::Column::Id)
                    .from(submission::Entity)
                    .and_where(submission::Column::ProblemId.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;

    submission::Entity::delete_many()
        .filter(submission::Column::ProblemId.eq(id))
        .exec(&txn)
        .await?;
    problem_solved::Entity::delete_many()
        .filter(problem_solved::Column::ProblemId.eq(id))
        .exec(&txn)
        .await?;
    problem_in_playlist::Entity::delete_many()
        .filter(problem_in_playlist::Column::ProblemId.eq(id))
        .exec(&txn)
        .await?;
    problem::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    info!("Problem deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_problem<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<problem::Model, AppError> {
    problem::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem not found".into()))
}

/// Stored columns a reference check relied on. A column the payload replaces
/// is `None`, since the new value was checked instead.
struct CheckedPairing {
    test_cases: Option<serde_json::Value>,
    reference_solutions: Option<serde_json::Value>,
}

impl CheckedPairing {
    fn new(payload: &UpdateProblemRequest, stored: &problem::Model) -> Self {
        Self {
            test_cases: payload
                .test_cases
                .is_none()
                .then(|| stored.test_cases.clone()),
            reference_solutions: payload
                .reference_solutions
                .is_none()
                .then(|| stored.reference_solutions.clone()),
        }
    }

    fn still_holds(&self, test_cases: &serde_json::Value, solutions: &serde_json::Value) -> bool {
        self.test_cases.as_ref().is_none_or(|v| v == test_cases)
            && self.reference_solutions.as_ref().is_none_or(|v| v == solutions)
    }
}

async fn find_problem_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<problem::Model, AppError> {
    use sea_orm::sea_query::LockType;
    problem::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem not found".into()))
}
