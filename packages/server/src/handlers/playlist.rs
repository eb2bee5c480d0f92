use std::collections::{BTreeSet, HashMap};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{debug, info, instrument};

use crate::entity::{playlist, problem, problem_in_playlist};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::playlist::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/playlists",
    tag = "Playlists",
    operation_id = "createPlaylist",
    summary = "Create a playlist",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 201, description = "Playlist created", body = PlaylistResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Caller already has a playlist with this name (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_playlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePlaylistRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_playlist(&payload)?;

    let now = chrono::Utc::now();
    let model = playlist::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        user_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A playlist with this name already exists".into())
        }
        _ => AppError::from(e),
    })?;

    info!(playlist_id = model.id, "Playlist created");
    Ok((
        StatusCode::CREATED,
        Json(PlaylistResponse::new(model, Vec::new())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/playlists",
    tag = "Playlists",
    operation_id = "listPlaylists",
    summary = "List the caller's playlists with their problems",
    responses(
        (status = 200, description = "Playlists", body = Vec<PlaylistResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_playlists(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PlaylistResponse>>, AppError> {
    let playlists = playlist::Entity::find()
        .filter(playlist::Column::UserId.eq(auth_user.user_id))
        .order_by_asc(playlist::Column::CreatedAt)
        .order_by_asc(playlist::Column::Id)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = playlists.iter().map(|p| p.id).collect();
    let mut entries = playlist_problems(&state.db, ids).await?;

    let data = playlists
        .into_iter()
        .map(|p| {
            let problems = entries.remove(&p.id).unwrap_or_default();
            PlaylistResponse::new(p, problems)
        })
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/api/v1/playlists/{id}",
    tag = "Playlists",
    operation_id = "getPlaylist",
    summary = "Get one of the caller's playlists",
    params(("id" = i32, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Playlist details", body = PlaylistResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Playlist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_playlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PlaylistResponse>, AppError> {
    let model = find_owned_playlist(&state.db, id, auth_user.user_id).await?;
    let problems = playlist_problems(&state.db, vec![id])
        .await?
        .remove(&id)
        .unwrap_or_default();

    Ok(Json(PlaylistResponse::new(model, problems)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/playlists/{id}",
    tag = "Playlists",
    operation_id = "deletePlaylist",
    summary = "Delete one of the caller's playlists",
    params(("id" = i32, Path, description = "Playlist ID")),
    responses(
        (status = 204, description = "Playlist deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Playlist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_playlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_owned_playlist(&txn, id, auth_user.user_id).await?;

    problem_in_playlist::Entity::delete_many()
        .filter(problem_in_playlist::Column::PlaylistId.eq(id))
        .exec(&txn)
        .await?;
    playlist::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/playlists/{id}/problems",
    tag = "Playlists",
    operation_id = "addProblemsToPlaylist",
    summary = "Add problems to a playlist",
    description = "Problems already in the playlist are skipped.",
    params(("id" = i32, Path, description = "Playlist ID")),
    request_body = PlaylistProblemsRequest,
    responses(
        (status = 200, description = "Problems added", body = PlaylistProblemsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Playlist or problem not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn add_problems(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<PlaylistProblemsRequest>,
) -> Result<Json<PlaylistProblemsResponse>, AppError> {
    validate_problem_ids(&payload)?;
    let wanted: BTreeSet<i32> = payload.problem_ids.into_iter().collect();

    let txn = state.db.begin().await?;
    find_owned_playlist(&txn, id, auth_user.user_id).await?;

    let found = problem::Entity::find()
        .filter(problem::Column::Id.is_in(wanted.iter().copied()))
        .count(&txn)
        .await?;
    if found != wanted.len() as u64 {
        return Err(AppError::NotFound("Problem not found".into()));
    }

    let now = chrono::Utc::now();
    let rows = wanted.iter().map(|&problem_id| problem_in_playlist::ActiveModel {
        playlist_id: Set(id),
        problem_id: Set(problem_id),
        created_at: Set(now),
    });

    let result = problem_in_playlist::Entity::insert_many(rows)
        .on_conflict(
            OnConflict::columns([
                problem_in_playlist::Column::PlaylistId,
                problem_in_playlist::Column::ProblemId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await;

    let affected = match result {
        Ok(n) => n,
        Err(DbErr::RecordNotInserted) => 0,
        Err(e) => return Err(e.into()),
    };

    txn.commit().await?;
    debug!(affected, "Added problems to playlist");
    Ok(Json(PlaylistProblemsResponse { affected }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/playlists/{id}/problems",
    tag = "Playlists",
    operation_id = "removeProblemsFromPlaylist",
    summary = "Remove problems from a playlist",
    params(("id" = i32, Path, description = "Playlist ID")),
    request_body = PlaylistProblemsRequest,
    responses(
        (status = 200, description = "Problems removed", body = PlaylistProblemsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Playlist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn remove_problems(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<PlaylistProblemsRequest>,
) -> Result<Json<PlaylistProblemsResponse>, AppError> {
    validate_problem_ids(&payload)?;
    find_owned_playlist(&state.db, id, auth_user.user_id).await?;

    let result = problem_in_playlist::Entity::delete_many()
        .filter(problem_in_playlist::Column::PlaylistId.eq(id))
        .filter(problem_in_playlist::Column::ProblemId.is_in(payload.problem_ids))
        .exec(&state.db)
        .await?;

    Ok(Json(PlaylistProblemsResponse {
        affected: result.rows_affected,
    }))
}

/// A playlist owned by `user_id`; other users' playlists are reported as missing.
async fn find_owned_playlist<C: ConnectionTrait>(
    db: &C,
    id: i32,
    user_id: i32,
) -> Result<playlist::Model, AppError> {
    playlist::Entity::find_by_id(id)
        .filter(playlist::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".into()))
}

/// Problems of each playlist in `ids`, in the order they were added.
async fn playlist_problems<C: ConnectionTrait>(
    db: &C,
    ids: Vec<i32>,
) -> Result<HashMap<i32, Vec<PlaylistProblemItem>>, AppError> {
    let rows = problem_in_playlist::Entity::find()
        .filter(problem_in_playlist::Column::PlaylistId.is_in(ids))
        .order_by_asc(problem_in_playlist::Column::CreatedAt)
        .order_by_asc(problem_in_playlist::Column::ProblemId)
        .find_also_related(problem::Entity)
        .all(db)
        .await?;

    let mut grouped: HashMap<i32, Vec<PlaylistProblemItem>> = HashMap::new();
    for (entry, problem) in rows {
        let Some(problem) = problem else { continue };
        grouped
            .entry(entry.playlist_id)
            .or_default()
            .push(PlaylistProblemItem {
                id: problem.id,
                title: problem.title,
                difficulty: problem.difficulty,
                added_at: entry.created_at,
            });
    }
    Ok(grouped)
}
