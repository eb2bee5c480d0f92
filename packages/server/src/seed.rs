use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{problem_in_playlist, submission};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Per-user, per-problem submission history:
    // SELECT ... FROM submission WHERE user_id = ? AND problem_id = ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_submission_user_problem")
        .table(submission::Entity)
        .col(submission::Column::UserId)
        .col(submission::Column::ProblemId)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_submission_user_problem", &stmt).await;

    // Submission counts per problem
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_submission_problem")
        .table(submission::Entity)
        .col(submission::Column::ProblemId)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_submission_problem", &stmt).await;

    // Cascade delete of a problem's playlist entries
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_problem_in_playlist_problem")
        .table(problem_in_playlist::Entity)
        .col(problem_in_playlist::Column::ProblemId)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_problem_in_playlist_problem", &stmt).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &str) {
    match db.execute_unprepared(stmt).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}
