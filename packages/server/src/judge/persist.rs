use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{debug, info, instrument};

use super::reconcile::Reconciliation;
use crate::entity::{problem_solved, submission, test_case_result};

/// Everything about a submission that is known before it is judged.
#[derive(Clone, Debug)]
pub struct NewSubmission {
    pub user_id: i32,
    pub problem_id: i32,
    pub source_code: String,
    /// Display name of the language, e.g. `PYTHON`.
    pub language: String,
    pub stdin: Vec<String>,
}

/// A stored submission together with its per-case rows, ordered by case index.
#[derive(Clone, Debug)]
pub struct PersistedSubmission {
    pub submission: submission::Model,
    pub test_cases: Vec<test_case_result::Model>,
}

/// Record a judged submission in a single transaction.
///
/// Inserts the submission row, marks the problem solved when accepted,
/// inserts one row per test case, then re-reads the submission with its
/// cases. Any failure rolls the whole write back.
#[instrument(skip_all, fields(user_id = new.user_id, problem_id = new.problem_id, verdict = %outcome.verdict))]
pub async fn persist_submission(
    db: &DatabaseConnection,
    new: NewSubmission,
    outcome: &Reconciliation,
) -> Result<PersistedSubmission, DbErr> {
    let txn = db.begin().await?;
    let now = Utc::now();

    let row = submission::ActiveModel {
        source_code: Set(new.source_code),
        language: Set(new.language),
        stdin: Set(serde_json::json!(new.stdin)),
        stdout: Set(serde_json::json!(outcome.stdout())),
        stderr: Set(outcome.stderr().into_json()),
        compile_output: Set(outcome.compile_output().into_json()),
        statuses: Set(serde_json::json!(outcome.statuses())),
        memory: Set(outcome.memory().into_json()),
        time: Set(outcome.time().into_json()),
        verdict: Set(outcome.verdict),
        user_id: Set(new.user_id),
        problem_id: Set(new.problem_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if outcome.verdict.is_accepted() {
        mark_solved(&txn, new.user_id, new.problem_id).await?;
    }

    let rows: Vec<test_case_result::ActiveModel> = outcome
        .cases
        .iter()
        .map(|case| test_case_result::ActiveModel {
            submission_id: Set(row.id),
            test_case: Set(case.test_case),
            passed: Set(case.passed),
            stdout: Set(case.stdout.clone()),
            expected: Set(case.expected.clone()),
            stderr: Set(case.stderr.clone()),
            compile_output: Set(case.compile_output.clone()),
            status: Set(case.status.clone()),
            memory: Set(case.memory.clone()),
            time: Set(case.time.clone()),
            created_at: Set(now),
            ..Default::default()
        })
        .collect();

    if !rows.is_empty() {
        test_case_result::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }

    let stored = load_submission(&txn, row.id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("submission {}", row.id)))?;

    txn.commit().await?;
    info!(submission_id = stored.submission.id, "Stored submission");

    Ok(stored)
}

/// Insert a `problem_solved` marker unless one already exists.
pub async fn mark_solved<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    problem_id: i32,
) -> Result<(), DbErr> {
    let marker = problem_solved::ActiveModel {
        user_id: Set(user_id),
        problem_id: Set(problem_id),
        created_at: Set(Utc::now()),
    };

    let result = problem_solved::Entity::insert(marker)
        .on_conflict(
            OnConflict::columns([
                problem_solved::Column::UserId,
                problem_solved::Column::ProblemId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {
            debug!(user_id, problem_id, "Problem already marked solved");
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Fetch a submission and its per-case rows.
pub async fn load_submission<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<PersistedSubmission>, DbErr> {
    let Some(submission) = submission::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let test_cases = test_case_result::Entity::find()
        .filter(test_case_result::Column::SubmissionId.eq(id))
        .order_by_asc(test_case_result::Column::TestCase)
        .all(db)
        .await?;

    Ok(Some(PersistedSubmission {
        submission,
        test_cases,
    }))
}
