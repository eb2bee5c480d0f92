//! Submission evaluation pipeline: run on the remote engine, reconcile, persist.

pub mod executor;
pub mod persist;
pub mod reconcile;
pub mod validate;


use common::Language;
use common::execution::BatchItem;
use common::retry::PollPolicy;
use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;
use tracing::{info, instrument};

use crate::error::AppError;
use executor::{CodeExecutor, ExecutorError, run_batch};
use persist::{NewSubmission, PersistedSubmission, persist_submission};
use reconcile::reconcile;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("{0}")]
    Invalid(String),

    #[error("Unsupported language: {0}")]
    UnknownLanguage(String),

    #[error("Testcase {test_case} failed for language {language}: {status}")]
    ReferenceFailed {
        language: Language,
        test_case: usize,
        status: String,
    },

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<JudgeError> for AppError {
    fn from(err: JudgeError) -> Self {
        match err {
            JudgeError::Invalid(_)
            | JudgeError::UnknownLanguage(_)
            | JudgeError::ReferenceFailed { .. } => AppError::Validation(err.to_string()),
            JudgeError::Executor(e) => e.into(),
            JudgeError::Database(e) => e.into(),
        }
    }
}

/// A user's code to be run against a list of (stdin, expected output) pairs.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub user_id: i32,
    pub problem_id: i32,
    pub source_code: String,
    pub language: Language,
    pub stdin: Vec<String>,
    pub expected_outputs: Vec<String>,
}

impl Evaluation {
    /// Shape checks that must pass before the engine is contacted.
    pub fn check(&self) -> Result<(), JudgeError> {
        if self.stdin.is_empty() {
            return Err(JudgeError::Invalid("Invalid or missing test cases".into()));
        }
        if self.expected_outputs.len() != self.stdin.len() {
            return Err(JudgeError::Invalid(format!(
                "Expected {} outputs, got {}",
                self.stdin.len(),
                self.expected_outputs.len()
            )));
        }
        Ok(())
    }
}

/// Run `evaluation` end to end and return the stored submission.
///
/// Nothing is written unless every case reached a terminal status.
#[instrument(skip_all, fields(user_id = evaluation.user_id, problem_id = evaluation.problem_id, language = %evaluation.language))]
pub async fn evaluate(
    db: &DatabaseConnection,
    executor: &dyn CodeExecutor,
    policy: PollPolicy,
    evaluation: Evaluation,
) -> Result<PersistedSubmission, JudgeError> {
    evaluation.check()?;

    let items: Vec<BatchItem> = evaluation
        .stdin
        .iter()
        .map(|stdin| BatchItem {
            source_code: evaluation.source_code.clone(),
            language_id: evaluation.language.id(),
            stdin: stdin.clone(),
            expected_output: None,
        })
        .collect();

    let results = run_batch(executor, &items, policy).await?;
    let outcome = reconcile(results, &evaluation.expected_outputs);
    info!(verdict = %outcome.verdict, cases = outcome.cases.len(), "Reconciled");

    let new = NewSubmission {
        user_id: evaluation.user_id,
        problem_id: evaluation.problem_id,
        source_code: evaluation.source_code,
        language: evaluation.language.name().to_string(),
        stdin: evaluation.stdin,
    };

    Ok(persist_submission(db, new, &outcome).await?)
}
