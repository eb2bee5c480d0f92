use std::collections::BTreeMap;

use common::Language;
use common::execution::BatchItem;
use common::retry::PollPolicy;
use tracing::{info, instrument, warn};

use super::JudgeError;
use super::executor::{CodeExecutor, run_batch};
use crate::models::problem::TestCase;

/// Check that every reference solution passes every test case.
///
/// Languages are checked in name order, each as one batch. All language
/// names are resolved up front so an unknown one fails before any code runs.
#[instrument(skip_all, fields(languages = solutions.len(), test_cases = test_cases.len()))]
pub async fn validate_reference_solutions(
    executor: &dyn CodeExecutor,
    policy: PollPolicy,
    solutions: &BTreeMap<String, String>,
    test_cases: &[TestCase],
) -> Result<(), JudgeError> {
    if test_cases.is_empty() {
        return Err(JudgeError::Invalid(
            "At least one test case is required".into(),
        ));
    }
    if solutions.is_empty() {
        return Err(JudgeError::Invalid(
            "At least one reference solution is required".into(),
        ));
    }

    let resolved = solutions
        .iter()
        .map(|(name, source)| {
            Language::from_name(name)
                .map(|language| (language, source))
                .ok_or_else(|| JudgeError::UnknownLanguage(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (language, source) in resolved {
        let items: Vec<BatchItem> = test_cases
            .iter()
            .map(|case| BatchItem {
                source_code: source.clone(),
                language_id: language.id(),
                stdin: case.input.clone(),
                expected_output: Some(case.output.clone()),
            })
            .collect();

        let results = run_batch(executor, &items, policy).await?;

        if let Some((index, result)) = results
            .iter()
            .enumerate()
            .find(|(_, r)| !r.status.is_accepted())
        {
            warn!(
                %language,
                test_case = index + 1,
                status = %result.status.description,
                "Reference solution rejected"
            );
            return Err(JudgeError::ReferenceFailed {
                language,
                test_case: index + 1,
                status: result.status.description.clone(),
            });
        }

        info!(%language, "Reference solution passed");
    }

    Ok(())
}
