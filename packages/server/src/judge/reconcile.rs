use common::Verdict;
use common::execution::ExecutionResult;
use serde::Serialize;

/// Pass/fail breakdown for one test case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseOutcome {
    /// 1-based position in the submitted stdin.
    pub test_case: i32,
    pub passed: bool,
    pub stdout: Option<String>,
    pub expected: String,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub status: String,
    pub memory: Option<String>,
    pub time: Option<String>,
}

/// An aggregate column that is only stored when some case reported a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sparse<T> {
    /// At least one case had a value; holds every case, index-aligned.
    Present(Vec<Option<T>>),
    Absent,
}

impl<T: Serialize> Sparse<T> {
    pub fn collect(values: Vec<Option<T>>) -> Self {
        if values.iter().any(Option::is_some) {
            Sparse::Present(values)
        } else {
            Sparse::Absent
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Sparse::Present(_))
    }

    /// JSON array when present, `None` (SQL NULL) when absent.
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Sparse::Present(values) => Some(serde_json::json!(values)),
            Sparse::Absent => None,
        }
    }
}

/// Full outcome of comparing a batch against its expected outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub verdict: Verdict,
    pub cases: Vec<CaseOutcome>,
}

impl Reconciliation {
    pub fn stdout(&self) -> Vec<Option<String>> {
        self.cases.iter().map(|c| c.stdout.clone()).collect()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.cases.iter().map(|c| c.status.clone()).collect()
    }

    pub fn stderr(&self) -> Sparse<String> {
        Sparse::collect(self.cases.iter().map(|c| c.stderr.clone()).collect())
    }

    pub fn compile_output(&self) -> Sparse<String> {
        Sparse::collect(self.cases.iter().map(|c| c.compile_output.clone()).collect())
    }

    pub fn memory(&self) -> Sparse<String> {
        Sparse::collect(self.cases.iter().map(|c| c.memory.clone()).collect())
    }

    pub fn time(&self) -> Sparse<String> {
        Sparse::collect(self.cases.iter().map(|c| c.time.clone()).collect())
    }
}

/// Compare every result against its expected output.
///
/// `results` and `expected_outputs` must be index-aligned and of equal length.
/// Every case is evaluated; a failure never short-circuits the rest.
pub fn reconcile(results: Vec<ExecutionResult>, expected_outputs: &[String]) -> Reconciliation {
    debug_assert_eq!(results.len(), expected_outputs.len());

    let cases: Vec<CaseOutcome> = results
        .into_iter()
        .zip(expected_outputs)
        .enumerate()
        .map(|(index, (result, expected))| {
            let expected = expected.trim_end().to_string();
            let stdout = result.stdout.map(|s| s.trim_end().to_string());
            let passed = stdout.as_deref() == Some(expected.as_str());

            CaseOutcome {
                test_case: index as i32 + 1,
                passed,
                stdout,
                expected,
                stderr: non_empty(result.stderr),
                compile_output: non_empty(result.compile_output),
                status: result.status.description,
                memory: result.memory.filter(|m| *m > 0).map(|m| format!("{m} KB")),
                time: non_empty(result.time).map(|t| format!("{t} seconds")),
            }
        })
        .collect();

    let verdict = Verdict::from_all_passed(cases.iter().all(|c| c.passed));

    Reconciliation { verdict, cases }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
