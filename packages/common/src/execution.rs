use serde::{Deserialize, Serialize};

/// One (code, stdin) pair submitted to the execution engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub source_code: String,
    pub language_id: i32,
    pub stdin: String,
    /// When set, the engine compares stdout itself and reports Wrong Answer on mismatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
}

/// Body of a batch submit request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchRequest {
    pub submissions: Vec<BatchItem>,
}

/// Opaque handle returned per submitted execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionToken {
    pub token: String,
}

/// Body of a batch poll response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchResults {
    pub submissions: Vec<ExecutionResult>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub id: i32,
    pub description: String,
}

impl ExecutionStatus {
    pub const IN_QUEUE: i32 = 1;
    pub const PROCESSING: i32 = 2;
    pub const ACCEPTED: i32 = 3;

    pub fn new(id: i32, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }

    /// Returns true once the engine has finished with the execution.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.id, Self::IN_QUEUE | Self::PROCESSING)
    }

    pub fn is_accepted(&self) -> bool {
        self.id == Self::ACCEPTED
    }
}

/// Outcome of a single execution, as reported by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    pub status: ExecutionStatus,
    /// Peak memory in kilobytes.
    #[serde(default)]
    pub memory: Option<i64>,
    /// Wall time in seconds, kept as the engine's decimal string.
    #[serde(default)]
    pub time: Option<String>,
}

impl ExecutionResult {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
