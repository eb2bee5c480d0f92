pub mod execution;
pub mod language;
pub mod retry;
pub mod verdict;

pub use execution::{BatchItem, ExecutionResult, ExecutionStatus, SubmissionToken};
pub use language::Language;
pub use verdict::Verdict;
