//! Client side of the remote execution engine.

use std::time::Duration;

use async_trait::async_trait;
use common::execution::{BatchItem, BatchRequest, BatchResults, ExecutionResult, SubmissionToken};
use common::retry::PollPolicy;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::ExecutorConfig;

/// Fields requested when polling; everything the reconciler reads.
const RESULT_FIELDS: &str = "stdout,stderr,compile_output,status,memory,time";

/// Judge0 rejects batches larger than this unless reconfigured.
const MAX_BATCH_SIZE: usize = 20;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Execution engine unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Execution engine responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Execution engine protocol error: {0}")]
    Protocol(String),

    #[error("Batch did not finish after {attempts} polling attempts")]
    Timeout { attempts: u32 },
}

/// A remote engine that runs (code, stdin) pairs in batches.
///
/// Used as `Arc<dyn CodeExecutor>` so tests can swap in an in-memory engine.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Submit a batch; returns one token per item, in item order.
    async fn submit_batch(&self, items: &[BatchItem]) -> Result<Vec<SubmissionToken>, ExecutorError>;

    /// Fetch the current state of every token, in token order.
    async fn poll_batch(
        &self,
        tokens: &[SubmissionToken],
    ) -> Result<Vec<ExecutionResult>, ExecutorError>;
}

/// Submit `items` and block until every execution reaches a terminal status.
///
/// Results are index-aligned with `items`.
#[instrument(skip(executor, items, policy), fields(items = items.len()))]
pub async fn run_batch(
    executor: &dyn CodeExecutor,
    items: &[BatchItem],
    policy: PollPolicy,
) -> Result<Vec<ExecutionResult>, ExecutorError> {
    let tokens = executor.submit_batch(items).await?;
    if tokens.len() != items.len() {
        return Err(ExecutorError::Protocol(format!(
            "submitted {} items but received {} tokens",
            items.len(),
            tokens.len()
        )));
    }

    poll_until_complete(executor, &tokens, policy).await
}

/// Poll until no token is queued or processing, giving up after `policy.max_attempts` rounds.
pub async fn poll_until_complete(
    executor: &dyn CodeExecutor,
    tokens: &[SubmissionToken],
    policy: PollPolicy,
) -> Result<Vec<ExecutionResult>, ExecutorError> {
    for attempt in 1..=policy.max_attempts {
        let results = executor.poll_batch(tokens).await?;
        if results.len() != tokens.len() {
            return Err(ExecutorError::Protocol(format!(
                "polled {} tokens but received {} results",
                tokens.len(),
                results.len()
            )));
        }

        let pending = results.iter().filter(|r| !r.is_terminal()).count();
        if pending == 0 {
            debug!(attempt, "Batch finished");
            return Ok(results);
        }

        if attempt < policy.max_attempts {
            let delay = policy.delay_after(attempt);
            debug!(
                attempt,
                pending,
                delay_ms = delay.as_millis() as u64,
                "Batch still running"
            );
            tokio::time::sleep(delay).await;
        }
    }

    warn!(
        tokens = tokens.len(),
        attempts = policy.max_attempts,
        "Giving up on batch"
    );
    Err(ExecutorError::Timeout {
        attempts: policy.max_attempts,
    })
}

/// HTTP client for a Judge0-compatible batch API.
pub struct Judge0Client {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl Judge0Client {
    pub fn new(config: &ExecutorConfig) -> Result<Self, ExecutorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.auth_token {
            Some(token) => builder.header("X-Auth-Token", token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ExecutorError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ExecutorError::Status { status, body });
        }

        serde_json::from_str(&body).map_err(|e| ExecutorError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl CodeExecutor for Judge0Client {
    async fn submit_batch(&self, items: &[BatchItem]) -> Result<Vec<SubmissionToken>, ExecutorError> {
        let mut tokens = Vec::with_capacity(items.len());

        for chunk in items.chunks(MAX_BATCH_SIZE) {
            let builder = self
                .request(Method::POST, "/submissions/batch")
                .query(&[("base64_encoded", "false")])
                .json(&BatchRequest {
                    submissions: chunk.to_vec(),
                });
            let chunk_tokens: Vec<SubmissionToken> = Self::send(builder).await?;
            tokens.extend(chunk_tokens);
        }

        debug!(tokens = tokens.len(), "Submitted batch");
        Ok(tokens)
    }

    async fn poll_batch(
        &self,
        tokens: &[SubmissionToken],
    ) -> Result<Vec<ExecutionResult>, ExecutorError> {
        let mut results = Vec::with_capacity(tokens.len());

        for chunk in tokens.chunks(MAX_BATCH_SIZE) {
            let joined = chunk
                .iter()
                .map(|t| t.token.as_str())
                .collect::<Vec<_>>()
                .join(",");
            let builder = self.request(Method::GET, "/submissions/batch").query(&[
                ("tokens", joined.as_str()),
                ("base64_encoded", "false"),
                ("fields", RESULT_FIELDS),
            ]);
            let batch: BatchResults = Self::send(builder).await?;
            results.extend(batch.submissions);
        }

        Ok(results)
    }
}
