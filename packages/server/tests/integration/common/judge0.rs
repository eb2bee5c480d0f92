//! A minimal Judge0 batch API for integration tests.
//!
//! Programs are not executed. The output is derived from the source code:
//!
//! * `compile_error`  -> Compilation Error
//! * `never_finishes` -> stays Processing forever
//! * `off_by_one`     -> sum of stdin integers, plus one when the sum exceeds 5
//! * anything else    -> sum of stdin integers
//!
//! Every token reports `In Queue` on its first poll. When an item carries
//! `expected_output`, a mismatch is reported as Wrong Answer.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use common::execution::{
    BatchItem, BatchRequest, BatchResults, ExecutionResult, ExecutionStatus, SubmissionToken,
};

struct Entry {
    item: BatchItem,
    polls: u32,
}

#[derive(Default)]
pub struct FakeJudge0 {
    addr: Mutex<Option<SocketAddr>>,
    entries: Mutex<HashMap<String, Entry>>,
    batches: AtomicUsize,
    next_token: AtomicUsize,
}

impl FakeJudge0 {
    pub async fn spawn() -> Arc<Self> {
        let fake = Arc::new(Self::default());

        let app = Router::new()
            .route("/submissions/batch", post(submit).get(poll))
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Judge0");
        *fake.addr.lock().unwrap() = Some(listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        fake
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr.lock().unwrap().expect("fake Judge0 not bound"))
    }

    /// Number of batch submissions received.
    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    /// All items received so far, in no particular order.
    pub fn items(&self) -> Vec<BatchItem> {
        self.entries
            .lock()
            .unwrap()
            .values()
            .map(|e| e.item.clone())
            .collect()
    }
}

async fn submit(
    State(fake): State<Arc<FakeJudge0>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<Vec<SubmissionToken>>, StatusCode> {
    if headers.get("X-Auth-Token").is_none() {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if params.get("base64_encoded").map(String::as_str) != Some("false") {
        return Err(StatusCode::BAD_REQUEST);
    }

    fake.batches.fetch_add(1, Ordering::SeqCst);
    let mut entries = fake.entries.lock().unwrap();

    let tokens = request
        .submissions
        .into_iter()
        .map(|item| {
            let token = format!("tok-{}", fake.next_token.fetch_add(1, Ordering::SeqCst));
            entries.insert(token.clone(), Entry { item, polls: 0 });
            SubmissionToken { token }
        })
        .collect();

    Ok(Json(tokens))
}

async fn poll(
    State(fake): State<Arc<FakeJudge0>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<BatchResults>, StatusCode> {
    let tokens = params.get("tokens").ok_or(StatusCode::BAD_REQUEST)?;
    let mut entries = fake.entries.lock().unwrap();

    let mut submissions = Vec::new();
    for token in tokens.split(',') {
        let entry = entries.get_mut(token).ok_or(StatusCode::NOT_FOUND)?;
        entry.polls += 1;
        submissions.push(if entry.polls == 1 {
            pending(ExecutionStatus::IN_QUEUE, "In Queue")
        } else {
            run(&entry.item)
        });
    }

    Ok(Json(BatchResults { submissions }))
}

fn pending(id: i32, description: &str) -> ExecutionResult {
    ExecutionResult {
        stdout: None,
        stderr: None,
        compile_output: None,
        status: ExecutionStatus::new(id, description),
        memory: None,
        time: None,
    }
}

fn run(item: &BatchItem) -> ExecutionResult {
    if item.source_code.contains("never_finishes") {
        return pending(ExecutionStatus::PROCESSING, "Processing");
    }
    if item.source_code.contains("compile_error") {
        return ExecutionResult {
            compile_output: Some("main.py:1: SyntaxError: invalid syntax".into()),
            ..pending(6, "Compilation Error")
        };
    }

    let mut sum: i64 = item
        .stdin
        .split_whitespace()
        .filter_map(|n| n.parse::<i64>().ok())
        .sum();
    if item.source_code.contains("off_by_one") && sum > 5 {
        sum += 1;
    }
    let stdout = format!("{sum}\n");

    let status = match item.expected_output {
        Some(ref expected) if expected.trim_end() != stdout.trim_end() => {
            ExecutionStatus::new(4, "Wrong Answer")
        }
        _ => ExecutionStatus::new(ExecutionStatus::ACCEPTED, "Accepted"),
    };

    ExecutionResult {
        stdout: Some(stdout),
        stderr: None,
        compile_output: None,
        status,
        memory: Some(3168),
        time: Some("0.002".into()),
    }
}
