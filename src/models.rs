//! Core data models used throughout the feedback service.
//!
//! [`Chunk`] is what ingestion produces and the vector index stores.
//! [`Submission`] and its nested metadata are the transient request payload
//! for one feedback call; they are never persisted.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A bounded span of source text plus provenance metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    /// Language label, e.g. `"python"`.
    pub language: String,
    /// File path or URL the text came from.
    pub source: String,
    /// SHA-256 of `text`.
    pub hash: String,
}

impl Chunk {
    pub fn new(text: impl Into<String>, language: &str, source: &str) -> Self {
        let text = text.into();
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        Self {
            id: Uuid::new_v4().to_string(),
            text,
            language: language.to_string(),
            source: source.to_string(),
            hash,
        }
    }

    /// Key identifying the same text from the same source across ingestions.
    pub fn dedup_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Optional descriptive context about the problem being solved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemMeta {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
}

/// Result of running the submission against one test case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: Option<String>,
    pub expected_output: Option<String>,
    pub actual_output: Option<String>,
    pub status: Option<String>,
    pub passed: Option<bool>,
    pub error_message: Option<String>,
    /// Milliseconds.
    pub execution_time: Option<i64>,
}

/// Judge verdict and aggregate counts for the submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMeta {
    pub id: Option<String>,
    pub verdict: Option<String>,
    pub passed_tests: Option<i64>,
    pub total_tests: Option<i64>,
}

/// A user's code-and-results payload submitted for review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub code: String,
    pub language: String,
    pub output: String,
    pub expected_output: String,
    #[serde(default)]
    pub problem: Option<ProblemMeta>,
    #[serde(default)]
    pub test_cases: Option<Vec<TestCase>>,
    #[serde(default, rename = "submission", alias = "submissionMeta")]
    pub meta: Option<SubmissionMeta>,
}

/// Response body of the feedback endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub feedback: String,
}

/// A webpage to ingest, tagged with the language it documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteSource {
    pub url: String,
    pub language: String,
}

/// Response body of the webpage ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddWebpageResponse {
    pub message: String,
    pub url: String,
    pub language: String,
    pub chunks_added: usize,
}
