//! The scope contract handed from pre_check to diff_review.
//!
//! pre_check produces a typed [`ScopeContract`]. The contract then leaves the
//! process as JSON and comes back through the caller, so the reviewer never
//! deserializes it directly: [`ContractTerms::parse`] validates the shape and
//! extracts only the fields it needs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;
use thiserror::Error;

use super::finding::RedFlag;
use super::snapshot::SnapshotSummary;

/// Coarse size of a proposed change, by number of files touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, JsonSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComplexityRating {
    Trivial,
    Small,
    Medium,
    Large,
    Excessive,
}

impl ComplexityRating {
    /// Step function over the proposed-file count: 0, 1-2, 3-5, 6-10, >10.
    pub fn from_file_count(count: usize) -> Self {
        match count {
            0 => ComplexityRating::Trivial,
            1..=2 => ComplexityRating::Small,
            3..=5 => ComplexityRating::Medium,
            6..=10 => ComplexityRating::Large,
            _ => ComplexityRating::Excessive,
        }
    }
}

/// The pre-approved set of files, complexity and red flags for one request.
///
/// `approved_files` and `forbidden_files` are disjoint and were both present
/// in the scanned project; `allowed_new_files` were absent from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScopeContract {
    /// The caller's request, verbatim.
    pub request_summary: String,
    pub approved_files: Vec<String>,
    pub forbidden_files: Vec<String>,
    pub allowed_new_files: Vec<String>,
    pub complexity_rating: ComplexityRating,
    pub red_flags: Vec<RedFlag>,
    pub project_snapshot: SnapshotSummary,
}

/// Why a serialized contract was rejected.
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("scope contract is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("scope contract is missing required field `{0}`")]
    MissingField(&'static str),
}

/// The parts of a scope contract the reviewer relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractTerms {
    pub request_summary: String,
    pub approved_files: Vec<String>,
    pub forbidden_files: Vec<String>,
    pub allowed_new_files: Vec<String>,
}

impl ContractTerms {
    /// Validate and extract a serialized contract.
    ///
    /// A contract is well-formed iff it carries a string `requestSummary` and
    /// an array `approvedFiles`. The optional lists default to empty when
    /// absent or mistyped, and non-string entries are dropped.
    pub fn parse(raw: &str) -> Result<Self, ContractError> {
        let value: Value = serde_json::from_str(raw)?;

        let request_summary = value
            .get("requestSummary")
            .and_then(Value::as_str)
            .ok_or(ContractError::MissingField("requestSummary"))?
            .to_string();
        let approved_files = value
            .get("approvedFiles")
            .and_then(Value::as_array)
            .ok_or(ContractError::MissingField("approvedFiles"))?;

        Ok(Self {
            request_summary,
            approved_files: strings(approved_files),
            forbidden_files: string_list(&value, "forbiddenFiles"),
            allowed_new_files: string_list(&value, "allowedNewFiles"),
        })
    }
}

impl From<&ScopeContract> for ContractTerms {
    fn from(contract: &ScopeContract) -> Self {
        Self {
            request_summary: contract.request_summary.clone(),
            approved_files: contract.approved_files.clone(),
            forbidden_files: contract.forbidden_files.clone(),
            allowed_new_files: contract.allowed_new_files.clone(),
        }
    }
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| strings(items))
        .unwrap_or_default()
}

fn strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect()
}

/// JSON Schema for [`ScopeContract`], for callers that validate before sending.
pub fn contract_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(ScopeContract)).unwrap_or(Value::Null)
}
