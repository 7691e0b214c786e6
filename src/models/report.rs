//! Reports returned by the two checkers.

use serde::{Deserialize, Serialize};

use super::contract::ScopeContract;
use super::finding::Violation;

/// Area a plan-quality check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum CheckCategory {
    Scope,
    Complexity,
    Duplication,
    Safety,
    Architecture,
}

/// One plan-quality assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub id: String,
    pub category: CheckCategory,
    pub description: String,
    pub passed: bool,
    pub message: String,
}

/// Compact view of the memory bank returned with a pre-check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryBankSummary {
    pub exists: bool,
    pub project_brief: Option<String>,
    pub tech_stack: Option<String>,
    /// `"METHOD /path"` entries from the routes table.
    pub known_routes: Vec<String>,
    pub active_scope: Option<String>,
}

/// Output of pre_check: the contract plus the verdict on the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreCheckReport {
    #[serde(flatten)]
    pub contract: ScopeContract,
    pub checks: Vec<CheckResult>,
    pub score: u32,
    pub passed: bool,
    pub recommendation: String,
    pub memory_bank: MemoryBankSummary,
}

impl PreCheckReport {
    /// The serialized contract, in the form diff_review expects.
    pub fn contract_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Output of diff_review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub compliant: bool,
    pub score: u32,
    pub summary: String,
    pub in_scope_changes: Vec<String>,
    pub violations: Vec<Violation>,
    pub missing_changes: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub memory_bank_updated: bool,
}
