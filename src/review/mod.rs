//! Post-implementation reviewer.
//!
//! Re-validates a serialized scope contract, compares the actual change set
//! against it, checks the implementation summary for scope drift and scores
//! the result. A compliant review is recorded in the memory bank when one
//! exists.

pub mod writeback;

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::config::{Config, ReviewConfig};
use crate::memory::{MemoryStore, templates};
use crate::models::{ComplianceReport, ContractTerms, Violation, ViolationKind};
use crate::text::{mentions_any, significant_tokens, token_set};

pub use writeback::{ComplianceRecord, WriteBackStatus, WriteBackStep, record_compliance};

/// Summary tokens of this many characters or fewer are ignored for drift.
const DRIFT_MIN_TOKEN_LEN: usize = 3;

const ROUTE_REQUEST_WORDS: &[&str] = &["route", "endpoint", "api", "page"];
const APP_ROUTE_SUFFIXES: &[&str] = &["page.tsx", "page.jsx", "route.ts", "route.js"];

/// Inputs to a review.
#[derive(Debug, Clone)]
pub struct ReviewRequest<'a> {
    /// The serialized contract from a prior pre-check.
    pub contract: &'a str,
    pub changed_files: &'a [String],
    pub added_files: &'a [String],
    pub deleted_files: &'a [String],
    /// What was actually implemented.
    pub summary: &'a str,
    /// Needed for the route cross-check and the memory write-back.
    pub project_root: Option<&'a Path>,
}

/// The report plus what happened to the memory bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub report: ComplianceReport,
    pub write_back: WriteBackStatus,
}

/// Review an implementation against its scope contract.
pub async fn diff_review(req: &ReviewRequest<'_>, config: &Config) -> ReviewOutcome {
    let terms = match ContractTerms::parse(req.contract) {
        Ok(terms) => terms,
        Err(e) => {
            warn!("rejecting scope contract: {e}");
            return ReviewOutcome {
                report: invalid_contract_report(),
                write_back: WriteBackStatus::NotAttempted,
            };
        }
    };

    let store = req
        .project_root
        .map(|root| MemoryStore::new(root, config.memory.clone()));

    let route_count = match &store {
        Some(store) => store.context().await.known_routes().len(),
        None => 0,
    };

    let mut report = assess(&terms, req, route_count > 0, &config.review);

    let write_back = match &store {
        Some(store) if report.compliant => {
            let files: Vec<String> = req
                .changed_files
                .iter()
                .chain(req.added_files)
                .cloned()
                .collect();
            let date = templates::today();
            let record = ComplianceRecord {
                date: &date,
                summary: req.summary,
                files: &files,
                score: report.score,
            };
            record_compliance(store, &record).await
        }
        _ => WriteBackStatus::NotAttempted,
    };
    report.memory_bank_updated = write_back.is_updated();

    info!(
        score = report.score,
        compliant = report.compliant,
        violations = report.violations.len(),
        memory_bank_updated = report.memory_bank_updated,
        "diff review complete"
    );
    ReviewOutcome { report, write_back }
}

/// The fixed report for a contract that failed validation.
pub fn invalid_contract_report() -> ComplianceReport {
    ComplianceReport {
        compliant: false,
        score: 0,
        summary: "Could not parse scope contract. Ensure it is valid JSON from a pre_check call."
            .to_string(),
        in_scope_changes: Vec::new(),
        violations: vec![Violation::critical(
            ViolationKind::InvalidContract,
            "",
            "Scope contract is not valid JSON or missing required fields",
        )],
        missing_changes: Vec::new(),
        recommended_actions: vec![
            "Re-run pre_check and provide the output as scopeContract".to_string(),
        ],
        memory_bank_updated: false,
    }
}

/// Compare the change set with a validated contract. Pure; never touches disk.
///
/// `has_route_contract` enables the route cross-check; it should be true when
/// the memory bank's routes table lists at least one route.
pub fn assess(
    terms: &ContractTerms,
    req: &ReviewRequest<'_>,
    has_route_contract: bool,
    config: &ReviewConfig,
) -> ComplianceReport {
    let approved: HashSet<&str> = terms.approved_files.iter().map(String::as_str).collect();
    let forbidden: HashSet<&str> = terms.forbidden_files.iter().map(String::as_str).collect();
    let allowed_new: HashSet<&str> = terms.allowed_new_files.iter().map(String::as_str).collect();

    let mut in_scope_changes = Vec::new();
    let mut violations = Vec::new();

    for file in req.changed_files {
        if approved.contains(file.as_str()) {
            in_scope_changes.push(file.clone());
        } else if forbidden.contains(file.as_str()) {
            violations.push(Violation::critical(
                ViolationKind::ForbiddenFileModified,
                file,
                format!("Modified forbidden file: {file}"),
            ));
        } else {
            violations.push(Violation::warning(
                ViolationKind::UnapprovedChange,
                file,
                format!("Modified file not in scope contract: {file}"),
            ));
        }
    }

    for file in req.added_files {
        if allowed_new.contains(file.as_str()) {
            in_scope_changes.push(format!("(new) {file}"));
        } else {
            violations.push(Violation::warning(
                ViolationKind::UnauthorizedNewFile,
                file,
                format!("Created file not pre-approved: {file}"),
            ));
        }
    }

    for file in req.deleted_files {
        violations.push(Violation::warning(
            ViolationKind::FileDeleted,
            file,
            format!("Deleted file: {file}. Verify this was intentional."),
        ));
    }

    let touched: Vec<&String> = req.changed_files.iter().chain(req.added_files).collect();

    if has_route_contract
        && !mentions_any(&terms.request_summary.to_lowercase(), ROUTE_REQUEST_WORDS)
    {
        for file in touched.iter().filter(|f| is_route_file(f)) {
            violations.push(Violation::warning(
                ViolationKind::RouteContractViolation,
                file.as_str(),
                "Route file modified/added without route-related request. Check routes.md contract.",
            ));
        }
    }

    let touched_set: HashSet<&str> = touched.iter().map(|f| f.as_str()).collect();
    let missing_changes: Vec<String> = terms
        .approved_files
        .iter()
        .filter(|f| !touched_set.contains(f.as_str()))
        .cloned()
        .collect();

    if drift_ratio(&terms.request_summary, req.summary) > config.drift_threshold {
        violations.push(Violation::warning(
            ViolationKind::ScopeDrift,
            "",
            "Implementation summary introduces many concepts not in original request. Possible scope drift.",
        ));
    }

    let has_missing = !missing_changes.is_empty();
    let total = req.changed_files.len()
        + req.added_files.len()
        + req.deleted_files.len()
        + 1
        + usize::from(has_missing);
    let failed = violations.len() + usize::from(has_missing);
    let score = compliance_score(total, failed);

    let compliant = !violations.iter().any(Violation::is_critical)
        && score >= config.compliance_threshold;

    let recommended_actions = recommended_actions(&violations, &missing_changes);
    let summary = if compliant && violations.is_empty() {
        "Implementation fully complies with scope contract.".to_string()
    } else if compliant {
        format!(
            "Implementation is mostly compliant with {} minor issue(s).",
            violations.len()
        )
    } else {
        format!(
            "Implementation has {} violation(s) against the scope contract.",
            violations.len()
        )
    };

    ComplianceReport {
        compliant,
        score,
        summary,
        in_scope_changes,
        violations,
        missing_changes,
        recommended_actions,
        memory_bank_updated: false,
    }
}

/// Route-ish by path: a routes or API or pages directory, or a page or route
/// handler file under `app/`.
pub fn is_route_file(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.contains("route")
        || lower.contains("api/")
        || lower.contains("pages/")
        || (lower.contains("app/") && APP_ROUTE_SUFFIXES.iter().any(|s| lower.ends_with(s)))
}

/// Fraction of significant summary tokens absent from the request.
pub fn drift_ratio(request: &str, summary: &str) -> f64 {
    let summary_tokens = significant_tokens(summary, DRIFT_MIN_TOKEN_LEN);
    if summary_tokens.is_empty() {
        return 0.0;
    }
    let request_tokens = token_set(request);
    let unseen = summary_tokens
        .iter()
        .filter(|t| !request_tokens.contains(*t))
        .count();
    unseen as f64 / summary_tokens.len() as f64
}

/// `round(100 * passed / total)`, clamped to `0..=100`.
fn compliance_score(total: usize, failed: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    let passed = total.saturating_sub(failed);
    (passed as f64 / total as f64 * 100.0).round().clamp(0.0, 100.0) as u32
}

fn recommended_actions(violations: &[Violation], missing_changes: &[String]) -> Vec<String> {
    let any = |kind: ViolationKind| violations.iter().any(|v| v.kind == kind);
    let mut actions = Vec::new();

    if any(ViolationKind::ForbiddenFileModified) {
        actions.push("Revert changes to forbidden files".to_string());
    }
    if any(ViolationKind::UnapprovedChange) {
        actions.push("Review unapproved file changes. Update the scope contract if justified".to_string());
    }
    if any(ViolationKind::UnauthorizedNewFile) {
        actions.push("Review new files. Remove them if not necessary".to_string());
    }
    if any(ViolationKind::RouteContractViolation) {
        actions.push("Update routes.md if new routes are intentional".to_string());
    }
    if !missing_changes.is_empty() {
        actions.push(format!(
            "Complete approved changes: {}",
            missing_changes.join(", ")
        ));
    }
    if any(ViolationKind::ScopeDrift) {
        actions.push(
            "Review implementation for scope creep. Remove additions not in the original request"
                .to_string(),
        );
    }
    if actions.is_empty() {
        actions.push("Implementation looks good. Ship it!".to_string());
    }
    actions
}
