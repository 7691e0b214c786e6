//! Pre-implementation checker.
//!
//! Scans the project, reads the memory bank, partitions the proposed files
//! into approved, forbidden and new, raises red flags, runs the plan-quality
//! checks when a plan is given, and folds everything into a scored
//! [`PreCheckReport`] whose contract section is later handed to the reviewer.

pub mod checks;
pub mod rules;

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexSet;
use tracing::info;

use crate::config::Config;
use crate::memory::{MemoryBankContext, MemoryStore};
use crate::models::{
    CheckResult, ComplexityRating, MemoryBankSummary, PreCheckReport, ProjectSnapshot, RedFlag,
    ScopeContract,
};
use crate::scanner::ProjectScanner;
use crate::text::truncate_chars;

use checks::{PlanInput, run_checks};
use rules::detect_red_flags;

/// Characters of each memory document quoted in the report.
const MEMORY_EXCERPT_CHARS: usize = 500;
/// Points deducted from the file score per red flag.
const RED_FLAG_PENALTY: u32 = 15;
const FILE_SCORE_WEIGHT: f64 = 0.4;
const CHECK_SCORE_WEIGHT: f64 = 0.6;

/// Inputs to a pre-check.
#[derive(Debug, Clone)]
pub struct PreCheckRequest<'a> {
    /// The caller's original request.
    pub request: &'a str,
    pub project_root: &'a Path,
    /// Files the agent plans to touch, relative or absolute.
    pub proposed_files: &'a [String],
    /// Free-text description of the planned change.
    pub proposed_changes: Option<&'a str>,
}

/// Run a pre-check against the project on disk.
pub async fn pre_check(req: &PreCheckRequest<'_>, config: &Config) -> PreCheckReport {
    let scanner = ProjectScanner::new(config.scan.clone());
    let store = MemoryStore::new(req.project_root, config.memory.clone());

    let (snapshot, memory) = tokio::join!(scanner.scan(req.project_root), store.context());
    let report = evaluate(req, &snapshot, &memory);

    info!(
        score = report.score,
        passed = report.passed,
        red_flags = report.contract.red_flags.len(),
        checks = report.checks.len(),
        "pre-check complete"
    );
    report
}

/// Build the report from an existing snapshot and memory context.
pub fn evaluate(
    req: &PreCheckRequest<'_>,
    snapshot: &ProjectSnapshot,
    memory: &MemoryBankContext,
) -> PreCheckReport {
    let proposed = normalize_paths(req.proposed_files, req.project_root);
    let known_routes: Vec<String> = memory.known_routes().iter().map(|r| r.label()).collect();

    let existing: HashSet<&str> = snapshot
        .files
        .iter()
        .map(|f| f.relative_path.as_str())
        .collect();

    let mut approved_files = Vec::new();
    let mut forbidden_files = Vec::new();
    let mut allowed_new_files = Vec::new();
    for file in &proposed {
        match snapshot.find(file) {
            Some(info) if info.category.is_guarded() => forbidden_files.push(file.clone()),
            Some(_) => approved_files.push(file.clone()),
            None => allowed_new_files.push(file.clone()),
        }
    }

    let red_flags = detect_red_flags(&proposed, &existing, req.request, &known_routes);

    let checks = match req.proposed_changes {
        Some(plan) if !plan.trim().is_empty() => run_checks(&PlanInput {
            request: req.request,
            plan,
            has_tests: snapshot.has_tests,
            framework: snapshot.framework.as_deref(),
            system_patterns: memory.system_patterns.as_deref(),
            active_context: memory.active_context.as_deref(),
        }),
        _ => Vec::new(),
    };

    let score = score(proposed.len(), &red_flags, &checks);
    let has_critical = red_flags.iter().any(RedFlag::is_critical);
    let passed = !has_critical && checks.iter().all(|c| c.passed);
    let recommendation = recommendation(passed, score, &red_flags, &checks);

    PreCheckReport {
        contract: ScopeContract {
            request_summary: req.request.to_string(),
            approved_files,
            forbidden_files,
            allowed_new_files,
            complexity_rating: ComplexityRating::from_file_count(proposed.len()),
            red_flags,
            project_snapshot: snapshot.summary(),
        },
        checks,
        score,
        passed,
        recommendation,
        memory_bank: memory_summary(memory, known_routes),
    }
}

/// Project-relative, `/`-separated, deduplicated in first-seen order.
pub fn normalize_paths(files: &[String], project_root: &Path) -> Vec<String> {
    let root = project_root.to_string_lossy().replace('\\', "/");
    let root = root.trim_end_matches('/');

    let normalized: IndexSet<String> = files
        .iter()
        .map(|file| {
            let mut path = file.trim().replace('\\', "/");
            if !root.is_empty() {
                if let Some(rest) = path.strip_prefix(root) {
                    if rest.starts_with('/') {
                        path = rest.trim_start_matches('/').to_string();
                    }
                }
            }
            while let Some(rest) = path.strip_prefix("./") {
                path = rest.to_string();
            }
            path
        })
        .filter(|path| !path.is_empty())
        .collect();

    normalized.into_iter().collect()
}

fn file_score(red_flags: &[RedFlag]) -> u32 {
    let penalty = RED_FLAG_PENALTY.saturating_mul(red_flags.len() as u32);
    100u32.saturating_sub(penalty)
}

fn check_score(checks: &[CheckResult]) -> u32 {
    let passed = checks.iter().filter(|c| c.passed).count();
    (passed as f64 / checks.len() as f64 * 100.0).round() as u32
}

/// Weighted file and plan score, in `0..=100`.
fn score(proposed_count: usize, red_flags: &[RedFlag], checks: &[CheckResult]) -> u32 {
    let score = match (proposed_count > 0, checks.is_empty()) {
        (true, false) => {
            let combined = file_score(red_flags) as f64 * FILE_SCORE_WEIGHT
                + check_score(checks) as f64 * CHECK_SCORE_WEIGHT;
            combined.round() as u32
        }
        (false, false) => check_score(checks),
        (_, true) => file_score(red_flags),
    };
    score.min(100)
}

fn recommendation(passed: bool, score: u32, red_flags: &[RedFlag], checks: &[CheckResult]) -> String {
    if passed && score >= 90 {
        return "Proceed with implementation.".to_string();
    }
    if passed {
        let messages: Vec<&str> = red_flags.iter().map(|f| f.message.as_str()).collect();
        return format!(
            "Minor concerns noted. Review red flags before proceeding: {}",
            messages.join("; ")
        );
    }

    let issues: Vec<&str> = red_flags
        .iter()
        .filter(|f| f.is_critical())
        .map(|f| f.message.as_str())
        .chain(checks.iter().filter(|c| !c.passed).map(|c| c.message.as_str()))
        .collect();
    format!("Address before proceeding: {}", issues.join("; "))
}

fn memory_summary(memory: &MemoryBankContext, known_routes: Vec<String>) -> MemoryBankSummary {
    let excerpt = |text: &Option<String>| {
        text.as_deref()
            .map(|t| truncate_chars(t, MEMORY_EXCERPT_CHARS).to_string())
    };
    MemoryBankSummary {
        exists: memory.exists,
        project_brief: excerpt(&memory.project_brief),
        tech_stack: excerpt(&memory.tech_context),
        known_routes,
        active_scope: excerpt(&memory.active_context),
    }
}
