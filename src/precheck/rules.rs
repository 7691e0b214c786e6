//! Red-flag rules over proposed file paths.
//!
//! Per-file rules are independent: every rule is evaluated against every
//! file and any number may fire. Aggregate rules look at the proposal as a
//! whole.

use std::collections::HashSet;

use crate::models::{RedFlag, RedFlagKind, Severity};
use crate::text::mentions_any;

/// Words in a request that make touching route files expected.
const ROUTE_REQUEST_WORDS: &[&str] = &["route", "endpoint", "api"];
/// Words in a request that make touching a dependency manifest expected.
const DEPENDENCY_REQUEST_WORDS: &[&str] = &["install", "dependency", "package"];

const MANIFESTS: &[&str] = &[
    "package.json",
    "cargo.toml",
    "pyproject.toml",
    "requirements.txt",
    "go.mod",
];

/// More brand-new files than this raises a flag.
const MAX_NEW_FILES: usize = 3;
/// Known routes quoted in a route-contract flag.
const QUOTED_ROUTES: usize = 5;

/// One proposed file as the rules see it.
pub struct FileSubject<'a> {
    /// Path as proposed, for messages.
    pub path: &'a str,
    /// Lowercased path.
    pub lower: String,
    /// Lowercased request text.
    pub request: &'a str,
}

impl<'a> FileSubject<'a> {
    pub fn new(path: &'a str, request_lower: &'a str) -> Self {
        Self {
            path,
            lower: path.to_lowercase(),
            request: request_lower,
        }
    }

    fn basename(&self) -> &str {
        self.lower.rsplit('/').next().unwrap_or(&self.lower)
    }
}

struct FileRule {
    kind: RedFlagKind,
    severity: Severity,
    applies: fn(&FileSubject) -> bool,
    message: fn(&str) -> String,
}

const FILE_RULES: &[FileRule] = &[
    FileRule {
        kind: RedFlagKind::ConfigChange,
        severity: Severity::Warning,
        applies: touches_config,
        message: |file| format!("Modifying config file: {file}"),
    },
    FileRule {
        kind: RedFlagKind::CiChange,
        severity: Severity::Critical,
        applies: touches_ci,
        message: |file| format!("Modifying CI/deployment file: {file}"),
    },
    FileRule {
        kind: RedFlagKind::Migration,
        severity: Severity::Critical,
        applies: touches_migration,
        message: |file| format!("Creating/modifying migration: {file}"),
    },
    FileRule {
        kind: RedFlagKind::UnrequestedRoute,
        severity: Severity::Warning,
        applies: touches_unrequested_route,
        message: |file| format!("Adding/modifying route not mentioned in request: {file}"),
    },
    FileRule {
        kind: RedFlagKind::UnrequestedDependency,
        severity: Severity::Warning,
        applies: touches_unrequested_manifest,
        message: |file| format!("Modifying {file} without explicit dependency request"),
    },
];

fn touches_config(f: &FileSubject) -> bool {
    f.lower.contains("config")
        || f.lower == "package.json"
        || f.lower == "tsconfig.json"
        || f.lower.starts_with('.')
}

fn touches_ci(f: &FileSubject) -> bool {
    mentions_any(&f.lower, &[".github/", ".gitlab", "dockerfile", "docker-compose"])
}

fn touches_migration(f: &FileSubject) -> bool {
    f.lower.contains("migration")
}

fn touches_unrequested_route(f: &FileSubject) -> bool {
    (f.lower.contains("route") || f.lower.contains("api/"))
        && !mentions_any(f.request, ROUTE_REQUEST_WORDS)
}

fn touches_unrequested_manifest(f: &FileSubject) -> bool {
    MANIFESTS.contains(&f.basename()) && !mentions_any(f.request, DEPENDENCY_REQUEST_WORDS)
}

/// Flags raised by a single proposed file.
pub fn file_flags(subject: &FileSubject) -> Vec<RedFlag> {
    FILE_RULES
        .iter()
        .filter(|rule| (rule.applies)(subject))
        .map(|rule| RedFlag::new(rule.kind, rule.severity, (rule.message)(subject.path)))
        .collect()
}

/// Evaluate every rule against a proposal.
///
/// `proposed` must already be normalized to project-relative form;
/// `existing` holds the project-relative paths of the scanned files.
pub fn detect_red_flags(
    proposed: &[String],
    existing: &HashSet<&str>,
    request: &str,
    known_routes: &[String],
) -> Vec<RedFlag> {
    let request_lower = request.to_lowercase();
    let mut flags: Vec<RedFlag> = proposed
        .iter()
        .flat_map(|path| file_flags(&FileSubject::new(path, &request_lower)))
        .collect();

    let new_files = proposed
        .iter()
        .filter(|p| !existing.contains(p.as_str()))
        .count();
    if new_files > MAX_NEW_FILES {
        flags.push(RedFlag::new(
            RedFlagKind::TooManyNewFiles,
            Severity::Warning,
            format!("Creating {new_files} new files. Is this necessary?"),
        ));
    }

    flags.extend(route_contract_flags(proposed, &request_lower, known_routes));
    flags
}

/// Route files touched while the request never asked for route or page
/// work, checked only when the route contract lists at least one route.
fn route_contract_flags(
    proposed: &[String],
    request_lower: &str,
    known_routes: &[String],
) -> Vec<RedFlag> {
    if known_routes.is_empty() || mentions_any(request_lower, &["route", "endpoint", "api", "page"]) {
        return Vec::new();
    }

    let quoted = known_routes
        .iter()
        .take(QUOTED_ROUTES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    proposed
        .iter()
        .filter(|path| {
            let lower = path.to_lowercase();
            mentions_any(&lower, &["route", "api/", "pages/", "app/"])
        })
        .map(|path| {
            RedFlag::new(
                RedFlagKind::RouteContractViolation,
                Severity::Warning,
                format!(
                    "Modifying route file \"{path}\". Check the routes.md contract. Known routes: {quoted}"
                ),
            )
        })
        .collect()
}
