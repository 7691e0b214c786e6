//! Project scanner.
//!
//! Walks a project tree within a wall-clock deadline and depth limit,
//! classifies every file by its path, and reads the manifest to detect the
//! framework in use. The scan never fails: unreadable entries are skipped and
//! a walk that runs out of time returns what it has collected so far.

pub mod classify;
pub mod framework;

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::models::{FileCategory, FileInfo, ProjectSnapshot};

pub use classify::classify;
pub use framework::detect_framework;

/// Path fragments that mark a convention worth reporting, in report order.
const PATTERN_MARKERS: &[(&str, &str)] = &[
    ("middleware", "middleware"),
    ("hooks/", "custom-hooks"),
    ("store/", "state-management"),
    ("prisma/", "prisma-orm"),
    ("drizzle/", "drizzle-orm"),
];

const CI_PREFIXES: &[&str] = &[".github/", ".gitlab-ci", ".circleci/"];

/// Scans project trees with a fixed set of limits.
#[derive(Debug, Clone, Default)]
pub struct ProjectScanner {
    config: ScanConfig,
}

impl ProjectScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan `root` into a fresh snapshot.
    pub async fn scan(&self, root: &Path) -> ProjectSnapshot {
        let started = Instant::now();
        let walk_root = root.to_path_buf();
        let config = self.config.clone();

        // walkdir is synchronous, so the walk runs on the blocking pool
        let (files, truncated) =
            match tokio::task::spawn_blocking(move || walk(&walk_root, &config)).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("project walk task failed: {e}");
                    (Vec::new(), true)
                }
            };

        let package_deps = framework::read_dependencies(root).await;
        let framework = detect_framework(&package_deps);

        let has_tests = files.iter().any(|f| f.category == FileCategory::Test);
        let has_ci = files
            .iter()
            .any(|f| CI_PREFIXES.iter().any(|p| f.relative_path.starts_with(p)));

        let mut detected_patterns: Vec<String> = PATTERN_MARKERS
            .iter()
            .filter(|(marker, _)| files.iter().any(|f| f.relative_path.contains(marker)))
            .map(|(_, tag)| (*tag).to_string())
            .collect();
        if has_tests {
            detected_patterns.push("testing".to_string());
        }
        if has_ci {
            detected_patterns.push("ci-cd".to_string());
        }

        info!(
            root = %root.display(),
            files = files.len(),
            framework = framework.as_deref().unwrap_or("none"),
            truncated,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "project scan complete"
        );

        ProjectSnapshot {
            total_files: files.len(),
            files,
            framework,
            detected_patterns,
            has_tests,
            has_ci,
            package_deps,
            truncated,
        }
    }
}

/// Walk the tree, returning the collected files and whether the deadline cut
/// the walk short.
fn walk(root: &Path, config: &ScanConfig) -> (Vec<FileInfo>, bool) {
    // A timeout too large to represent means no deadline.
    let deadline = Instant::now().checked_add(config.timeout());
    let mut files = Vec::new();

    // Files sit one level below the deepest directory that may be entered.
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(config.max_depth.saturating_add(1))
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| config.skip_dirs.iter().any(|d| d == name)))
        });

    for entry in walker {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(
                collected = files.len(),
                timeout_ms = config.timeout_ms,
                "scan deadline reached, returning partial results"
            );
            return (files, true);
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!(path = %entry.path().display(), "skipping file without metadata: {e}");
                continue;
            }
        };

        let relative_path = relative_slash_path(root, entry.path());
        files.push(FileInfo {
            path: entry.path().to_path_buf(),
            category: classify(&relative_path),
            relative_path,
            size,
        });
    }

    (files, false)
}

/// `path` relative to `root`, joined with `/` on every platform.
fn relative_slash_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
