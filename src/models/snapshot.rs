//! Project scan types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Semantic category of a file, derived from its path alone.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileCategory {
    Route,
    Test,
    Config,
    Entry,
    Component,
    Utility,
    Style,
    Migration,
    Type,
    Other,
}

impl FileCategory {
    /// Existing files in these categories need explicit justification to edit.
    pub fn is_guarded(self) -> bool {
        matches!(self, FileCategory::Config | FileCategory::Migration)
    }
}

/// One scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub path: PathBuf,
    /// Path relative to the project root, `/`-separated.
    pub relative_path: String,
    pub size: u64,
    pub category: FileCategory,
}

/// Result of one project scan. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub files: Vec<FileInfo>,
    pub total_files: usize,
    pub framework: Option<String>,
    pub detected_patterns: Vec<String>,
    pub has_tests: bool,
    #[serde(rename = "hasCI")]
    pub has_ci: bool,
    pub package_deps: Vec<String>,
    /// True when the walk hit its deadline and returned early.
    pub truncated: bool,
}

impl ProjectSnapshot {
    /// Look up a scanned file by its project-relative path.
    pub fn find(&self, relative_path: &str) -> Option<&FileInfo> {
        self.files.iter().find(|f| f.relative_path == relative_path)
    }

    /// Count of files per category.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for file in &self.files {
            *counts.entry(file.category.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// The compact form embedded in a scope contract.
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            total_files: self.total_files,
            framework: self.framework.clone(),
            detected_patterns: self.detected_patterns.clone(),
            has_tests: self.has_tests,
            file_categories: self.category_counts(),
        }
    }
}

/// Snapshot summary carried inside a scope contract for the reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotSummary {
    pub total_files: usize,
    pub framework: Option<String>,
    pub detected_patterns: Vec<String>,
    pub has_tests: bool,
    pub file_categories: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(rel: &str, category: FileCategory) -> FileInfo {
        FileInfo {
            path: PathBuf::from("/p").join(rel),
            relative_path: rel.to_string(),
            size: 1,
            category,
        }
    }

    #[test]
    fn category_round_trips_through_strings() {
        assert_eq!(FileCategory::Migration.to_string(), "migration");
        assert_eq!("route".parse::<FileCategory>().unwrap(), FileCategory::Route);
    }

    #[test]
    fn guarded_categories() {
        assert!(FileCategory::Config.is_guarded());
        assert!(FileCategory::Migration.is_guarded());
        assert!(!FileCategory::Route.is_guarded());
    }

    #[test]
    fn summary_counts_categories() {
        let snapshot = ProjectSnapshot {
            files: vec![
                file("src/a.ts", FileCategory::Other),
                file("src/b.ts", FileCategory::Other),
                file("package.json", FileCategory::Config),
            ],
            total_files: 3,
            ..ProjectSnapshot::default()
        };
        let summary = snapshot.summary();
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.file_categories["other"], 2);
        assert_eq!(summary.file_categories["config"], 1);
        assert!(snapshot.find("src/b.ts").is_some());
        assert!(snapshot.find("src/c.ts").is_none());
    }
}
