//! File-backed project memory.
//!
//! The memory bank is a directory of markdown documents under the project
//! root: six core documents with fixed roles plus an open-ended directory of
//! feature specs. It is the only state shared between invocations; nothing
//! here is cached across calls.

pub mod ops;
pub mod routes;
pub mod slug;
pub mod templates;

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;
use tracing::debug;

use crate::config::MemoryConfig;

pub use ops::{
    AgentRulesOutcome, BankSummary, DocumentStatus, InitResult, ReadResult, UpdateResult,
    WriteMode,
};
pub use routes::{RouteEntry, parse_routes_table};
pub use slug::slugify;
pub use templates::TemplateOptions;

static LAST_UPDATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Last updated\*\*:\s*\d{4}-\d{2}-\d{2}").unwrap());

/// Errors from memory bank I/O and target resolution.
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid memory bank target \"{target}\"; valid targets: {valid}")]
    InvalidTarget { target: String, valid: String },

    #[error("memory bank does not exist at {0}")]
    NotInitialized(PathBuf),
}

impl MemoryError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        MemoryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The six documents every memory bank has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum CoreDocument {
    ProjectBrief,
    ActiveContext,
    TechContext,
    SystemPatterns,
    Routes,
    Progress,
}

impl CoreDocument {
    /// File name of this document under the given layout.
    pub fn file_name(self, config: &MemoryConfig) -> &str {
        let names = &config.documents;
        match self {
            CoreDocument::ProjectBrief => &names.project_brief,
            CoreDocument::ActiveContext => &names.active_context,
            CoreDocument::TechContext => &names.tech_context,
            CoreDocument::SystemPatterns => &names.system_patterns,
            CoreDocument::Routes => &names.routes,
            CoreDocument::Progress => &names.progress,
        }
    }

    fn from_file_name(name: &str, config: &MemoryConfig) -> Option<Self> {
        CoreDocument::iter().find(|doc| doc.file_name(config) == name)
    }
}

/// A document inside the memory bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocTarget {
    Core(CoreDocument),
    /// A feature spec, by its path relative to the memory bank
    /// (e.g. `features/login.md`).
    Feature(String),
}

impl DocTarget {
    /// Resolve a caller-supplied target name.
    ///
    /// Accepts a core document file name or `<features_dir>/<name>`. Feature
    /// names must stay inside the features directory.
    pub fn parse(raw: &str, config: &MemoryConfig) -> Result<Self, MemoryError> {
        if let Some(doc) = CoreDocument::from_file_name(raw, config) {
            return Ok(DocTarget::Core(doc));
        }

        let prefix = format!("{}/", config.features_dir);
        let invalid = || MemoryError::InvalidTarget {
            target: raw.to_string(),
            valid: valid_targets(config),
        };

        let name = raw.strip_prefix(&prefix).ok_or_else(invalid)?;
        let escapes = Path::new(name)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if name.is_empty() || escapes {
            return Err(invalid());
        }

        Ok(DocTarget::Feature(raw.to_string()))
    }

    /// Path relative to the memory bank.
    pub fn relative_path<'a>(&'a self, config: &'a MemoryConfig) -> &'a str {
        match self {
            DocTarget::Core(doc) => doc.file_name(config),
            DocTarget::Feature(path) => path,
        }
    }
}

/// Comma-separated list of accepted targets, for error messages.
pub fn valid_targets(config: &MemoryConfig) -> String {
    let mut names: Vec<String> = CoreDocument::iter()
        .map(|doc| doc.file_name(config).to_string())
        .collect();
    names.push(format!("{}/<name>.md", config.features_dir));
    names.join(", ")
}

/// Everything in the memory bank, read in one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryBankContext {
    pub exists: bool,
    pub project_brief: Option<String>,
    pub active_context: Option<String>,
    pub tech_context: Option<String>,
    pub system_patterns: Option<String>,
    pub routes: Option<String>,
    pub progress: Option<String>,
    /// File names of the `.md` documents in the features directory, sorted.
    pub feature_specs: Vec<String>,
}

impl MemoryBankContext {
    pub fn document(&self, doc: CoreDocument) -> Option<&str> {
        let text = match doc {
            CoreDocument::ProjectBrief => &self.project_brief,
            CoreDocument::ActiveContext => &self.active_context,
            CoreDocument::TechContext => &self.tech_context,
            CoreDocument::SystemPatterns => &self.system_patterns,
            CoreDocument::Routes => &self.routes,
            CoreDocument::Progress => &self.progress,
        };
        text.as_deref()
    }

    /// Rows of the route contract table, empty when there is none.
    pub fn known_routes(&self) -> Vec<RouteEntry> {
        self.routes.as_deref().map(parse_routes_table).unwrap_or_default()
    }
}

/// Document store rooted at one project's memory bank.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    project_root: PathBuf,
    bank_dir: PathBuf,
    config: MemoryConfig,
}

impl MemoryStore {
    pub fn new(project_root: &Path, config: MemoryConfig) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            bank_dir: project_root.join(&config.dir),
            config,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn bank_dir(&self) -> &Path {
        &self.bank_dir
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn features_dir(&self) -> PathBuf {
        self.bank_dir.join(&self.config.features_dir)
    }

    /// Absolute path of a document.
    pub fn path(&self, target: &DocTarget) -> PathBuf {
        self.bank_dir.join(target.relative_path(&self.config))
    }

    /// Resolve a target name against this store's layout.
    pub fn target(&self, raw: &str) -> Result<DocTarget, MemoryError> {
        DocTarget::parse(raw, &self.config)
    }

    /// True if the memory bank directory exists.
    pub async fn exists(&self) -> bool {
        tokio::fs::metadata(&self.bank_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Document text, or `None` if it is absent or unreadable.
    pub async fn read(&self, target: &DocTarget) -> Option<String> {
        let path = self.path(target);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Some(content),
            Err(e) => {
                debug!(path = %path.display(), "memory document not readable: {e}");
                None
            }
        }
    }

    pub async fn read_core(&self, doc: CoreDocument) -> Option<String> {
        self.read(&DocTarget::Core(doc)).await
    }

    /// Overwrite a document, creating parent directories as needed.
    pub async fn write(&self, target: &DocTarget, content: &str) -> Result<(), MemoryError> {
        let path = self.path(target);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MemoryError::io(parent, e))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| MemoryError::io(&path, e))?;
        debug!(path = %path.display(), bytes = content.len(), "wrote memory document");
        Ok(())
    }

    /// Append to a document on a new line, or write it if absent or empty.
    pub async fn append(&self, target: &DocTarget, content: &str) -> Result<(), MemoryError> {
        match self.read(target).await {
            Some(existing) if !existing.is_empty() => {
                let joined = format!("{}\n{content}\n", existing.trim_end());
                self.write(target, &joined).await
            }
            _ => self.write(target, content).await,
        }
    }

    /// Set the active context's `**Last updated**` stamp to `date`.
    ///
    /// Returns `false` without writing when the document is absent.
    pub async fn refresh_timestamp(&self, date: &str) -> Result<bool, MemoryError> {
        let target = DocTarget::Core(CoreDocument::ActiveContext);
        let Some(content) = self.read(&target).await else {
            return Ok(false);
        };
        let stamp = format!("**Last updated**: {date}");
        let updated = LAST_UPDATED_RE.replace(&content, regex::NoExpand(&stamp));
        self.write(&target, &updated).await?;
        Ok(true)
    }

    /// Read the six core documents concurrently, plus the feature-spec list.
    pub async fn context(&self) -> MemoryBankContext {
        if !self.exists().await {
            return MemoryBankContext::default();
        }

        let (project_brief, active_context, tech_context, system_patterns, routes, progress) = tokio::join!(
            self.read_core(CoreDocument::ProjectBrief),
            self.read_core(CoreDocument::ActiveContext),
            self.read_core(CoreDocument::TechContext),
            self.read_core(CoreDocument::SystemPatterns),
            self.read_core(CoreDocument::Routes),
            self.read_core(CoreDocument::Progress),
        );

        MemoryBankContext {
            exists: true,
            project_brief,
            active_context,
            tech_context,
            system_patterns,
            routes,
            progress,
            feature_specs: self.feature_specs().await,
        }
    }

    /// Sorted file names of the feature specs.
    pub async fn feature_specs(&self) -> Vec<String> {
        let mut specs = Vec::new();
        let Ok(mut entries) = tokio::fs::read_dir(self.features_dir()).await else {
            return specs;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".md") {
                specs.push(name);
            }
        }
        specs.sort();
        specs
    }

    /// First free `features/<slug>.md`, `features/<slug>-1.md`, ... target.
    ///
    /// Creates the features directory if needed.
    pub async fn unique_spec_target(&self, slug: &str) -> Result<DocTarget, MemoryError> {
        let dir = self.features_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| MemoryError::io(&dir, e))?;

        let mut candidate = format!("{slug}.md");
        let mut counter = 1;
        while tokio::fs::try_exists(dir.join(&candidate))
            .await
            .map_err(|e| MemoryError::io(&dir, e))?
        {
            candidate = format!("{slug}-{counter}.md");
            counter += 1;
        }

        Ok(DocTarget::Feature(format!(
            "{}/{candidate}",
            self.config.features_dir
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(root: &Path) -> MemoryStore {
        MemoryStore::new(root, MemoryConfig::default())
    }

    fn core(doc: CoreDocument) -> DocTarget {
        DocTarget::Core(doc)
    }

    #[test]
    fn parse_targets() {
        let config = MemoryConfig::default();
        assert_eq!(
            DocTarget::parse("routes.md", &config).unwrap(),
            core(CoreDocument::Routes)
        );
        assert_eq!(
            DocTarget::parse("features/login.md", &config).unwrap(),
            DocTarget::Feature("features/login.md".into())
        );
        assert!(DocTarget::parse("secrets.md", &config).is_err());
        assert!(DocTarget::parse("features/", &config).is_err());
        assert!(DocTarget::parse("features/../../etc/passwd", &config).is_err());
        assert!(DocTarget::parse("features//abs.md", &config).is_err());
    }

    #[test]
    fn parse_uses_configured_names() {
        let mut config = MemoryConfig::default();
        config.documents.routes = "api.md".into();
        assert_eq!(
            DocTarget::parse("api.md", &config).unwrap(),
            core(CoreDocument::Routes)
        );
        assert!(DocTarget::parse("routes.md", &config).is_err());
    }

    #[tokio::test]
    async fn read_write_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let progress = core(CoreDocument::Progress);

        assert!(!store.exists().await);
        assert_eq!(store.read(&progress).await, None);

        store.append(&progress, "first").await.unwrap();
        assert!(store.exists().await);
        assert_eq!(store.read(&progress).await.as_deref(), Some("first"));

        store.append(&progress, "second").await.unwrap();
        assert_eq!(store.read(&progress).await.as_deref(), Some("first\nsecond\n"));

        store.write(&progress, "reset").await.unwrap();
        assert_eq!(store.read(&progress).await.as_deref(), Some("reset"));
    }

    #[tokio::test]
    async fn context_of_missing_bank() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = store(dir.path()).context().await;
        assert_eq!(ctx, MemoryBankContext::default());
        assert!(!ctx.exists);
    }

    #[tokio::test]
    async fn context_reads_documents_and_features() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store
            .write(&core(CoreDocument::ProjectBrief), "# Brief")
            .await
            .unwrap();
        store
            .write(&core(CoreDocument::Routes), "| Route | Method | Auth | Description |\n|---|---|---|---|\n| /a | GET | no | A |\n")
            .await
            .unwrap();
        store
            .write(&DocTarget::Feature("features/b.md".into()), "b")
            .await
            .unwrap();
        store
            .write(&DocTarget::Feature("features/a.md".into()), "a")
            .await
            .unwrap();
        std::fs::write(store.features_dir().join("notes.txt"), "x").unwrap();

        let ctx = store.context().await;

        assert!(ctx.exists);
        assert_eq!(ctx.project_brief.as_deref(), Some("# Brief"));
        assert_eq!(ctx.document(CoreDocument::TechContext), None);
        assert_eq!(ctx.feature_specs, vec!["a.md", "b.md"]);
        assert_eq!(ctx.known_routes()[0].label(), "GET /a");
    }

    #[tokio::test]
    async fn refresh_timestamp_rewrites_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let active = core(CoreDocument::ActiveContext);

        assert!(!store.refresh_timestamp("2030-01-02").await.unwrap());

        store
            .write(&active, "# Active\n\n**Last updated**: 2024-05-01\n")
            .await
            .unwrap();
        assert!(store.refresh_timestamp("2030-01-02").await.unwrap());
        assert_eq!(
            store.read(&active).await.as_deref(),
            Some("# Active\n\n**Last updated**: 2030-01-02\n")
        );
    }

    #[tokio::test]
    async fn unique_spec_target_probes_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let first = store.unique_spec_target("login").await.unwrap();
        assert_eq!(first, DocTarget::Feature("features/login.md".into()));
        store.write(&first, "x").await.unwrap();

        let second = store.unique_spec_target("login").await.unwrap();
        assert_eq!(second, DocTarget::Feature("features/login-1.md".into()));
        store.write(&second, "x").await.unwrap();

        let third = store.unique_spec_target("login").await.unwrap();
        assert_eq!(third, DocTarget::Feature("features/login-2.md".into()));
    }
}
