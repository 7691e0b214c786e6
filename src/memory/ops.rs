//! Caller-facing memory bank operations: read, update, init and feature specs.
//!
//! These return structured results instead of errors for every condition a
//! caller can trigger (missing bank, bad target). Only real I/O failures come
//! back as `Err`.

use std::path::PathBuf;

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::info;

use super::templates::{self, TemplateOptions};
use super::{CoreDocument, DocTarget, MemoryError, MemoryStore, slugify, valid_targets};
use crate::constants;

/// How an update is applied to the existing document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WriteMode {
    #[default]
    Replace,
    Append,
}

/// Per-document presence in a full read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    pub exists: bool,
    pub line_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankSummary {
    pub files: IndexMap<String, DocumentStatus>,
    pub feature_specs: Vec<String>,
}

/// Result of `memory_bank_read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    pub found: bool,
    pub file: String,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BankSummary>,
}

/// Result of `memory_bank_update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub updated: bool,
    pub message: String,
    pub file: String,
}

/// What happened to the agent instructions file during init.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRulesOutcome {
    pub created: bool,
    pub updated: bool,
    pub path: PathBuf,
}

impl AgentRulesOutcome {
    fn note(&self) -> &'static str {
        if self.created {
            " Workflow rules written to .claude/CLAUDE.md."
        } else if self.updated {
            " Workflow rules appended to existing .claude/CLAUDE.md."
        } else {
            ""
        }
    }
}

/// Result of `memory_bank_init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResult {
    pub initialized: bool,
    pub message: String,
    pub created_files: Vec<String>,
    pub path: PathBuf,
    pub agent_rules: AgentRulesOutcome,
}

impl MemoryStore {
    /// Read one document, or every core document when `target` is `"all"`.
    pub async fn read_target(&self, target: &str) -> ReadResult {
        let not_found = |content: Option<String>| ReadResult {
            found: false,
            file: target.to_string(),
            content,
            summary: None,
        };

        if !self.exists().await {
            return not_found(None);
        }
        if target == "all" {
            return self.read_all().await;
        }

        let doc = match self.target(target) {
            Ok(doc) => doc,
            Err(e) => return not_found(Some(format!("{e}, or \"all\""))),
        };

        let content = self.read(&doc).await;
        ReadResult {
            found: content.is_some(),
            file: target.to_string(),
            content,
            summary: None,
        }
    }

    async fn read_all(&self) -> ReadResult {
        let ctx = self.context().await;

        let mut files = IndexMap::new();
        let mut sections = Vec::new();
        for doc in CoreDocument::iter() {
            let name = doc.file_name(self.config()).to_string();
            let content = ctx.document(doc);
            if let Some(text) = content {
                sections.push(format!("--- {name} ---\n{text}"));
            }
            files.insert(
                name,
                DocumentStatus {
                    exists: content.is_some(),
                    line_count: content.map(|t| t.split('\n').count()).unwrap_or(0),
                },
            );
        }

        ReadResult {
            found: true,
            file: "all".to_string(),
            content: Some(sections.join("\n\n")),
            summary: Some(BankSummary {
                files,
                feature_specs: ctx.feature_specs,
            }),
        }
    }

    /// Replace or append to a document, then refresh the active-context stamp
    /// unless the active context itself was written.
    pub async fn update_target(
        &self,
        target: &str,
        content: &str,
        mode: WriteMode,
    ) -> Result<UpdateResult, MemoryError> {
        let refused = |message: String| UpdateResult {
            updated: false,
            message,
            file: target.to_string(),
        };

        if !self.exists().await {
            return Ok(refused(
                "Memory bank does not exist. Run memory_bank_init first.".to_string(),
            ));
        }

        let doc = match self.target(target) {
            Ok(DocTarget::Feature(path)) if !path.ends_with(".md") => {
                return Ok(refused(format!(
                    "Invalid file target: \"{target}\". Valid targets: {}",
                    valid_targets(self.config())
                )));
            }
            Ok(doc) => doc,
            Err(e) => return Ok(refused(e.to_string())),
        };

        match mode {
            WriteMode::Append => self.append(&doc, content).await?,
            WriteMode::Replace => self.write(&doc, content).await?,
        }

        if doc != DocTarget::Core(CoreDocument::ActiveContext) {
            self.refresh_timestamp(&templates::today()).await?;
        }

        let verb = match mode {
            WriteMode::Append => "appended to",
            WriteMode::Replace => "updated",
        };
        info!(file = target, %mode, "memory document updated");
        Ok(UpdateResult {
            updated: true,
            message: format!("Successfully {verb} {target}"),
            file: target.to_string(),
        })
    }

    /// Create the memory bank from templates. An existing bank is left alone;
    /// the agent rules are ensured either way.
    pub async fn init(&self, options: &TemplateOptions) -> Result<InitResult, MemoryError> {
        if self.exists().await {
            let agent_rules = self.ensure_agent_rules().await?;
            return Ok(InitResult {
                initialized: false,
                message: format!(
                    "Memory bank already exists at this location. Use memory_bank_update to modify files, or delete the directory to reinitialize.{}",
                    agent_rules.note()
                ),
                created_files: Vec::new(),
                path: self.bank_dir().to_path_buf(),
                agent_rules,
            });
        }

        let features = self.features_dir();
        tokio::fs::create_dir_all(&features)
            .await
            .map_err(|e| MemoryError::io(&features, e))?;

        let mut created_files = Vec::new();
        for doc in CoreDocument::iter() {
            self.write(&DocTarget::Core(doc), &templates::render(doc, options))
                .await?;
            created_files.push(doc.file_name(self.config()).to_string());
        }

        let agent_rules = self.ensure_agent_rules().await?;
        info!(path = %self.bank_dir().display(), "memory bank initialized");

        Ok(InitResult {
            initialized: true,
            message: format!(
                "Memory bank initialized with {} files. Review and fill in the placeholder sections.{}",
                created_files.len(),
                agent_rules.note()
            ),
            created_files,
            path: self.bank_dir().to_path_buf(),
            agent_rules,
        })
    }

    /// Make sure `.claude/CLAUDE.md` carries the workflow rules block.
    pub async fn ensure_agent_rules(&self) -> Result<AgentRulesOutcome, MemoryError> {
        let path = self.project_root().join(".claude").join("CLAUDE.md");
        let existing = tokio::fs::read_to_string(&path).await.ok();

        if existing
            .as_deref()
            .is_some_and(|text| text.contains(constants::AGENT_RULES_MARKER))
        {
            return Ok(AgentRulesOutcome {
                created: false,
                updated: false,
                path,
            });
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MemoryError::io(parent, e))?;
        }

        let rules = templates::agent_rules();
        let (content, created) = match existing {
            Some(text) => (format!("{}\n\n{rules}", text.trim_end()), false),
            None => (rules, true),
        };
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| MemoryError::io(&path, e))?;

        Ok(AgentRulesOutcome {
            created,
            updated: !created,
            path,
        })
    }

    /// Write a new feature spec under a unique slug of `title`.
    ///
    /// Returns the new document's path relative to the memory bank.
    pub async fn create_feature_spec(&self, title: &str, content: &str) -> Result<String, MemoryError> {
        if !self.exists().await {
            return Err(MemoryError::NotInitialized(self.bank_dir().to_path_buf()));
        }

        let mut slug = slugify(title);
        if slug.is_empty() {
            slug = "feature".to_string();
        }
        let target = self.unique_spec_target(&slug).await?;
        self.write(&target, content).await?;

        let relative = target.relative_path(self.config()).to_string();
        info!(spec = %relative, "feature spec created");
        Ok(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfig;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn store(root: &Path) -> MemoryStore {
        MemoryStore::new(root, MemoryConfig::default())
    }

    #[tokio::test]
    async fn init_creates_bank_and_rules() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let result = store
            .init(&TemplateOptions {
                project_name: Some("Demo".into()),
                ..TemplateOptions::default()
            })
            .await
            .unwrap();

        assert!(result.initialized);
        assert_eq!(result.created_files.len(), 6);
        assert!(result.agent_rules.created);
        assert!(store.features_dir().is_dir());
        assert!(result.message.contains("written to .claude/CLAUDE.md"));

        let claude = std::fs::read_to_string(dir.path().join(".claude/CLAUDE.md")).unwrap();
        assert!(claude.contains(constants::AGENT_RULES_MARKER));
    }

    #[tokio::test]
    async fn init_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.init(&TemplateOptions::default()).await.unwrap();
        let brief = DocTarget::Core(CoreDocument::ProjectBrief);
        store.write(&brief, "custom").await.unwrap();

        let again = store.init(&TemplateOptions::default()).await.unwrap();

        assert!(!again.initialized);
        assert!(again.created_files.is_empty());
        assert!(!again.agent_rules.created && !again.agent_rules.updated);
        assert_eq!(store.read(&brief).await.as_deref(), Some("custom"));
    }

    #[tokio::test]
    async fn agent_rules_append_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let claude_dir = dir.path().join(".claude");
        std::fs::create_dir_all(&claude_dir).unwrap();
        std::fs::write(claude_dir.join("CLAUDE.md"), "# Mine\n\n").unwrap();

        let outcome = store(dir.path()).ensure_agent_rules().await.unwrap();

        assert!(outcome.updated);
        assert!(!outcome.created);
        let text = std::fs::read_to_string(claude_dir.join("CLAUDE.md")).unwrap();
        assert!(text.starts_with("# Mine\n\n<!-- vibe-check-rules -->"));
    }

    #[tokio::test]
    async fn read_without_bank() {
        let dir = tempfile::tempdir().unwrap();
        let result = store(dir.path()).read_target("routes.md").await;
        assert!(!result.found);
        assert_eq!(result.content, None);
    }

    #[tokio::test]
    async fn read_single_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.init(&TemplateOptions::default()).await.unwrap();

        let routes = store.read_target("routes.md").await;
        assert!(routes.found);
        assert!(routes.content.unwrap().contains("# Route Contract"));

        let missing = store.read_target("features/none.md").await;
        assert!(!missing.found);

        let invalid = store.read_target("secrets.md").await;
        assert!(!invalid.found);
        assert!(invalid.content.unwrap().contains("invalid memory bank target"));
    }

    #[tokio::test]
    async fn read_all_summarizes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.init(&TemplateOptions::default()).await.unwrap();
        std::fs::remove_file(store.path(&DocTarget::Core(CoreDocument::Progress))).unwrap();
        store.create_feature_spec("Login", "# Login").await.unwrap();

        let result = store.read_target("all").await;

        assert!(result.found);
        let content = result.content.unwrap();
        assert!(content.starts_with("--- projectbrief.md ---\n"));
        assert!(!content.contains("--- progress.md ---"));
        let summary = result.summary.unwrap();
        assert_eq!(summary.files.len(), 6);
        assert!(!summary.files["progress.md"].exists);
        assert_eq!(summary.files["progress.md"].line_count, 0);
        assert!(summary.files["routes.md"].line_count > 1);
        assert_eq!(summary.feature_specs, vec!["login.md"]);
    }

    #[tokio::test]
    async fn update_refuses_without_bank() {
        let dir = tempfile::tempdir().unwrap();
        let result = store(dir.path())
            .update_target("routes.md", "x", WriteMode::Replace)
            .await
            .unwrap();
        assert!(!result.updated);
        assert!(result.message.contains("memory_bank_init"));
    }

    #[tokio::test]
    async fn update_rejects_bad_targets() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.init(&TemplateOptions::default()).await.unwrap();

        for target in ["notes.md", "features/../escape.md", "features/spec.txt"] {
            let result = store.update_target(target, "x", WriteMode::Replace).await.unwrap();
            assert!(!result.updated, "{target} should be refused");
        }
        assert!(!dir.path().join("memory-bank/escape.md").exists());
    }

    #[tokio::test]
    async fn update_appends_and_refreshes_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.init(&TemplateOptions::default()).await.unwrap();
        let active = DocTarget::Core(CoreDocument::ActiveContext);
        store
            .write(&active, "# Active\n\n**Last updated**: 2000-01-01\n")
            .await
            .unwrap();

        let result = store
            .update_target("progress.md", "| row |", WriteMode::Append)
            .await
            .unwrap();

        assert!(result.updated);
        assert_eq!(result.message, "Successfully appended to progress.md");
        let progress = store.read_core(CoreDocument::Progress).await.unwrap();
        assert!(progress.ends_with("|------|---------|---------------|-----------------|\n| row |\n"));
        let active_text = store.read(&active).await.unwrap();
        assert!(active_text.contains(&format!("**Last updated**: {}", templates::today())));
    }

    #[tokio::test]
    async fn update_feature_spec() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.init(&TemplateOptions::default()).await.unwrap();

        let result = store
            .update_target("features/search.md", "# Search", WriteMode::Replace)
            .await
            .unwrap();

        assert!(result.updated);
        assert_eq!(result.message, "Successfully updated features/search.md");
        assert_eq!(store.feature_specs().await, vec!["search.md"]);
    }

    #[tokio::test]
    async fn feature_specs_get_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.init(&TemplateOptions::default()).await.unwrap();

        let first = store.create_feature_spec("User Settings!", "a").await.unwrap();
        let second = store.create_feature_spec("user settings", "b").await.unwrap();

        assert_eq!(first, "features/user-settings.md");
        assert_eq!(second, "features/user-settings-1.md");
    }

    #[tokio::test]
    async fn feature_spec_requires_bank() {
        let dir = tempfile::tempdir().unwrap();
        let err = store(dir.path()).create_feature_spec("x", "y").await.unwrap_err();
        assert!(matches!(err, MemoryError::NotInitialized(_)));
    }
}
