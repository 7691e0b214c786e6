//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.vibecheck.toml` in the project root
//! 4. `~/.config/vibecheck/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants;
use crate::env::Env;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub memory: MemoryConfig,
    pub review: ReviewConfig,
}

/// Project scanner limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Wall-clock budget for one directory walk, in milliseconds.
    pub timeout_ms: u64,
    /// Deepest directory level descended into (the root is level 0).
    pub max_depth: usize,
    /// Directory names that are never descended into.
    pub skip_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_depth: 6,
            skip_dirs: [
                "node_modules",
                ".git",
                "dist",
                "build",
                ".next",
                "__pycache__",
                "venv",
                ".venv",
                ".cache",
                ".turbo",
                "coverage",
                ".output",
                ".nuxt",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl ScanConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Memory bank layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Memory bank directory, relative to the project root.
    pub dir: String,
    /// Feature-spec subdirectory, relative to the memory bank.
    pub features_dir: String,
    pub documents: DocumentNames,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            dir: constants::MEMORY_BANK_DIR.to_string(),
            features_dir: constants::FEATURES_DIR.to_string(),
            documents: DocumentNames::default(),
        }
    }
}

/// File names of the six core memory documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentNames {
    pub project_brief: String,
    pub active_context: String,
    pub tech_context: String,
    pub system_patterns: String,
    pub routes: String,
    pub progress: String,
}

impl Default for DocumentNames {
    fn default() -> Self {
        Self {
            project_brief: "projectbrief.md".to_string(),
            active_context: "activeContext.md".to_string(),
            tech_context: "techContext.md".to_string(),
            system_patterns: "systemPatterns.md".to_string(),
            routes: "routes.md".to_string(),
            progress: "progress.md".to_string(),
        }
    }
}

/// Compliance thresholds used by the diff reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Minimum score for a review to count as compliant.
    pub compliance_threshold: u32,
    /// Fraction of unseen summary words above which scope drift is reported.
    pub drift_threshold: f64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            compliance_threshold: 70,
            drift_threshold: 0.6,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, project-local config, then applies
    /// environment variable overrides.
    pub fn load(project_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: project-local config
        if let Some(root) = project_root {
            let local_path = root.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        let default_scan = ScanConfig::default();
        if other.scan.timeout_ms != default_scan.timeout_ms {
            self.scan.timeout_ms = other.scan.timeout_ms;
        }
        if other.scan.max_depth != default_scan.max_depth {
            self.scan.max_depth = other.scan.max_depth;
        }
        if other.scan.skip_dirs != default_scan.skip_dirs {
            self.scan.skip_dirs = other.scan.skip_dirs;
        }

        let default_memory = MemoryConfig::default();
        if other.memory.dir != default_memory.dir {
            self.memory.dir = other.memory.dir;
        }
        if other.memory.features_dir != default_memory.features_dir {
            self.memory.features_dir = other.memory.features_dir;
        }
        self.memory.documents.merge(other.memory.documents);

        let default_review = ReviewConfig::default();
        if other.review.compliance_threshold != default_review.compliance_threshold {
            self.review.compliance_threshold = other.review.compliance_threshold;
        }
        if other.review.drift_threshold != default_review.drift_threshold {
            self.review.drift_threshold = other.review.drift_threshold;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(timeout) = env.parsed::<u64>(constants::ENV_SCAN_TIMEOUT_MS) {
            self.scan.timeout_ms = timeout;
        }
        if let Some(depth) = env.parsed::<usize>(constants::ENV_MAX_DEPTH) {
            self.scan.max_depth = depth;
        }
        if let Ok(dir) = env.var(constants::ENV_MEMORY_DIR) {
            if !dir.trim().is_empty() {
                self.memory.dir = dir;
            }
        }
    }
}

impl DocumentNames {
    fn merge(&mut self, other: DocumentNames) {
        let defaults = DocumentNames::default();
        let pairs = [
            (&mut self.project_brief, other.project_brief, defaults.project_brief),
            (&mut self.active_context, other.active_context, defaults.active_context),
            (&mut self.tech_context, other.tech_context, defaults.tech_context),
            (&mut self.system_patterns, other.system_patterns, defaults.system_patterns),
            (&mut self.routes, other.routes, defaults.routes),
            (&mut self.progress, other.progress, defaults.progress),
        ];
        for (slot, value, default) in pairs {
            if value != default {
                *slot = value;
            }
        }
    }
}
