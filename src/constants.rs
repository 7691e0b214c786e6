//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and on-disk layout names so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "vibecheck";

/// Crate version, as declared in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Target triple the binary was compiled for (set by `build.rs`).
pub const TARGET: &str = env!("TARGET");

/// Local config filename (e.g. `.vibecheck.toml` in the project root).
pub const CONFIG_FILENAME: &str = ".vibecheck.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "vibecheck";

/// Default memory bank directory, relative to the project root.
pub const MEMORY_BANK_DIR: &str = "memory-bank";

/// Default feature-spec subdirectory inside the memory bank.
pub const FEATURES_DIR: &str = "features";

/// Marker guarding the workflow rules block in `.claude/CLAUDE.md`.
pub const AGENT_RULES_MARKER: &str = "<!-- vibe-check-rules -->";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_LOG: &str = "VIBECHECK_LOG";
pub const ENV_SCAN_TIMEOUT_MS: &str = "VIBECHECK_SCAN_TIMEOUT_MS";
pub const ENV_MAX_DEPTH: &str = "VIBECHECK_MAX_DEPTH";
pub const ENV_MEMORY_DIR: &str = "VIBECHECK_MEMORY_DIR";
