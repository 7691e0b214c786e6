//! Finding types: red flags raised before implementation and violations
//! raised after it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Severity level of a red flag or violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, JsonSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Worth a second look; does not block on its own.
    Warning,
    /// Blocks `passed` / `compliant`.
    Critical,
}

/// Contracts come back from callers, so accept the spellings other tools
/// commonly use instead of rejecting the whole document.
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "critical" | "error" | "high" | "severe" | "blocker" | "fatal" => Ok(Severity::Critical),
            _ => Ok(Severity::Warning),
        }
    }
}

/// Kinds of red flag raised by the pre-implementation checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RedFlagKind {
    ConfigChange,
    CiChange,
    Migration,
    UnrequestedRoute,
    UnrequestedDependency,
    TooManyNewFiles,
    RouteContractViolation,
}

/// A static, pattern-based warning about a proposed file touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RedFlag {
    #[serde(rename = "type")]
    pub kind: RedFlagKind,
    pub message: String,
    pub severity: Severity,
}

impl RedFlag {
    pub fn new(kind: RedFlagKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Kinds of violation raised by the diff reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ViolationKind {
    InvalidContract,
    ForbiddenFileModified,
    UnapprovedChange,
    UnauthorizedNewFile,
    FileDeleted,
    RouteContractViolation,
    ScopeDrift,
}

/// A post-hoc finding that an actual change deviated from the scope contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    /// The offending file, or empty for report-wide findings.
    pub file: String,
    pub message: String,
    pub severity: Severity,
}

impl Violation {
    pub fn warning(kind: ViolationKind, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn critical(kind: ViolationKind, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.into(),
            message: message.into(),
            severity: Severity::Critical,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}
