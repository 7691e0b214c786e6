//! Shared types used across all modules.
//!
//! This module defines the core data structures for scans, contracts,
//! findings and reports. Other modules import from here rather than
//! reaching into each other's internals.

pub mod contract;
pub mod finding;
pub mod report;
pub mod snapshot;

pub use contract::{ComplexityRating, ContractError, ContractTerms, ScopeContract};
pub use finding::{RedFlag, RedFlagKind, Severity, Violation, ViolationKind};
pub use report::{CheckCategory, CheckResult, ComplianceReport, MemoryBankSummary, PreCheckReport};
pub use snapshot::{FileCategory, FileInfo, ProjectSnapshot, SnapshotSummary};
