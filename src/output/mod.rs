//! Output renderers: terminal and JSON.

pub mod json;
pub mod terminal;

use crate::models::{ComplianceReport, PreCheckReport};

/// Trait for rendering checker reports to an output format.
pub trait OutputRenderer {
    /// Render a pre-check report to a string.
    fn render_pre_check(&self, report: &PreCheckReport) -> String;

    /// Render a diff-review report to a string.
    fn render_review(&self, report: &ComplianceReport) -> String;
}
