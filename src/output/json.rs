//! JSON output renderer.
//!
//! Emits the reports in the same camelCase shape the tool-invocation layer
//! returns, so a pre-check's output can be fed straight back to diff-review.

use serde::Serialize;

use crate::models::{ComplianceReport, PreCheckReport};
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

impl OutputRenderer for JsonRenderer {
    fn render_pre_check(&self, report: &PreCheckReport) -> String {
        pretty(report)
    }

    fn render_review(&self, report: &ComplianceReport) -> String {
        pretty(report)
    }
}
