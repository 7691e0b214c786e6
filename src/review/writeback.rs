//! Recording a compliant review in the memory bank.
//!
//! Three independent writes, in order: a progress-log row, an active-context
//! bullet, and the active-context timestamp. A failure stops the sequence and
//! is reported in the returned status, never as an error; earlier writes are
//! not rolled back.

use serde::Serialize;
use strum::Display;
use tracing::{debug, warn};

use crate::memory::{CoreDocument, DocTarget, MemoryError, MemoryStore};
use crate::text::ellipsize;

/// Summary characters kept in the log entries.
const SUMMARY_CHARS: usize = 100;

/// One write in the write-back sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WriteBackStep {
    ProgressLog,
    ActiveContext,
    Timestamp,
}

/// Outcome of the memory write-back after a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum WriteBackStatus {
    /// Not compliant, no project path, or no memory bank.
    #[default]
    NotAttempted,
    Updated,
    PartialFailure {
        completed: Vec<WriteBackStep>,
        failed_step: WriteBackStep,
        error: String,
    },
}

impl WriteBackStatus {
    pub fn is_updated(&self) -> bool {
        matches!(self, WriteBackStatus::Updated)
    }
}

/// What gets recorded for one compliant review.
#[derive(Debug, Clone)]
pub struct ComplianceRecord<'a> {
    pub date: &'a str,
    pub summary: &'a str,
    /// Changed and added files.
    pub files: &'a [String],
    pub score: u32,
}

impl ComplianceRecord<'_> {
    pub fn progress_row(&self) -> String {
        format!(
            "| {} | {} | {} | {}/100 |",
            self.date,
            ellipsize(self.summary, SUMMARY_CHARS),
            self.files.join(", "),
            self.score
        )
    }

    pub fn context_bullet(&self) -> String {
        format!(
            "\n- **{}**: Completed: {} (compliance: {}/100)",
            self.date,
            ellipsize(self.summary, SUMMARY_CHARS),
            self.score
        )
    }
}

/// Run the write-back sequence against an existing memory bank.
pub async fn record_compliance(store: &MemoryStore, record: &ComplianceRecord<'_>) -> WriteBackStatus {
    if !store.exists().await {
        debug!("no memory bank, skipping write-back");
        return WriteBackStatus::NotAttempted;
    }

    let mut completed = Vec::new();
    let steps = [
        WriteBackStep::ProgressLog,
        WriteBackStep::ActiveContext,
        WriteBackStep::Timestamp,
    ];

    for step in steps {
        if let Err(e) = run_step(store, record, step).await {
            warn!(%step, "memory write-back failed: {e}");
            return WriteBackStatus::PartialFailure {
                completed,
                failed_step: step,
                error: e.to_string(),
            };
        }
        completed.push(step);
    }

    WriteBackStatus::Updated
}

async fn run_step(
    store: &MemoryStore,
    record: &ComplianceRecord<'_>,
    step: WriteBackStep,
) -> Result<(), MemoryError> {
    match step {
        WriteBackStep::ProgressLog => {
            store
                .append(&DocTarget::Core(CoreDocument::Progress), &record.progress_row())
                .await
        }
        WriteBackStep::ActiveContext => {
            store
                .append(&DocTarget::Core(CoreDocument::ActiveContext), &record.context_bullet())
                .await
        }
        WriteBackStep::Timestamp => store.refresh_timestamp(record.date).await.map(|_| ()),
    }
}
