//! Append-only history of agent operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of operation produced an [`Analysis`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    Categorize,
    Extract,
    Chat,
    PipelineRun,
}

/// One audit record of a categorize, extract, chat or pipeline-run
/// operation. Never edited or removed by normal operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Which operation this records.
    pub kind: AnalysisKind,

    /// Id of the email the operation ran against, if any
    /// (weak reference, like [`Draft::email_id`](crate::model::draft::Draft)).
    #[serde(default)]
    pub email_id: Option<String>,

    /// Short summary of what was sent (question text, subject line, …).
    pub input: String,

    /// What came back: the parsed structure where parsing succeeded,
    /// otherwise the raw provider text.
    pub output: serde_json::Value,

    /// When the operation ran.
    pub created_at: DateTime<Utc>,
}

impl Analysis {
    /// Build a record stamped with the current time.
    pub fn now(
        kind: AnalysisKind,
        email_id: Option<String>,
        input: impl Into<String>,
        output: serde_json::Value,
    ) -> Self {
        Self {
            kind,
            email_id,
            input: input.into(),
            output,
            created_at: Utc::now(),
        }
    }
}
