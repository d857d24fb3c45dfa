//! Saved reply drafts.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reply the user confirmed after reviewing the generated text.
///
/// Drafts reference their source email by id only, so they survive the
/// email later disappearing from the inbox. Immutable once created; the
/// results store only ever appends them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    /// Id of the email this reply was drafted for (weak reference).
    pub email_id: String,

    /// Subject of the draft, usually `Re: <original subject>`.
    pub subject: String,

    /// The reply text as confirmed by the user.
    pub body: String,

    /// Free-form context captured at confirmation time (category,
    /// action items, model name, …).
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,

    /// When the draft was confirmed.
    pub created_at: DateTime<Utc>,
}
