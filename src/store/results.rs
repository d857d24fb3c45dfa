//! Results store: confirmed drafts and the analysis history.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::model::analysis::Analysis;
use crate::model::draft::Draft;
use crate::store::{read_json, write_json};

/// The two sub-collections persisted in `results.json`.
///
/// Both are append-only: records are never edited or removed by normal
/// operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Results {
    pub drafts: Vec<Draft>,
    pub analyses: Vec<Analysis>,
}

/// Owns `results.json`.
pub struct ResultsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ResultsStore {
    /// Create a store backed by `<data_dir>/results.json`.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("results.json"),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load both collections, starting empty on first use.
    pub fn load(&self) -> Result<Results> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_unlocked()
    }

    /// Append one draft. Existing records are untouched.
    pub fn append_draft(&self, draft: Draft) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut results = self.load_unlocked()?;
        debug!(email_id = %draft.email_id, "Appending draft");
        results.drafts.push(draft);
        write_json(&self.path, &results)
    }

    /// Append one analysis record. Existing records are untouched.
    pub fn append_analysis(&self, analysis: Analysis) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut results = self.load_unlocked()?;
        debug!(kind = ?analysis.kind, "Appending analysis");
        results.analyses.push(analysis);
        write_json(&self.path, &results)
    }

    fn load_unlocked(&self) -> Result<Results> {
        if !self.path.exists() {
            let results = Results::default();
            write_json(&self.path, &results)?;
            return Ok(results);
        }
        read_json(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::analysis::AnalysisKind;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn draft(id: &str) -> Draft {
        Draft {
            email_id: id.to_string(),
            subject: "Re: test".to_string(),
            body: "Thanks!".to_string(),
            metadata: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_load_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResultsStore::open(dir.path());
        let results = store.load().expect("load");
        assert!(results.drafts.is_empty());
        assert!(results.analyses.is_empty());
    }

    #[test]
    fn test_append_draft_grows_by_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResultsStore::open(dir.path());

        let before = store.load().expect("load").drafts.len();
        store.append_draft(draft("e-001")).expect("append");
        let after = store.load().expect("reload");

        assert_eq!(after.drafts.len(), before + 1);
        assert_eq!(after.drafts[0].email_id, "e-001");
    }

    #[test]
    fn test_append_never_alters_existing_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResultsStore::open(dir.path());

        store.append_draft(draft("e-001")).expect("append 1");
        store
            .append_analysis(Analysis::now(
                AnalysisKind::Chat,
                Some("e-001".to_string()),
                "q",
                serde_json::json!("a"),
            ))
            .expect("append 2");
        store.append_draft(draft("e-002")).expect("append 3");

        let results = store.load().expect("load");
        assert_eq!(results.drafts.len(), 2);
        assert_eq!(results.analyses.len(), 1);
        // First draft is byte-for-byte what we wrote
        assert_eq!(results.drafts[0].email_id, "e-001");
        assert_eq!(results.drafts[0].body, "Thanks!");
    }

    #[test]
    fn test_drafts_survive_without_source_email() {
        // Drafts reference emails weakly; nothing validates the id
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResultsStore::open(dir.path());
        store.append_draft(draft("gone-forever")).expect("append");
        let results = store.load().expect("load");
        assert_eq!(results.drafts[0].email_id, "gone-forever");
    }
}
