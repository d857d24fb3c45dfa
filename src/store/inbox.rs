//! Inbox store: the ordered collection of email records.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{TimeZone, Utc};
use tracing::info;

use crate::error::{AgentError, Result};
use crate::model::email::Email;
use crate::store::{read_json, write_json};

/// Owns `inbox.json`: an ordered sequence of [`Email`] records.
///
/// The first-ever load (no file yet) seeds a small sample inbox so the
/// tool is demoable out of the box. A file that exists but cannot be read
/// back is an error — it is never silently replaced.
pub struct InboxStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl InboxStore {
    /// Create a store backed by `<data_dir>/inbox.json`.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("inbox.json"),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all emails, seeding the sample inbox on first use.
    pub fn load(&self) -> Result<Vec<Email>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_unlocked()
    }

    /// Replace the whole collection.
    pub fn save(&self, emails: &[Email]) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        write_json(&self.path, &emails)
    }

    /// Fetch one email by id.
    pub fn get(&self, id: &str) -> Result<Email> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let emails = self.load_unlocked()?;
        emails
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AgentError::EmailNotFound(id.to_string()))
    }

    /// Apply a whole-record update to one email and persist immediately.
    ///
    /// The read, the mutation and the write all happen under the store
    /// lock, so concurrent updates serialize (last write wins).
    pub fn update<F>(&self, id: &str, f: F) -> Result<Email>
    where
        F: FnOnce(&mut Email),
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut emails = self.load_unlocked()?;
        let email = emails
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AgentError::EmailNotFound(id.to_string()))?;
        f(email);
        let updated = email.clone();
        write_json(&self.path, &emails)?;
        Ok(updated)
    }

    fn load_unlocked(&self) -> Result<Vec<Email>> {
        if !self.path.exists() {
            let sample = sample_inbox();
            write_json(&self.path, &sample)?;
            info!(path = %self.path.display(), count = sample.len(), "Seeded sample inbox");
            return Ok(sample);
        }
        read_json(&self.path)
    }
}

/// The built-in demo inbox, written on first use.
pub fn sample_inbox() -> Vec<Email> {
    let date = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).single().unwrap_or_default();

    vec![
        Email {
            id: "e-001".to_string(),
            from: "alice@company.com".to_string(),
            to: "you@company.com".to_string(),
            subject: "Request: Q2 marketing budget approval".to_string(),
            body: "Hi,\n\nCan you approve the Q2 marketing budget? We need a decision by \
                   Friday. Attached are the numbers.\n\nThanks,\nAlice"
                .to_string(),
            date: date(2025, 9, 1),
            thread_id: None,
            category: None,
            action_items: Vec::new(),
            priority: false,
            archived: false,
        },
        Email {
            id: "e-002".to_string(),
            from: "bob@startup.com".to_string(),
            to: "you@company.com".to_string(),
            subject: "Meeting: Product sync (tomorrow)".to_string(),
            body: "Hello,\n\nCan we meet tomorrow at 10am to sync on the product roadmap? \
                   Please confirm or propose another time.\n\nRegards,\nBob"
                .to_string(),
            date: date(2025, 10, 20),
            thread_id: None,
            category: None,
            action_items: Vec::new(),
            priority: false,
            archived: false,
        },
        Email {
            id: "e-003".to_string(),
            from: "carol@vendor.com".to_string(),
            to: "you@company.com".to_string(),
            subject: "Invoice INV-2025-017 (overdue)".to_string(),
            body: "Dear team,\n\nInvoice INV-2025-017 is overdue by 10 days. Please arrange \
                   payment or contact us.\n\nBest,\nCarol"
                .to_string(),
            date: date(2025, 10, 15),
            thread_id: None,
            category: None,
            action_items: Vec::new(),
            priority: false,
            archived: false,
        },
        Email {
            id: "e-004".to_string(),
            from: "dave@partner.org".to_string(),
            to: "you@company.com".to_string(),
            subject: "Collaboration opportunity - quick chat?".to_string(),
            body: "Hi,\n\nWe have a potential collaboration. Interested in a 20-min call \
                   next week?\n\nThanks,\nDave"
                .to_string(),
            date: date(2025, 10, 1),
            thread_id: None,
            category: None,
            action_items: Vec::new(),
            priority: false,
            archived: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::email::Category;

    #[test]
    fn test_first_load_seeds_sample_inbox() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InboxStore::open(dir.path());
        let emails = store.load().expect("load");
        assert_eq!(emails.len(), 4);
        assert_eq!(emails[0].id, "e-001");
        assert!(store.path().exists());
    }

    #[test]
    fn test_load_after_seed_is_stable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InboxStore::open(dir.path());
        let first = store.load().expect("first load");
        let second = store.load().expect("second load");
        assert_eq!(first.len(), second.len());
        assert_eq!(first[2].subject, second[2].subject);
    }

    #[test]
    fn test_update_persists_whole_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InboxStore::open(dir.path());
        store.load().expect("seed");

        let updated = store
            .update("e-002", |e| {
                e.category = Some(Category::Important);
                e.action_items = vec!["Confirm meeting".to_string()];
            })
            .expect("update");
        assert_eq!(updated.category, Some(Category::Important));

        let reloaded = store.get("e-002").expect("get");
        assert_eq!(reloaded.category, Some(Category::Important));
        assert_eq!(reloaded.action_items, vec!["Confirm meeting"]);
    }

    #[test]
    fn test_update_unknown_id_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InboxStore::open(dir.path());
        store.load().expect("seed");
        let err = store.update("nope", |_| {}).unwrap_err();
        assert!(matches!(err, AgentError::EmailNotFound(_)));
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InboxStore::open(dir.path());
        std::fs::write(store.path(), "{not json").expect("write garbage");
        let err = store.load().unwrap_err();
        assert!(matches!(err, AgentError::Storage { .. }));
    }
}
