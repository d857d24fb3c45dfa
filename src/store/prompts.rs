//! Prompt store: the four editable templates driving every LLM call.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AgentError, Result};
use crate::store::{read_json, write_json};

/// The fixed set of prompt purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKey {
    Categorize,
    Extract,
    DraftReply,
    Chat,
}

impl PromptKey {
    /// All keys, in display order.
    pub const ALL: [PromptKey; 4] = [
        PromptKey::Categorize,
        PromptKey::Extract,
        PromptKey::DraftReply,
        PromptKey::Chat,
    ];

    /// The key as stored in `prompts.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKey::Categorize => "categorize",
            PromptKey::Extract => "extract",
            PromptKey::DraftReply => "draft-reply",
            PromptKey::Chat => "chat",
        }
    }
}

impl fmt::Display for PromptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptKey {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "categorize" => Ok(PromptKey::Categorize),
            "extract" => Ok(PromptKey::Extract),
            "draft-reply" => Ok(PromptKey::DraftReply),
            "chat" => Ok(PromptKey::Chat),
            other => Err(AgentError::UnknownPromptKey(other.to_string())),
        }
    }
}

/// The template set. One field per key, so all four keys always exist;
/// serde's container-level default merges built-in templates into any
/// partial file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub categorize: String,
    pub extract: String,
    #[serde(rename = "draft-reply")]
    pub draft_reply: String,
    pub chat: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            categorize: "Categorize this email as exactly one of: Important, Newsletter, \
                         Spam, To-Do. Respond with only the label and nothing else.\n\n\
                         From: {{sender}}\nSubject: {{subject}}\n\n{{body}}"
                .to_string(),
            extract: "Extract the action items from this email as a numbered list, one \
                      item per line. If there are none, respond with an empty line.\n\n\
                      Category: {{category}}\nFrom: {{sender}}\nSubject: {{subject}}\n\n\
                      {{body}}"
                .to_string(),
            draft_reply: "Draft a polite, concise reply to this email. Address the \
                          sender, mention the key points, and propose next steps. Keep \
                          it under 180 words.\n\nFrom: {{sender}}\nSubject: {{subject}}\n\n\
                          {{body}}\n\nTHREAD CONTEXT:\n{{thread_context}}"
                .to_string(),
            chat: "You are an assistant that answers the user's question based strictly \
                   on the email content. Be concise.\n\nEMAIL CONTENT:\nFrom: {{sender}}\n\
                   Subject: {{subject}}\n\n{{body}}\n\nUSER QUESTION:\n{{question}}"
                .to_string(),
        }
    }
}

impl Prompts {
    /// The template for a purpose.
    pub fn get(&self, key: PromptKey) -> &str {
        match key {
            PromptKey::Categorize => &self.categorize,
            PromptKey::Extract => &self.extract,
            PromptKey::DraftReply => &self.draft_reply,
            PromptKey::Chat => &self.chat,
        }
    }

    /// Replace the template for a purpose.
    pub fn set(&mut self, key: PromptKey, text: impl Into<String>) {
        let text = text.into();
        match key {
            PromptKey::Categorize => self.categorize = text,
            PromptKey::Extract => self.extract = text,
            PromptKey::DraftReply => self.draft_reply = text,
            PromptKey::Chat => self.chat = text,
        }
    }
}

/// Owns `prompts.json`, the key→template mapping.
pub struct PromptStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl PromptStore {
    /// Create a store backed by `<data_dir>/prompts.json`.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("prompts.json"),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the templates, seeding the defaults on first use.
    pub fn load(&self) -> Result<Prompts> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_unlocked()
    }

    /// Replace exactly one template and persist.
    pub fn set(&self, key: PromptKey, text: impl Into<String>) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut prompts = self.load_unlocked()?;
        prompts.set(key, text);
        write_json(&self.path, &prompts)
    }

    fn load_unlocked(&self) -> Result<Prompts> {
        if !self.path.exists() {
            let prompts = Prompts::default();
            write_json(&self.path, &prompts)?;
            info!(path = %self.path.display(), "Seeded default prompts");
            return Ok(prompts);
        }
        read_json(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roundtrip() {
        for key in PromptKey::ALL {
            assert_eq!(PromptKey::from_str(key.as_str()).expect("parse"), key);
        }
        assert!(PromptKey::from_str("summarize").is_err());
    }

    #[test]
    fn test_first_load_seeds_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PromptStore::open(dir.path());
        let prompts = store.load().expect("load");
        assert!(prompts.categorize.contains("Important"));
        assert!(prompts.chat.contains("{{question}}"));
        assert!(prompts.draft_reply.contains("{{thread_context}}"));
        assert!(store.path().exists());
    }

    #[test]
    fn test_set_replaces_single_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PromptStore::open(dir.path());
        let before = store.load().expect("load");

        store
            .set(PromptKey::Chat, "Answer briefly: {{question}}")
            .expect("set");

        let after = store.load().expect("reload");
        assert_eq!(after.chat, "Answer briefly: {{question}}");
        // The other three keys are untouched
        assert_eq!(after.categorize, before.categorize);
        assert_eq!(after.extract, before.extract);
        assert_eq!(after.draft_reply, before.draft_reply);
    }

    #[test]
    fn test_partial_file_merges_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PromptStore::open(dir.path());
        std::fs::write(store.path(), r#"{ "chat": "custom chat prompt" }"#).expect("write");

        let prompts = store.load().expect("load");
        assert_eq!(prompts.chat, "custom chat prompt");
        // Missing keys fall back to the built-in templates
        assert_eq!(prompts.categorize, Prompts::default().categorize);
    }

    #[test]
    fn test_stored_keys_use_kebab_case() {
        let json = serde_json::to_value(Prompts::default()).expect("to_value");
        let obj = json.as_object().expect("object");
        assert!(obj.contains_key("draft-reply"));
        assert_eq!(obj.len(), 4);
    }
}
