//! The agent facade: single-email actions over the stores and the gateway.
//!
//! This is the surface the CLI (or any other interaction layer) calls.
//! Every categorize, extract and chat invocation appends exactly one
//! analysis record; drafting only writes once the caller confirms.

use serde_json::json;
use tracing::info;

use crate::error::{AgentError, Result};
use crate::gateway::LlmGateway;
use crate::model::analysis::{Analysis, AnalysisKind};
use crate::model::draft::Draft;
use crate::model::email::{Category, Email};
use crate::parse::{parse_action_items, parse_category, ParseOutcome};
use crate::pipeline::{self, RunReport};
use crate::render;
use crate::store::inbox::InboxStore;
use crate::store::prompts::{PromptKey, PromptStore, Prompts};
use crate::store::results::{Results, ResultsStore};

/// Owns the three stores plus a gateway and exposes the agent operations.
pub struct Agent<'a> {
    inbox: InboxStore,
    prompts: PromptStore,
    results: ResultsStore,
    gateway: &'a dyn LlmGateway,
}

impl<'a> Agent<'a> {
    /// Build an agent over the stores in `data_dir`.
    pub fn new(data_dir: impl AsRef<std::path::Path>, gateway: &'a dyn LlmGateway) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            inbox: InboxStore::open(data_dir),
            prompts: PromptStore::open(data_dir),
            results: ResultsStore::open(data_dir),
            gateway,
        }
    }

    // ── Store access ────────────────────────────────────────────

    /// All inbox emails, in order.
    pub fn load_inbox(&self) -> Result<Vec<Email>> {
        self.inbox.load()
    }

    /// Replace the whole inbox.
    pub fn save_inbox(&self, emails: &[Email]) -> Result<()> {
        self.inbox.save(emails)
    }

    /// One email by id.
    pub fn get_email(&self, id: &str) -> Result<Email> {
        self.inbox.get(id)
    }

    /// The current template set.
    pub fn get_prompts(&self) -> Result<Prompts> {
        self.prompts.load()
    }

    /// Replace one template. `key` is the stored form
    /// (`categorize`, `extract`, `draft-reply`, `chat`).
    pub fn set_prompt(&self, key: &str, text: &str) -> Result<()> {
        let key: PromptKey = key.parse()?;
        self.prompts.set(key, text)
    }

    /// Both results sub-collections.
    pub fn load_results(&self) -> Result<Results> {
        self.results.load()
    }

    // ── Batch ───────────────────────────────────────────────────

    /// Categorize + extract for every email in the inbox.
    pub fn run_pipeline(&self, progress: Option<&dyn Fn(u64, u64)>) -> Result<RunReport> {
        let prompts = self.prompts.load()?;
        pipeline::run(&self.inbox, &prompts, &self.results, self.gateway, progress)
    }

    // ── Single-email actions ────────────────────────────────────

    /// Categorize one email and persist the result. An unrecognized
    /// response leaves the category unset; the raw text goes into the
    /// analysis record either way. The priority flag is derived from the
    /// new category on every write.
    pub fn categorize_one(&self, id: &str) -> Result<Email> {
        let email = self.inbox.get(id)?;
        let prompts = self.prompts.load()?;

        let prompt = render::render(prompts.get(PromptKey::Categorize), &email);
        let response = self.gateway.generate(&prompt)?;

        let (category, output) = match parse_category(&response) {
            ParseOutcome::Parsed(c) => (Some(c), json!({ "category": c.label() })),
            ParseOutcome::Raw(raw) => (None, json!({ "category": null, "raw": raw })),
        };

        let priority = category == Some(Category::Important);
        let updated = self.inbox.update(id, |e| {
            e.category = category;
            e.priority = priority;
        })?;
        self.results.append_analysis(Analysis::now(
            AnalysisKind::Categorize,
            Some(id.to_string()),
            email.subject.clone(),
            output,
        ))?;

        info!(id = %id, category = updated.category_label(), "Categorized email");
        Ok(updated)
    }

    /// Extract action items for one email and persist the result.
    pub fn extract_one(&self, id: &str) -> Result<Email> {
        let email = self.inbox.get(id)?;
        let prompts = self.prompts.load()?;

        let prompt = render::render(prompts.get(PromptKey::Extract), &email);
        let response = self.gateway.generate(&prompt)?;
        let items = parse_action_items(&response);

        let updated = self.inbox.update(id, |e| e.action_items = items.clone())?;
        self.results.append_analysis(Analysis::now(
            AnalysisKind::Extract,
            Some(id.to_string()),
            email.subject.clone(),
            json!({ "action_items": items }),
        ))?;

        info!(id = %id, count = updated.action_items.len(), "Extracted action items");
        Ok(updated)
    }

    /// Generate a reply draft for one email. Other inbox messages in the
    /// same thread are gathered as context. Nothing is persisted — the
    /// text is returned for the user to review and possibly edit.
    pub fn draft_reply(&self, id: &str) -> Result<String> {
        let emails = self.inbox.load()?;
        let email = emails
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| AgentError::EmailNotFound(id.to_string()))?;
        let prompts = self.prompts.load()?;

        let context = thread_context(&emails, &email);
        let prompt = render::render_draft(prompts.get(PromptKey::DraftReply), &email, &context);
        let response = self.gateway.generate(&prompt)?;
        Ok(response.trim().to_string())
    }

    /// Save a reviewed draft into the results store.
    pub fn confirm_draft(&self, id: &str, text: &str) -> Result<Draft> {
        let email = self.inbox.get(id)?;

        let mut metadata = std::collections::BTreeMap::new();
        metadata.insert(
            "category".to_string(),
            json!(email.category.map(|c| c.label())),
        );
        metadata.insert("action_items".to_string(), json!(email.action_items));

        let draft = Draft {
            email_id: email.id.clone(),
            subject: format!("Re: {}", email.subject),
            body: text.to_string(),
            metadata,
            created_at: chrono::Utc::now(),
        };

        self.results.append_draft(draft.clone())?;
        info!(id = %id, "Draft saved");
        Ok(draft)
    }

    /// Answer a free-text question about one email. The exchange is logged;
    /// the email record is never mutated.
    pub fn chat(&self, id: &str, question: &str) -> Result<String> {
        let email = self.inbox.get(id)?;
        let prompts = self.prompts.load()?;

        let prompt = render::render_chat(prompts.get(PromptKey::Chat), &email, question);
        let answer = self.gateway.generate(&prompt)?;

        self.results.append_analysis(Analysis::now(
            AnalysisKind::Chat,
            Some(id.to_string()),
            question.to_string(),
            json!({ "answer": answer }),
        ))?;

        Ok(answer)
    }

    /// Mark one email as archived.
    pub fn archive(&self, id: &str) -> Result<Email> {
        let updated = self.inbox.update(id, |e| e.archived = true)?;
        info!(id = %id, "Archived email");
        Ok(updated)
    }
}

/// Collect the bodies of other inbox messages in the same thread,
/// formatted for inclusion in a drafting prompt. Returns an empty
/// string when the email has no thread id or no siblings.
fn thread_context(emails: &[Email], email: &Email) -> String {
    let Some(thread_id) = email.thread_id.as_deref() else {
        return String::new();
    };
    emails
        .iter()
        .filter(|e| e.id != email.id && e.thread_id.as_deref() == Some(thread_id))
        .map(|e| {
            format!(
                "FROM: {}\nDATE: {}\n{}\n---",
                e.from,
                e.date.format("%Y-%m-%d"),
                e.body
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
