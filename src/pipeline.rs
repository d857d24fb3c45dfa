//! The ingestion pipeline: categorize + extract for every email.
//!
//! Emails are processed strictly in inbox order, one at a time. Both LLM
//! calls for an email must succeed before anything for it is persisted; a
//! provider failure skips that email (its record on disk is untouched) and
//! the run continues with the next one.

use serde_json::json;
use tracing::{info, warn};

use crate::error::Result;
use crate::gateway::{LlmGateway, ProviderError};
use crate::model::analysis::{Analysis, AnalysisKind};
use crate::model::email::{Category, Email};
use crate::parse::{parse_action_items, parse_category, ParseOutcome};
use crate::render;
use crate::store::inbox::InboxStore;
use crate::store::prompts::{PromptKey, Prompts};
use crate::store::results::ResultsStore;

/// Outcome of a whole pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Emails the run looked at.
    pub processed: usize,
    /// Emails whose category and action items were updated.
    pub succeeded: usize,
    /// Emails skipped because a provider call failed.
    pub failed: usize,
}

/// Run categorize + extract across the entire inbox.
///
/// Each successfully processed email is persisted immediately, so a
/// failure partway through the inbox leaves earlier emails durably
/// updated. One pipeline-run analysis record is appended per email.
/// `progress` is called with `(current, total)` after each email.
pub fn run(
    inbox: &InboxStore,
    prompts: &Prompts,
    results: &ResultsStore,
    gateway: &dyn LlmGateway,
    progress: Option<&dyn Fn(u64, u64)>,
) -> Result<RunReport> {
    let emails = inbox.load()?;
    let total = emails.len() as u64;
    let mut report = RunReport::default();

    info!(count = emails.len(), "Starting pipeline run");

    for (i, email) in emails.iter().enumerate() {
        report.processed += 1;

        match process_email(email, prompts, gateway) {
            Ok(outcome) => {
                // Persist before moving on, so this email's result survives
                // a later failure.
                inbox.update(&email.id, |e| {
                    e.category = outcome.category;
                    e.action_items = outcome.action_items.clone();
                    e.priority = outcome.priority;
                })?;

                results.append_analysis(Analysis::now(
                    AnalysisKind::PipelineRun,
                    Some(email.id.clone()),
                    email.subject.clone(),
                    json!({
                        "category": outcome.category.map(|c| c.label()),
                        "category_raw": outcome.category_raw,
                        "action_items": outcome.action_items,
                        "priority": outcome.priority,
                    }),
                ))?;

                report.succeeded += 1;
            }
            Err(e) => {
                warn!(id = %email.id, error = %e, "Skipping email after provider failure");
                results.append_analysis(Analysis::now(
                    AnalysisKind::PipelineRun,
                    Some(email.id.clone()),
                    email.subject.clone(),
                    json!({ "error": e.to_string() }),
                ))?;
                report.failed += 1;
            }
        }

        if let Some(cb) = progress {
            cb(i as u64 + 1, total);
        }
    }

    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "Pipeline run finished"
    );
    Ok(report)
}

/// What the two calls produced for one email. Nothing is persisted yet.
struct EmailOutcome {
    category: Option<Category>,
    /// Raw provider text kept when the category was unrecognized.
    category_raw: Option<String>,
    action_items: Vec<String>,
    /// Important emails are flagged as priority.
    priority: bool,
}

/// Run both provider calls for one email. Any [`ProviderError`] aborts
/// the whole email so no partial update is ever written.
fn process_email(
    email: &Email,
    prompts: &Prompts,
    gateway: &dyn LlmGateway,
) -> std::result::Result<EmailOutcome, ProviderError> {
    let cat_prompt = render::render(prompts.get(PromptKey::Categorize), email);
    let cat_response = gateway.generate(&cat_prompt)?;

    let (category, category_raw) = match parse_category(&cat_response) {
        ParseOutcome::Parsed(c) => (Some(c), None),
        ParseOutcome::Raw(raw) => {
            warn!(id = %email.id, "Unrecognized category, leaving unset");
            (None, Some(raw))
        }
    };

    // Extract sees the category this run just decided on.
    let mut staged = email.clone();
    staged.category = category;

    let act_prompt = render::render(prompts.get(PromptKey::Extract), &staged);
    let act_response = gateway.generate(&act_prompt)?;
    let action_items = parse_action_items(&act_response);

    Ok(EmailOutcome {
        category,
        category_raw,
        action_items,
        priority: category == Some(Category::Important),
    })
}
