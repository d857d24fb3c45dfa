//! Prompt template renderer.
//!
//! Templates are plain text with `{{placeholder}}` markers. Recognized
//! placeholders are replaced with the email's current values; anything
//! else is left verbatim — prompts are user-edited and a typo must never
//! make rendering fail.
//!
//! Recognized placeholders:
//! - `{{sender}}` — the From address
//! - `{{subject}}` — the subject line
//! - `{{body}}` — the plain-text body
//! - `{{category}}` — current category label, or `unset`
//! - `{{action_items}}` — extracted items joined with `; `
//! - `{{question}}` — the user's question (chat rendering only)
//! - `{{thread_context}}` — other messages in the thread (draft rendering
//!   only)

use crate::model::email::Email;

/// Substitute an email's fields into a template. Pure, never fails.
pub fn render(template: &str, email: &Email) -> String {
    substitute(template, email, None, None)
}

/// Substitute an email's fields plus the user's free-text question.
pub fn render_chat(template: &str, email: &Email, question: &str) -> String {
    substitute(template, email, Some(question), None)
}

/// Substitute an email's fields plus the collected thread context
/// (empty string when the email has no thread).
pub fn render_draft(template: &str, email: &Email, thread_context: &str) -> String {
    substitute(template, email, None, Some(thread_context))
}

fn substitute(
    template: &str,
    email: &Email,
    question: Option<&str>,
    thread_context: Option<&str>,
) -> String {
    let mut out = template
        .replace("{{sender}}", &email.from)
        .replace("{{subject}}", &email.subject)
        .replace("{{body}}", &email.body)
        .replace("{{category}}", email.category_label())
        .replace("{{action_items}}", &email.action_items_joined());
    if let Some(q) = question {
        out = out.replace("{{question}}", q);
    }
    if let Some(ctx) = thread_context {
        out = out.replace("{{thread_context}}", ctx);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::email::Category;
    use chrono::Utc;

    fn sample_email() -> Email {
        Email {
            id: "e-1".to_string(),
            from: "alice@company.com".to_string(),
            to: "you@company.com".to_string(),
            subject: "Budget approval".to_string(),
            body: "Can you approve the Q2 budget?".to_string(),
            date: Utc::now(),
            thread_id: None,
            category: Some(Category::Important),
            action_items: vec!["Approve budget".to_string(), "Reply to Alice".to_string()],
            priority: true,
            archived: false,
        }
    }

    #[test]
    fn test_render_all_placeholders() {
        let t = "From {{sender}}: {{subject}}\n{{body}}\nCategory: {{category}}\nTodo: {{action_items}}";
        let out = render(t, &sample_email());
        assert!(out.contains("From alice@company.com: Budget approval"));
        assert!(out.contains("Can you approve the Q2 budget?"));
        assert!(out.contains("Category: Important"));
        assert!(out.contains("Todo: Approve budget; Reply to Alice"));
    }

    #[test]
    fn test_unknown_placeholder_left_verbatim() {
        let out = render("Hello {{nonsense}} and {{subject}}", &sample_email());
        assert_eq!(out, "Hello {{nonsense}} and Budget approval");
    }

    #[test]
    fn test_malformed_placeholder_left_verbatim() {
        let out = render("{{subject} {sender}} {{", &sample_email());
        assert_eq!(out, "{{subject} {sender}} {{");
    }

    #[test]
    fn test_unset_category_renders_unset() {
        let mut email = sample_email();
        email.category = None;
        let out = render("cat={{category}}", &email);
        assert_eq!(out, "cat=unset");
    }

    #[test]
    fn test_question_only_substituted_in_chat() {
        let email = sample_email();
        assert_eq!(render("q={{question}}", &email), "q={{question}}");
        assert_eq!(
            render_chat("q={{question}}", &email, "when is it due?"),
            "q=when is it due?"
        );
    }

    #[test]
    fn test_thread_context_only_substituted_in_draft() {
        let email = sample_email();
        assert_eq!(
            render("ctx={{thread_context}}", &email),
            "ctx={{thread_context}}"
        );
        assert_eq!(
            render_draft("ctx={{thread_context}}", &email, "FROM: bob\nok"),
            "ctx=FROM: bob\nok"
        );
        assert_eq!(render_draft("ctx={{thread_context}}", &email, ""), "ctx=");
    }

    #[test]
    fn test_render_is_idempotent_on_plain_text() {
        let t = "No placeholders here.";
        assert_eq!(render(t, &sample_email()), t);
    }
}
