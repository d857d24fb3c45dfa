//! The email record and its fixed category set.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed set of categories an email can be assigned.
///
/// "No category yet" is represented as `Option<Category>::None` on the
/// email, never as an extra variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Important,
    Newsletter,
    Spam,
    #[serde(rename = "To-Do")]
    Todo,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 4] = [
        Category::Important,
        Category::Newsletter,
        Category::Spam,
        Category::Todo,
    ];

    /// The canonical label, as stored and as expected from the LLM.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Important => "Important",
            Category::Newsletter => "Newsletter",
            Category::Spam => "Spam",
            Category::Todo => "To-Do",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single inbox message plus everything the agent has derived from it.
///
/// Created when the inbox is loaded or seeded; mutated in place by the
/// categorize and extract operations; never deleted during normal use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    /// Stable identifier, unique within the inbox.
    pub id: String,

    /// Sender address.
    pub from: String,

    /// Recipient address.
    pub to: String,

    /// Subject line.
    pub subject: String,

    /// Plain-text body.
    pub body: String,

    /// When the message was received.
    pub date: DateTime<Utc>,

    /// Conversation thread this message belongs to, when known. Messages
    /// sharing a thread id are gathered as context when drafting a reply.
    #[serde(default)]
    pub thread_id: Option<String>,

    /// Assigned category. `None` until categorized, and again whenever a
    /// categorize run could not recognize the provider's answer.
    #[serde(default)]
    pub category: Option<Category>,

    /// Action items extracted from the body, in the order the provider
    /// listed them.
    #[serde(default)]
    pub action_items: Vec<String>,

    /// Whether the message is flagged as high priority.
    #[serde(default)]
    pub priority: bool,

    /// Whether the user archived the message.
    #[serde(default)]
    pub archived: bool,
}

impl Email {
    /// Action items joined for display and for prompt substitution.
    pub fn action_items_joined(&self) -> String {
        self.action_items.join("; ")
    }

    /// The category label, or `"unset"` when none is assigned.
    pub fn category_label(&self) -> &str {
        self.category.as_ref().map_or("unset", |c| c.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::Important.label(), "Important");
        assert_eq!(Category::Todo.label(), "To-Do");
        assert_eq!(Category::ALL.len(), 4);
    }

    #[test]
    fn test_category_serde_uses_labels() {
        let json = serde_json::to_string(&Category::Todo).expect("serialize");
        assert_eq!(json, "\"To-Do\"");
        let back: Category = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Category::Todo);
    }

    #[test]
    fn test_email_optional_fields_default() {
        let json = r#"{
            "id": "e-1",
            "from": "a@example.com",
            "to": "b@example.com",
            "subject": "Hi",
            "body": "Hello",
            "date": "2025-09-01T00:00:00Z"
        }"#;
        let email: Email = serde_json::from_str(json).expect("parse");
        assert!(email.category.is_none());
        assert!(email.thread_id.is_none());
        assert!(email.action_items.is_empty());
        assert!(!email.priority);
        assert!(!email.archived);
        assert_eq!(email.category_label(), "unset");
    }
}
