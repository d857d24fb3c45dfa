//! Data model: emails, drafts and analysis records.

pub mod analysis;
pub mod draft;
pub mod email;
