//! `inboxpilot` — an LLM-powered inbox assistant for the terminal.
//!
//! This crate provides the core library: JSON-backed stores for the inbox,
//! the prompt templates and the saved results, a prompt renderer, a gateway
//! to the LLM provider, and the batch pipeline that categorizes every email
//! and extracts its action items.

pub mod agent;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod render;
pub mod store;
