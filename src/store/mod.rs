//! JSON-file-backed stores.
//!
//! Each store owns its file path plus a mutex, and every operation takes
//! the full read-modify-write sequence under that lock (single-writer
//! discipline — two writers must never interleave partial updates).
//! Saves go through a temp file and a rename so a crash mid-write cannot
//! leave a half-written collection behind.

pub mod inbox;
pub mod prompts;
pub mod results;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{AgentError, Result};

/// Read and deserialize a JSON collection.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| AgentError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| AgentError::storage(path, e.to_string()))
}

/// Serialize and write a JSON collection atomically (temp file + rename).
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AgentError::io(parent, e))?;
    }

    let contents = serde_json::to_string_pretty(value)
        .map_err(|e| AgentError::storage(path, e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents).map_err(|e| AgentError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| AgentError::io(path, e))?;

    debug!(path = %path.display(), "Store written");
    Ok(())
}
