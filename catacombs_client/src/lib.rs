use std::{fs, path::Path};

use anyhow::Context;
use serde_json::Value;

mod config;
mod directory;
mod http;
mod source;
mod tokens;
mod tracker;

pub use config::{expand_template, ClientConfig};
pub use directory::{DirectoryEntry, FallbackResolver, PlayerDirectory};
pub use http::{status_error, with_timeout, HttpClient};
pub use source::{AvatarProvider, AvatarTemplate, IdentityResolver, PlayerId, StatsSource};
pub use tokens::{RequestToken, RequestTokens, Slot};
pub use tracker::{Completed, Dashboard, Tracker};

/// Reads a stats payload saved to disk, in either payload shape.
pub fn load_payload_from_path(path: impl AsRef<Path>) -> anyhow::Result<Value> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("failed to read payload: {}", path.display()))?;
    let payload: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse payload json: {}", path.display()))?;
    Ok(payload)
}

pub fn load_payload_from_str(json: &str) -> anyhow::Result<Value> {
    let payload: Value = serde_json::from_str(json).context("failed to parse payload json")?;
    Ok(payload)
}
