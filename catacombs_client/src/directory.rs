use std::{fs, path::Path};

use anyhow::Context;
use async_trait::async_trait;
use catacombs_stats::{same_player, TrackerError};
use serde::{Deserialize, Serialize};

use crate::source::{IdentityResolver, PlayerId};

/// One known player: shown in the quick-access list, and resolvable offline
/// when `id` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Player list loaded from data, used both as the quick-access list and as
/// the fallback identity table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerDirectory {
    entries: Vec<DirectoryEntry>,
}

impl PlayerDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("failed to read player list: {}", path.display()))?;
        let directory: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse player list json: {}", path.display()))?;
        Ok(directory)
    }

    pub fn quick_access(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Case-insensitive lookup by display name.
    pub fn get(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| same_player(&e.name, name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl IdentityResolver for PlayerDirectory {
    async fn resolve_identity(&self, display_name: &str) -> Result<PlayerId, TrackerError> {
        match self.get(display_name) {
            Some(DirectoryEntry { name, id: Some(id), .. }) => Ok(PlayerId::new(name.clone(), id)),
            _ => Err(TrackerError::identity_not_found(display_name)),
        }
    }
}

/// Tries `primary` first and consults `fallback` on any failure. When both
/// fail the primary's error is returned.
#[derive(Debug, Clone)]
pub struct FallbackResolver<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackResolver<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P, F> IdentityResolver for FallbackResolver<P, F>
where
    P: IdentityResolver,
    F: IdentityResolver,
{
    async fn resolve_identity(&self, display_name: &str) -> Result<PlayerId, TrackerError> {
        let primary_err = match self.primary.resolve_identity(display_name).await {
            Ok(id) => return Ok(id),
            Err(e) => e,
        };
        tracing::warn!(player = display_name, error = %primary_err, "identity lookup failed, trying fallback");

        match self.fallback.resolve_identity(display_name).await {
            Ok(id) => {
                tracing::info!(player = display_name, "resolved from fallback table");
                Ok(id)
            }
            Err(_) => Err(primary_err),
        }
    }
}
