//! Collaborators a lookup is built from.
//!
//! A lookup resolves a display name to a [`PlayerId`], fetches the raw stats
//! payload for that id and asks an [`AvatarProvider`] for the image URL. Each
//! piece is a trait so the network can be swapped for fixtures in tests.

use async_trait::async_trait;
use catacombs_stats::{normalize_player_id, TrackerError};
use serde_json::Value;

use crate::config::expand_template;

/// A resolved player: the canonical display name and the stable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerId {
    pub name: String,
    pub id: String,
}

impl PlayerId {
    /// Ids are stored without dashes, lower-cased.
    pub fn new(name: impl Into<String>, id: &str) -> Self {
        Self {
            name: name.into(),
            id: normalize_player_id(id),
        }
    }
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Fails with `IdentityNotFound` or `Timeout`.
    async fn resolve_identity(&self, display_name: &str) -> Result<PlayerId, TrackerError>;
}

#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fails with `RateLimited`, `IdentityNotFound`, `UpstreamServiceError` or `Timeout`.
    async fn fetch_raw_stats(&self, player: &PlayerId) -> Result<Value, TrackerError>;
}

pub trait AvatarProvider: Send + Sync {
    fn avatar_url(&self, display_name: &str) -> String;
}

/// Avatar URLs built from a `{name}` template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarTemplate {
    template: String,
}

impl AvatarTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl AvatarProvider for AvatarTemplate {
    fn avatar_url(&self, display_name: &str) -> String {
        expand_template(&self.template, display_name, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_is_normalized() {
        let id = PlayerId::new("Tommo395", "4D4F7F9E-0C2A-4E8B-9A1D-2B3C4D5E6F70");
        assert_eq!(id.id, "4d4f7f9e0c2a4e8b9a1d2b3c4d5e6f70");
        assert_eq!(id.name, "Tommo395");
    }

    #[test]
    fn avatar_template_uses_display_name() {
        let avatars = AvatarTemplate::new("https://mc-heads.net/avatar/{name}");
        assert_eq!(avatars.avatar_url("midori642"), "https://mc-heads.net/avatar/midori642");
    }
}
