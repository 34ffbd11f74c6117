use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Endpoints and request settings for the network collaborators.
///
/// URL templates substitute `{name}` with the display name and `{id}` with the
/// resolved player id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub identity_url: String,
    pub stats_url: String,
    pub avatar_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub api_key: Option<String>,
    pub api_key_header: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            identity_url: "https://api.mojang.com/users/profiles/minecraft/{name}".to_string(),
            stats_url: "https://sky.shiiyu.moe/api/v2/dungeons/{name}".to_string(),
            avatar_url: "https://mc-heads.net/avatar/{name}".to_string(),
            timeout_secs: 12,
            user_agent: concat!("catacombs/", env!("CARGO_PKG_VERSION")).to_string(),
            api_key: None,
            api_key_header: "API-Key".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("failed to parse config json")?;
        if config.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be positive");
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn expand_template(template: &str, name: &str, id: &str) -> String {
    template.replace("{name}", name).replace("{id}", id)
}
