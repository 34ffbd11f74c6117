use std::{future::Future, time::Duration};

use async_trait::async_trait;
use catacombs_stats::TrackerError;
use serde::Deserialize;
use serde_json::Value;

use crate::config::{expand_template, ClientConfig};
use crate::source::{AvatarProvider, IdentityResolver, PlayerId, StatsSource};

/// reqwest-backed identity, stats and avatar collaborator.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    config: ClientConfig,
}

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    id: Option<String>,
    name: Option<String>,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TrackerError::transport(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.config.api_key {
            Some(key) => request.header(self.config.api_key_header.as_str(), key.as_str()),
            None => request,
        }
    }

    /// GET `url` as JSON. Non-success statuses are mapped through [`status_error`].
    async fn get_json(&self, url: &str, player: &str) -> Result<Value, TrackerError> {
        tracing::debug!(url, player, "request started");
        let fetch = async {
            let response = self
                .request(url)
                .send()
                .await
                .map_err(|e| TrackerError::transport(e.to_string()).with_player(player))?;

            let status = response.status().as_u16();
            tracing::debug!(url, status, "response received");
            if let Some(err) = status_error(status, player) {
                return Err(err);
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| TrackerError::malformed(format!("response is not json: {e}")).with_player(player))
        };

        with_timeout(self.config.timeout(), fetch)
            .await
            .map_err(|e| e.with_context(url.to_string()))
    }
}

/// Maps an HTTP status to the error it signals, `None` for success.
///
/// 204 and 404 mean the player is unknown to the service.
pub fn status_error(status: u16, player: &str) -> Option<TrackerError> {
    match status {
        204 | 404 => Some(TrackerError::identity_not_found(player).with_status(status)),
        429 => Some(TrackerError::rate_limited().with_player(player)),
        200..=299 => None,
        _ => Some(TrackerError::service_error(status).with_player(player)),
    }
}

/// Runs `fut` under a deadline; an expired deadline is a `Timeout` error.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, TrackerError>
where
    F: Future<Output = Result<T, TrackerError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(limit_ms = limit.as_millis() as u64, "request timed out");
            Err(TrackerError::timeout(limit.as_secs()))
        }
    }
}

#[async_trait]
impl IdentityResolver for HttpClient {
    async fn resolve_identity(&self, display_name: &str) -> Result<PlayerId, TrackerError> {
        let url = expand_template(&self.config.identity_url, display_name, "");
        let body = self.get_json(&url, display_name).await?;
        let identity: IdentityResponse = serde_json::from_value(body)
            .map_err(|e| TrackerError::malformed(format!("identity response: {e}")).with_player(display_name))?;

        match identity.id {
            Some(id) if !id.is_empty() => {
                let name = identity.name.unwrap_or_else(|| display_name.to_string());
                Ok(PlayerId::new(name, &id))
            }
            _ => Err(TrackerError::identity_not_found(display_name)),
        }
    }
}

#[async_trait]
impl StatsSource for HttpClient {
    async fn fetch_raw_stats(&self, player: &PlayerId) -> Result<Value, TrackerError> {
        let url = expand_template(&self.config.stats_url, &player.name, &player.id);
        self.get_json(&url, &player.name).await
    }
}

impl AvatarProvider for HttpClient {
    fn avatar_url(&self, display_name: &str) -> String {
        expand_template(&self.config.avatar_url, display_name, "")
    }
}
