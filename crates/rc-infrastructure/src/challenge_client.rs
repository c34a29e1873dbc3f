//! Remote challenge catalog.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use rc_core::RcError;
use rc_core::challenge::{CatalogSource, ChallengeCatalog};
use rc_core::error::Result;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "RetroChallenges-App/1.0";

/// Fetches `challenges.json`, falling back to the built-in catalog.
#[derive(Clone)]
pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches without falling back.
    pub async fn try_fetch(&self) -> Result<ChallengeCatalog> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| RcError::http(format!("Failed to fetch challenges: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RcError::http(format!("Challenges request failed ({})", status)));
        }

        response
            .json::<ChallengeCatalog>()
            .await
            .map_err(|e| RcError::http(format!("Failed to parse challenges: {}", e)))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self) -> ChallengeCatalog {
        match self.try_fetch().await {
            Ok(catalog) => {
                tracing::info!(
                    "[Challenges] Loaded {} games from {}",
                    catalog.games.len(),
                    self.url
                );
                catalog
            }
            Err(e) => {
                tracing::warn!("[Challenges] {}. Using built-in catalog.", e.message());
                ChallengeCatalog::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_url_falls_back() {
        // Port 9 (discard) on localhost is closed in test environments.
        let source = HttpCatalogSource::new("http://127.0.0.1:9/challenges.json");
        assert!(source.try_fetch().await.is_err());
        assert_eq!(source.fetch_catalog().await, ChallengeCatalog::fallback());
    }
}
