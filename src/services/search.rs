use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::entities::SearchItem;
use crate::services::ai::ProviderError;

/// Web search backend returning provider-ranked items.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        result_count: u8,
        site_filter: Option<&str>,
    ) -> Result<Vec<SearchItem>, ProviderError>;

    fn is_configured(&self) -> bool;
}

/// Google Custom Search JSON API client.
#[derive(Clone)]
pub struct GoogleSearchClient {
    http: reqwest::Client,
    api_key: Option<String>,
    engine_id: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl GoogleSearchClient {
    pub fn new(
        http: reqwest::Client,
        api_key: Option<String>,
        engine_id: Option<String>,
        base_url: &str,
        timeout_secs: u64,
    ) -> Self {
        Self {
            http,
            api_key,
            engine_id,
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(
        &self,
        query: &str,
        result_count: u8,
        site_filter: Option<&str>,
    ) -> Result<Vec<SearchItem>, ProviderError> {
        let (Some(key), Some(cx)) = (self.api_key.as_deref(), self.engine_id.as_deref()) else {
            return Err(ProviderError::NotConfigured);
        };

        let num = result_count.to_string();
        let mut params: Vec<(&str, &str)> =
            vec![("key", key), ("cx", cx), ("q", query), ("num", num.as_str())];
        if let Some(site) = site_filter {
            params.push(("siteSearch", site));
            params.push(("siteSearchFilter", "i"));
        }

        let response = self
            .http
            .get(&self.base_url)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SearchErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponseBody = response.json().await?;
        Ok(body.into_items())
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.engine_id.is_some()
    }
}

#[derive(Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    items: Vec<RawSearchItem>,
}

impl SearchResponseBody {
    fn into_items(self) -> Vec<SearchItem> {
        self.items
            .into_iter()
            .map(|item| SearchItem {
                title: item.title.unwrap_or_default(),
                link: item.link.unwrap_or_default(),
                snippet: item.snippet.unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct RawSearchItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

#[derive(Deserialize)]
struct SearchErrorEnvelope {
    error: SearchErrorDetail,
}

#[derive(Deserialize)]
struct SearchErrorDetail {
    message: String,
}
