use std::time::Duration;

use feed_core::{ContentItem, FeedError};
use reqwest::StatusCode;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Qiita:Team API client.
/// See https://qiita.com/api/v2/docs#get-apiv2items
pub struct QiitaClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl QiitaClient {
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, FeedError> {
        Self::with_timeout(base_url, access_token, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FeedError::Upstream(err.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    /// Single attempt; `per_page` is only sent when given.
    pub async fn list_items(&self, per_page: Option<u32>) -> Result<Vec<ContentItem>, FeedError> {
        let resp = self
            .items_request(per_page)
            .send()
            .await
            .map_err(|err| FeedError::Upstream(err.to_string()))?;

        if resp.status() != StatusCode::OK {
            return Err(FeedError::Upstream(status_text(resp.status())));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|err| FeedError::Upstream(err.to_string()))?;

        serde_json::from_slice(&body)
            .map_err(|err| FeedError::Decode(format!("items payload: {err}")))
    }

    fn items_request(&self, per_page: Option<u32>) -> reqwest::RequestBuilder {
        let url = format!("{}/api/v2/items", self.base_url);
        let req = self.http.get(url).bearer_auth(&self.access_token);
        match per_page {
            Some(per_page) => req.query(&[("per_page", per_page)]),
            None => req,
        }
    }
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
