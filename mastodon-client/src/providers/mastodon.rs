//! Mastodon REST API poster
//!
//! Works against any server implementing the Mastodon client API
//! (Mastodon, GoToSocial, Akkoma and friends).

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::config::{Credentials, instance_url};
use crate::error::{MastodonError, Result};
use crate::poster::{PostedStatus, StatusRequest, ThreadPoster};

/// Authenticated client for one instance
pub struct MastodonClient {
    base_url: String,
    access_token: String,
    client: Client,
}

/// A status found by URL, with its author for display
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedStatus {
    pub id: String,
    /// Status body as HTML
    #[serde(default)]
    pub content: String,
    pub account: Account,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub acct: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    statuses: Vec<ResolvedStatus>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl MastodonClient {
    pub fn new(instance: &str, access_token: String) -> Self {
        Self {
            base_url: instance_url(instance),
            access_token,
            client: Client::new(),
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(&credentials.instance, credentials.access_token.clone())
    }

    /// Point the client at an arbitrary base URL (http allowed)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up the status behind a (possibly remote) post URL so it can be
    /// replied to from this instance.
    pub async fn resolve_status_url(&self, url: &str) -> Result<ResolvedStatus> {
        let endpoint = format!("{}/api/v2/search", self.base_url);
        debug!("resolving {} via {}", url, endpoint);

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", url),
                ("resolve", "true"),
                ("type", "statuses"),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(request_failed)?;

        let search: SearchResponse = parse_json(response).await?;
        search
            .statuses
            .into_iter()
            .next()
            .ok_or_else(|| MastodonError::StatusNotFound(url.to_string()))
    }
}

#[async_trait]
impl ThreadPoster for MastodonClient {
    async fn post_status(&self, request: StatusRequest) -> Result<PostedStatus> {
        let url = format!("{}/api/v1/statuses", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(request_failed)?;

        parse_json(response).await
    }

    fn name(&self) -> &'static str {
        "Mastodon"
    }
}

pub(crate) fn request_failed(e: reqwest::Error) -> MastodonError {
    MastodonError::ApiError {
        message: format!("Request failed: {}", e),
        status_code: None,
    }
}

/// Turn a response into `T`, or into an `ApiError` carrying the server's
/// `{"error": ...}` message when there is one.
pub(crate) async fn parse_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(MastodonError::ApiError {
            message: error_message(&error_text),
            status_code: Some(status.as_u16()),
        });
    }

    response.json().await.map_err(|e| MastodonError::ApiError {
        message: format!("Failed to parse response: {}", e),
        status_code: None,
    })
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_base_url() {
        let client = MastodonClient::new("https://Fosstodon.org/", "token".to_string());
        assert_eq!(client.base_url(), "https://fosstodon.org");

        let client = client.with_base_url("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_error_message_prefers_json_error() {
        assert_eq!(
            error_message(r#"{"error":"Validation failed: Text can't be blank"}"#),
            "Validation failed: Text can't be blank"
        );
        assert_eq!(error_message("Bad gateway"), "Bad gateway");
    }

    #[test]
    fn test_search_response_parsing() {
        let body = r#"{
            "accounts": [],
            "statuses": [
                {"id": "1107", "account": {"acct": "amy@a.social", "display_name": "Amy"}, "content": "<p>hi</p>"}
            ],
            "hashtags": []
        }"#;
        let search: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(search.statuses[0].id, "1107");
        assert_eq!(search.statuses[0].account.acct, "amy@a.social");
        assert_eq!(search.statuses[0].content, "<p>hi</p>");
    }

    #[test]
    fn test_posted_status_parsing() {
        let body = r#"{"id": "55", "url": "https://a.social/@amy/55", "visibility": "public"}"#;
        let status: PostedStatus = serde_json::from_str(body).unwrap();
        assert_eq!(status.id, "55");
        assert_eq!(status.url.as_deref(), Some("https://a.social/@amy/55"));
    }
}
