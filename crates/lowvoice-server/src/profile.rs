//! Public profile lookup over HTTP.
//!
//! Fetches `https://t.me/<handle>` and scrapes the page title block for the
//! display name. Any deviation (non-200, missing block, empty name) is a
//! lookup failure; the resolver turns those into cached misses.

use std::time::Duration;

use async_trait::async_trait;
use lowvoice_core::{DisplayName, Handle, LookupError, ProfileLookup};
use regex::Regex;
use reqwest::{Client, StatusCode};

use crate::error::ServerError;

/// Default profile host.
pub const DEFAULT_PROFILE_BASE: &str = "https://t.me";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
const USER_AGENT: &str = concat!("lowvoice/", env!("CARGO_PKG_VERSION"));

/// Profile lookup against the platform's public web profiles.
#[derive(Debug, Clone)]
pub struct HttpProfileLookup {
    client: Client,
    base_url: String,
    title: Regex,
    markup: Regex,
}

impl HttpProfileLookup {
    /// Build a lookup against `base_url` (no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            title: Regex::new(r#"<div class="tgme_page_title">(?s)(.+?)</div>"#)
                .map_err(|e| ServerError::Config(e.to_string()))?,
            markup: Regex::new(r"<[^>]*>").map_err(|e| ServerError::Config(e.to_string()))?,
        })
    }

    /// Pull the display name out of a profile page.
    pub fn extract_name(&self, page: &str) -> Result<DisplayName, LookupError> {
        let block = self
            .title
            .captures(page)
            .and_then(|c| c.get(1))
            .ok_or_else(|| LookupError::Parse("no page title".to_string()))?;

        let name = self.markup.replace_all(block.as_str(), "");
        let name = name.trim();
        if name.is_empty() {
            return Err(LookupError::Parse("empty page title".to_string()));
        }
        Ok(name.to_string())
    }
}

#[async_trait]
impl ProfileLookup for HttpProfileLookup {
    async fn display_name(&self, handle: &Handle) -> Result<DisplayName, LookupError> {
        let url = format!("{}/{}", self.base_url, handle.as_str());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {},
            StatusCode::NOT_FOUND => return Err(LookupError::NotFound),
            other => return Err(LookupError::Transport(format!("unexpected status {other}"))),
        }

        let page = response.text().await.map_err(|e| LookupError::Transport(e.to_string()))?;
        self.extract_name(&page)
    }
}
