use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::time::Duration;

use crate::error::Result;

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; franchise_enricher/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Build the HTTP client shared by the collaborators of one run.
pub fn build_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_seconds))
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Read a response body, turning non-success statuses into [`crate::error::EnrichError::Api`].
pub async fn text_or_api_error(resp: reqwest::Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(crate::error::EnrichError::Api {
            status: status.as_u16(),
            message: truncate(&body, 300),
        });
    }
    Ok(body)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
