use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::app::ports::RegistryLookupPort;
use crate::constants::NOT_AVAILABLE;
use crate::error::{EnrichError, Result};
use crate::infra::http_client::text_or_api_error;
use crate::observability::metrics;
use crate::types::RegistryRecord;

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li.search-result").expect("valid selector"));
static RESULT_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.company_search_result").expect("valid selector"));
static NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1.wrapping_heading.fn.org").expect("valid selector"));
static ADDRESS_LINE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("dd.registered_address.adr ul.address_lines li.address_line")
        .expect("valid selector")
});
static AGENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("dd.agent_name").expect("valid selector"));

/// Registry lookup against the OpenCorporates company search and company pages
pub struct OpenCorporatesRegistry {
    client: reqwest::Client,
    base_url: Url,
}

impl OpenCorporatesRegistry {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| EnrichError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self { client, base_url })
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| EnrichError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn fetch(&self, franchise_name: &str, state_abbr: &str) -> Result<RegistryRecord> {
        let search_url = self.join("/companies")?;
        debug!("Searching registry at {}", search_url);
        let resp = self
            .client
            .get(search_url)
            .query(&[("q", franchise_name)])
            .send()
            .await?;
        let search_html = text_or_api_error(resp).await?;

        let href = find_company_link(&search_html, state_abbr).ok_or_else(|| {
            EnrichError::NoRegistryMatch {
                name: franchise_name.to_string(),
                state: state_abbr.to_string(),
            }
        })?;
        let company_url = self.join(&href)?;
        debug!("Selected company page {}", company_url);

        let resp = self.client.get(company_url.clone()).send().await?;
        // Record the final URL so redirects to the canonical page are reflected in sources
        let source_url = resp.url().to_string();
        let company_html = text_or_api_error(resp).await?;

        Ok(parse_company_page(&company_html, &source_url))
    }
}

#[async_trait]
impl RegistryLookupPort for OpenCorporatesRegistry {
    #[instrument(skip(self))]
    async fn lookup(&self, franchise_name: &str, state_abbr: &str) -> Result<RegistryRecord> {
        let started = Instant::now();
        let result = self.fetch(franchise_name, state_abbr).await;
        metrics::requests::registry_duration(started.elapsed().as_secs_f64());
        if let Ok(record) = &result {
            info!("Registry match: {}", record.corporate_name);
        }
        result
    }
}

/// Find the first search result located in the given state.
///
/// A result matches when its link points into the state's US jurisdiction or when its text
/// (typically the registered address) contains the state abbreviation as a separate word.
pub fn find_company_link(search_html: &str, state_abbr: &str) -> Option<String> {
    let state = state_abbr.trim().to_uppercase();
    if state.is_empty() {
        return None;
    }
    let jurisdiction = format!("/companies/us_{}/", state.to_lowercase());
    let state_word = Regex::new(&format!(r"\b{}\b", regex::escape(&state))).ok()?;

    let document = Html::parse_document(search_html);
    document.select(&RESULT_SELECTOR).find_map(|result| {
        let href = result
            .select(&RESULT_LINK_SELECTOR)
            .next()?
            .value()
            .attr("href")?;
        let in_state =
            href.to_lowercase().contains(&jurisdiction) || state_word.is_match(&element_text(result));
        in_state.then(|| href.to_string())
    })
}

/// Extract corporate identity fields from a company page. Missing fields become "N/A".
pub fn parse_company_page(company_html: &str, source_url: &str) -> RegistryRecord {
    let document = Html::parse_document(company_html);

    let corporate_name = document
        .select(&NAME_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let address_lines: Vec<String> = document
        .select(&ADDRESS_LINE_SELECTOR)
        .map(element_text)
        .filter(|line| !line.is_empty())
        .collect();

    let owner_name = document
        .select(&AGENT_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default();

    RegistryRecord {
        corporate_name: or_not_available(corporate_name),
        registered_address: or_not_available(address_lines.join(", ")),
        owner_name: or_not_available(owner_name),
        source_url: source_url.to_string(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn or_not_available(value: String) -> String {
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value
    }
}
