// Contact lookup through Perplexity's OpenAI-compatible chat completions API.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::app::ports::ContactLookupPort;
use crate::config::ContactConfig;
use crate::constants::LINKEDIN_COMPANY_MARKER;
use crate::error::{EnrichError, Result};
use crate::observability::metrics;
use crate::types::{ContactFallback, ContactRecord};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^```(?:json)?|```$").expect("valid regex"));

// ============================================================================
// Chat completion API types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Contact fields as reported by the model. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContactAnswer {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub source_urls: Vec<String>,
}

// ============================================================================
// Lookup
// ============================================================================

pub struct PerplexityContactLookup {
    client: reqwest::Client,
    api_key: String,
    config: ContactConfig,
    fallback: ContactFallback,
}

impl PerplexityContactLookup {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        config: ContactConfig,
        fallback: ContactFallback,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(EnrichError::Config("contact API key is empty".into()));
        }
        Ok(Self {
            client,
            api_key,
            config,
            fallback,
        })
    }

    async fn ask(&self, prompt: String) -> Result<ContactAnswer> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .map(|body| body.error.message)
                .unwrap_or(error_text);
            return Err(EnrichError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        debug!("Contact search returned {} chars", content.len());

        parse_contact_answer(&content)
    }
}

#[async_trait]
impl ContactLookupPort for PerplexityContactLookup {
    #[instrument(skip(self))]
    async fn lookup(
        &self,
        franchise_name: &str,
        locality: &str,
        owner_name: &str,
    ) -> Result<ContactRecord> {
        let started = Instant::now();
        let answer = match self.ask(build_prompt(franchise_name, locality, owner_name)).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Contact search failed, using fallback contact: {}", e);
                metrics::enrich::collaborator_failure(metrics::CONTACT_COLLABORATOR);
                ContactAnswer::default()
            }
        };
        metrics::requests::contact_duration(started.elapsed().as_secs_f64());

        Ok(apply_fallbacks(answer, &self.fallback))
    }
}

fn build_prompt(franchise_name: &str, locality: &str, owner_name: &str) -> String {
    format!(
        r#"You are an AI assistant tasked with finding real-time contact information using the web.

1. Search for business contact info (email, phone) for this specific franchise location:
   - Franchise: {franchise_name}
   - Address: {locality}

2. If unavailable, search for contact info for the owner:
   - Owner: {owner_name}

3. Find the owner's personal LinkedIn profile and make sure it is associated with the
   franchise name (URL must contain "/in/", not "/company/"). If the owner is an LLC, look
   for the manager or registered agent's personal profile.

4. Return only fields you are confident about. Include the URLs where each datum was found
   in an array called "url Sources".

Return JSON only:
{{"corporate_phone":"...", "corporate_email":"...", "linkedin_url":"...", "url Sources":["https://..."]}}"#
    )
}

/// Parse the model's message content into contact fields.
///
/// Markdown code fences are stripped and blank content is treated as an empty object. Fields
/// with an unexpected JSON type are ignored rather than failing the whole answer.
pub fn parse_contact_answer(content: &str) -> Result<ContactAnswer> {
    let cleaned = CODE_FENCE.replace_all(content.trim(), "");
    let cleaned = cleaned.trim();
    let value: Value = if cleaned.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(cleaned)?
    };

    let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
    let source_urls = match value.get("url Sources") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    };

    Ok(ContactAnswer {
        phone: text("corporate_phone"),
        email: text("corporate_email"),
        linkedin_url: text("linkedin_url"),
        source_urls,
    })
}

/// True when the URL points at a LinkedIn organisation page rather than a person
pub fn is_company_profile(url: &str) -> bool {
    url.to_lowercase().contains(LINKEDIN_COMPANY_MARKER)
}

/// Replace missing values with the fallback contact and discard organisation LinkedIn pages.
pub fn apply_fallbacks(answer: ContactAnswer, fallback: &ContactFallback) -> ContactRecord {
    let pick = |value: Option<String>, default: &str| match value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    };

    let linkedin_url = answer
        .linkedin_url
        .filter(|url| !is_company_profile(url));

    ContactRecord {
        phone: pick(answer.phone, &fallback.phone),
        email: pick(answer.email, &fallback.email),
        linkedin_url: pick(linkedin_url, &fallback.linkedin_url),
        source_urls: if answer.source_urls.is_empty() {
            fallback.source_urls.clone()
        } else {
            answer.source_urls
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FALLBACK_EMAIL, FALLBACK_PHONE, FALLBACK_SOURCE_URL};

    #[test]
    fn test_parse_fenced_json() {
        let content = "```json\n{\"corporate_phone\":\"(972) 555-0100\",\"corporate_email\":\"jane@acme.com\",\"linkedin_url\":\"https://linkedin.com/in/janedoe\",\"url Sources\":[\"https://linkedin.com/in/janedoe\"]}\n```";
        let answer = parse_contact_answer(content).unwrap();
        assert_eq!(answer.phone.as_deref(), Some("(972) 555-0100"));
        assert_eq!(answer.email.as_deref(), Some("jane@acme.com"));
        assert_eq!(answer.linkedin_url.as_deref(), Some("https://linkedin.com/in/janedoe"));
        assert_eq!(answer.source_urls, vec!["https://linkedin.com/in/janedoe".to_string()]);
    }

    #[test]
    fn test_parse_blank_content_is_empty_answer() {
        assert_eq!(parse_contact_answer("   ").unwrap(), ContactAnswer::default());
        assert_eq!(parse_contact_answer("```json\n```").unwrap(), ContactAnswer::default());
    }

    #[test]
    fn test_parse_prose_is_an_error() {
        assert!(matches!(
            parse_contact_answer("I could not find anything."),
            Err(EnrichError::Json(_))
        ));
    }

    #[test]
    fn test_parse_tolerates_wrong_types() {
        let answer =
            parse_contact_answer(r#"{"corporate_phone": 9725550100, "url Sources": "https://a"}"#)
                .unwrap();
        assert_eq!(answer.phone, None);
        assert_eq!(answer.source_urls, vec!["https://a".to_string()]);
    }

    #[test]
    fn test_fallbacks_fill_empty_answer() {
        let record = apply_fallbacks(ContactAnswer::default(), &ContactFallback::default());
        assert_eq!(record.phone, FALLBACK_PHONE);
        assert_eq!(record.email, FALLBACK_EMAIL);
        assert_eq!(record.linkedin_url, "");
        assert_eq!(record.source_urls, vec![FALLBACK_SOURCE_URL.to_string()]);
    }

    #[test]
    fn test_company_linkedin_page_is_discarded() {
        let answer = ContactAnswer {
            phone: Some("(214) 555-0199".to_string()),
            email: Some(String::new()),
            linkedin_url: Some("https://www.linkedin.com/Company/acme-chicken".to_string()),
            source_urls: vec!["https://acme.example/contact".to_string()],
        };
        let record = apply_fallbacks(answer, &ContactFallback::default());
        assert_eq!(record.phone, "(214) 555-0199");
        assert_eq!(record.email, FALLBACK_EMAIL);
        assert_eq!(record.linkedin_url, "");
        assert_eq!(record.source_urls, vec!["https://acme.example/contact".to_string()]);
    }

    #[test]
    fn test_personal_profile_is_kept() {
        assert!(!is_company_profile("https://linkedin.com/in/janedoe"));
        assert!(is_company_profile("https://linkedin.com/company/acme"));
    }

    #[test]
    fn test_new_rejects_blank_key() {
        let result = PerplexityContactLookup::new(
            reqwest::Client::new(),
            "  ".to_string(),
            ContactConfig::default(),
            ContactFallback::default(),
        );
        assert!(matches!(result, Err(EnrichError::Config(_))));
    }

    mod lookup {
        use super::*;
        use httpmock::prelude::*;
        use serde_json::json;

        fn lookup_against(base_url: String) -> PerplexityContactLookup {
            let config = ContactConfig {
                base_url,
                ..ContactConfig::default()
            };
            PerplexityContactLookup::new(
                reqwest::Client::new(),
                "test-key".to_string(),
                config,
                ContactFallback::default(),
            )
            .unwrap()
        }

        fn chat_body(content: &str) -> Value {
            json!({
                "id": "chat-1",
                "model": "sonar-pro",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
            })
        }

        fn assert_all_fallbacks(record: &ContactRecord) {
            assert_eq!(record.phone, FALLBACK_PHONE);
            assert_eq!(record.email, FALLBACK_EMAIL);
            assert_eq!(record.linkedin_url, "");
            assert_eq!(record.source_urls, vec![FALLBACK_SOURCE_URL.to_string()]);
        }

        #[tokio::test]
        async fn test_fenced_answer_is_used() {
            let server = MockServer::start_async().await;
            let content = "```json\n{\"corporate_phone\":\"(214) 555-0123\",\"corporate_email\":\"jane@acme.example\",\"linkedin_url\":\"https://www.linkedin.com/in/janedoe\",\"url Sources\":[\"https://acme.example/contact\"]}\n```";
            let mock = server
                .mock_async(|when, then| {
                    when.method(POST)
                        .path("/chat/completions")
                        .header("authorization", "Bearer test-key");
                    then.status(200)
                        .header("content-type", "application/json")
                        .json_body(chat_body(content));
                })
                .await;

            let record = lookup_against(server.base_url())
                .lookup("Acme Chicken #12", "TX", "Jane Doe")
                .await
                .unwrap();

            mock.assert_async().await;
            assert_eq!(record.phone, "(214) 555-0123");
            assert_eq!(record.email, "jane@acme.example");
            assert_eq!(record.linkedin_url, "https://www.linkedin.com/in/janedoe");
            assert_eq!(record.source_urls, vec!["https://acme.example/contact".to_string()]);
        }

        #[tokio::test]
        async fn test_prose_answer_yields_fallbacks() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/chat/completions");
                    then.status(200)
                        .header("content-type", "application/json")
                        .json_body(chat_body(
                            "I'm sorry, I could not find contact details for this franchise.",
                        ));
                })
                .await;

            let record = lookup_against(server.base_url())
                .lookup("Acme Chicken #12", "TX", "N/A")
                .await
                .unwrap();

            assert_all_fallbacks(&record);
        }

        #[tokio::test]
        async fn test_server_error_yields_fallbacks() {
            let server = MockServer::start_async().await;
            let mock = server
                .mock_async(|when, then| {
                    when.method(POST).path("/chat/completions");
                    then.status(500)
                        .json_body(json!({"error": {"message": "upstream overloaded"}}));
                })
                .await;

            let record = lookup_against(server.base_url())
                .lookup("Acme Chicken #12", "TX", "Jane Doe")
                .await
                .unwrap();

            mock.assert_async().await;
            assert_all_fallbacks(&record);
        }

        #[tokio::test]
        async fn test_error_status_message_is_extracted() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/chat/completions");
                    then.status(401)
                        .json_body(json!({"error": {"message": "invalid api key"}}));
                })
                .await;

            let err = lookup_against(server.base_url())
                .ask("hello".to_string())
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                EnrichError::Api { status: 401, ref message } if message == "invalid api key"
            ));
        }

        #[tokio::test]
        async fn test_unreachable_service_yields_fallbacks() {
            // Nothing listens on the discard port
            let record = lookup_against("http://127.0.0.1:9".to_string())
                .lookup("Acme Chicken #12", "TX", "Jane Doe")
                .await
                .unwrap();

            assert_all_fallbacks(&record);
        }
    }
}
