//! REST client for the Gemini `generateContent` API.
//!
//! Every request enables the Google Search grounding tool. Auth is the
//! `x-goog-api-key` header. Requests target
//! `{base}/v1beta/models/{model}:generateContent`.

use async_trait::async_trait;
use serde::Deserialize;

use super::{Generation, GenerativeModel};
use crate::config::{Config, DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::error::ProfilerError;
use crate::types::Source;

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Build a client from config, or `None` when no API key is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let key = config.resolved_api_key()?;
        Some(
            Self::new(&key)
                .with_model(&config.model)
                .with_base_url(&config.api_base_url),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Generation, ProfilerError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "google_search": {} }],
        });

        log::debug!("Gemini request to model {}", self.model);
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProfilerError::Provider(format!("Request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProfilerError::Provider(provider_message(status, &text)));
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| ProfilerError::Provider(format!("Failed to read response: {}", e)))?;

        Ok(into_generation(parsed))
    }
}

/// Prefer the provider's own `error.message`; fall back to status plus body.
fn provider_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => format!("HTTP {}: {}", status, body),
    }
}

fn into_generation(response: GenerateContentResponse) -> Generation {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Generation::default();
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    let sources = candidate
        .grounding_metadata
        .map(|m| {
            m.grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| {
                    let uri = web.uri.filter(|u| !u.is_empty())?;
                    let title = web
                        .title
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| uri.clone());
                    Some(Source { uri, title })
                })
                .collect()
        })
        .unwrap_or_default();

    Generation { text, sources }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key")
            .with_model("gemini-test")
            .with_base_url(&server.uri())
    }

    #[tokio::test]
    async fn test_generate_maps_text_and_grounding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "tools": [{ "google_search": {} }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] },
                    "groundingMetadata": {
                        "groundingChunks": [
                            { "web": { "uri": "https://a.example", "title": "A" } },
                            { "web": { "uri": "https://b.example" } },
                            { "web": { "title": "no uri" } },
                            {}
                        ]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generation = client_for(&server).generate("hello").await.unwrap();
        assert_eq!(generation.text, "{\"a\":1}");
        assert_eq!(
            generation.sources,
            vec![
                Source { uri: "https://a.example".into(), title: "A".into() },
                Source { uri: "https://b.example".into(), title: "https://b.example".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_is_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let generation = client_for(&server).generate("hello").await.unwrap();
        assert!(generation.text.is_empty());
        assert!(generation.sources.is_empty());
    }

    #[tokio::test]
    async fn test_generate_surfaces_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hello").await.unwrap_err();
        match err {
            ProfilerError::Provider(msg) => assert_eq!(msg, "API key not valid."),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hello").await.unwrap_err();
        assert!(err.is_per_item());
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(GeminiClient::from_config(&Config::default()).is_none());
        let config = Config {
            api_key: Some("k".into()),
            model: "m".into(),
            api_base_url: "http://localhost:1/".into(),
            ..Config::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:1/v1beta/models/m:generateContent");
    }
}
