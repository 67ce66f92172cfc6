use crate::agent::{ChatProvider, ProviderError, Turn};
use crate::config::Config;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// `generateContent` client. The API is stateless, so every call carries the
/// whole session history.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    system_instruction: String,
}

impl GeminiProvider {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            system_instruction: config.system_instruction.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn generate(&self, history: &[Turn]) -> Result<String, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::MissingApiKey);
        };

        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &self.system_instruction,
                }],
            },
            contents: history
                .iter()
                .map(|turn| Content {
                    role: Some(turn.role.as_str()),
                    parts: vec![Part { text: &turn.text }],
                })
                .collect(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Api {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyReply);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

    fn config_for(server: &MockServer, api_key: Option<&str>) -> Config {
        Config {
            api_key: api_key.map(str::to_string),
            model: "gemini-test".to_string(),
            system_instruction: "Be brief.".to_string(),
            api_base: format!("{}/", server.uri()),
            request_timeout_secs: 5,
            log_filter: "workbench=debug".to_string(),
            max_sessions: None,
        }
    }

    #[tokio::test]
    async fn sends_history_and_joins_reply_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "secret"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "Be brief." }] },
                "contents": [
                    { "role": "user", "parts": [{ "text": "hello" }] },
                    { "role": "model", "parts": [{ "text": "hi" }] },
                    { "role": "user", "parts": [{ "text": "again" }] }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "hi " }, { "text": "there" }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            GeminiProvider::new(&config_for(&server, Some("secret"))).expect("client should build");
        let reply = provider
            .generate(&[Turn::user("hello"), Turn::model("hi"), Turn::user("again")])
            .await
            .expect("reply should parse");
        assert_eq!(reply, "hi there");
    }

    #[tokio::test]
    async fn error_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let provider =
            GeminiProvider::new(&config_for(&server, Some("secret"))).expect("client should build");
        let err = provider
            .generate(&[Turn::user("hello")])
            .await
            .expect_err("403 should fail");
        assert!(matches!(err, ProviderError::Api { status: 403, ref message } if message == "forbidden"));
    }

    #[tokio::test]
    async fn missing_candidate_text_is_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let provider =
            GeminiProvider::new(&config_for(&server, Some("secret"))).expect("client should build");
        let err = provider
            .generate(&[Turn::user("hello")])
            .await
            .expect_err("empty candidates should fail");
        assert!(matches!(err, ProviderError::EmptyReply));
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider =
            GeminiProvider::new(&config_for(&server, Some("secret"))).expect("client should build");
        let err = provider
            .generate(&[Turn::user("hello")])
            .await
            .expect_err("garbage should fail");
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&config_for(&server, None)).expect("client should build");
        let err = provider
            .generate(&[Turn::user("hello")])
            .await
            .expect_err("no key should fail");
        assert!(matches!(err, ProviderError::MissingApiKey));
    }
}
