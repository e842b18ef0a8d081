use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::schema::Schema;
use crate::settings::AiConfig;

pub const API_KEY_ENV: &str = "API_KEY";

/// Read once, on first use. A missing key only surfaces when a request is made.
static API_KEY: Lazy<Option<String>> = Lazy::new(|| {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
});

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured (set the API_KEY environment variable)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("prompt was blocked: {0}")]
    Blocked(String),
    #[error("service returned no text")]
    EmptyResponse,
    #[error("response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("response did not match schema: {0}")]
    SchemaMismatch(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiRequest {
    pub parts: Vec<String>,
    pub schema: Option<Schema>,
}

impl AiRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![prompt.into()],
            schema: None,
        }
    }

    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.parts.push(part.into());
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AiOutput {
    Text(String),
    Json(Value),
}

impl AiOutput {
    pub fn into_text(self) -> String {
        match self {
            AiOutput::Text(t) => t,
            AiOutput::Json(v) => v.to_string(),
        }
    }

    pub fn into_typed<T: serde::de::DeserializeOwned>(self) -> Result<T, AiError> {
        match self {
            AiOutput::Json(v) => Ok(serde_json::from_value(v)?),
            AiOutput::Text(t) => Ok(serde_json::from_str(strip_code_fence(&t))?),
        }
    }
}

#[async_trait]
pub trait AiClient: Send + Sync {
    async fn generate(&self, request: &AiRequest) -> Result<AiOutput, AiError>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn from_env(config: &AiConfig) -> Result<Self, AiError> {
        Self::new(config, API_KEY.clone())
    }

    pub fn new(config: &AiConfig, api_key: Option<String>) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn generate(&self, request: &AiRequest) -> Result<AiOutput, AiError> {
        let key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let body = build_request_body(request);
        debug!(target: "schoolhub::ai", model = %self.model, parts = request.parts.len(), structured = request.schema.is_some(), "sending");

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
                body: truncate(&text, 300),
            });
        }
        parse_response(&text, request.schema.as_ref())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Schema,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

pub(crate) fn build_request_body(request: &AiRequest) -> Value {
    let body = GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: request
                .parts
                .iter()
                .map(|p| TextPart { text: p.as_str() })
                .collect(),
        }],
        generation_config: request.schema.as_ref().map(|schema| GenerationConfig {
            response_mime_type: "application/json",
            response_schema: schema,
        }),
    };
    serde_json::to_value(body).unwrap_or(Value::Null)
}

pub(crate) fn parse_response(body: &str, schema: Option<&Schema>) -> Result<AiOutput, AiError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AiError::Blocked(reason));
        }
        return Err(AiError::EmptyResponse);
    }

    match schema {
        None => Ok(AiOutput::Text(text.trim().to_string())),
        Some(schema) => {
            let value: Value = serde_json::from_str(strip_code_fence(&text))?;
            schema.validate(&value).map_err(AiError::SchemaMismatch)?;
            Ok(AiOutput::Json(value))
        }
    }
}

/// Models sometimes wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary_schema() -> Schema {
        Schema::object()
            .property("summary", Schema::string())
            .required(&["summary"])
    }

    #[test]
    fn body_without_schema_has_no_generation_config() {
        let body = build_request_body(&AiRequest::text("Hello").with_part("World"));
        assert_eq!(
            body,
            json!({"contents": [{"role": "user", "parts": [{"text": "Hello"}, {"text": "World"}]}]})
        );
    }

    #[test]
    fn body_with_schema_requests_json() {
        let body = build_request_body(&AiRequest::text("Summarize").with_schema(summary_schema()));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            json!(["summary"])
        );
    }

    #[test]
    fn parses_plain_text_across_parts() {
        let raw = json!({"candidates": [{"content": {"parts": [{"text": "Keep "}, {"text": "going. "}]}}]});
        let out = parse_response(&raw.to_string(), None).expect("parse");
        assert_eq!(out, AiOutput::Text("Keep going.".to_string()));
    }

    #[test]
    fn parses_fenced_json_against_schema() {
        let raw = json!({"candidates": [{"content": {"parts": [{"text": "```json\n{\"summary\": \"Good term\"}\n```"}]}}]});
        let out = parse_response(&raw.to_string(), Some(&summary_schema())).expect("parse");
        assert_eq!(out, AiOutput::Json(json!({"summary": "Good term"})));
    }

    #[test]
    fn schema_violation_is_an_error() {
        let raw = json!({"candidates": [{"content": {"parts": [{"text": "{\"other\": 1}"}]}}]});
        let err = parse_response(&raw.to_string(), Some(&summary_schema())).unwrap_err();
        assert!(matches!(err, AiError::SchemaMismatch(_)));
    }

    #[test]
    fn blocked_and_empty_responses() {
        let blocked = json!({"candidates": [], "promptFeedback": {"blockReason": "SAFETY"}});
        assert!(matches!(
            parse_response(&blocked.to_string(), None),
            Err(AiError::Blocked(r)) if r == "SAFETY"
        ));
        assert!(matches!(
            parse_response("{}", None),
            Err(AiError::EmptyResponse)
        ));
        assert!(matches!(
            parse_response("not json", None),
            Err(AiError::InvalidJson(_))
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(&AiConfig::default(), None).expect("client");
        assert!(!client.has_key());
        let err = client.generate(&AiRequest::text("hi")).await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey));
    }

    #[test]
    fn typed_output_from_text_or_json() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct S {
            summary: String,
        }
        let from_json: S = AiOutput::Json(json!({"summary": "a"}))
            .into_typed()
            .expect("typed");
        let from_text: S = AiOutput::Text("```\n{\"summary\": \"b\"}\n```".into())
            .into_typed()
            .expect("typed");
        assert_eq!(from_json.summary, "a");
        assert_eq!(from_text.summary, "b");
    }
}
