//! generateContent client for the stage-2 responder model.
//!
//! Same shape as the processor client: blocking HTTP, typed bodies, errors
//! surfaced through [`GenerateError`].

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::io::generate::{GenRequest, GenerateError, Generator};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
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
    #[serde(default)]
    text: String,
}

/// Gemini generateContent backend.
#[derive(Debug)]
pub struct GeminiGenerator {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiGenerator {
    pub fn from_config(config: &Config) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL.to_string())
    }

    /// Custom base URL constructor (for tests against local mock servers).
    pub fn with_base_url(config: &Config, base_url: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("reqwest client should build with static options");
        Self {
            http,
            api_key: config.gemini_api_key.clone(),
            base_url,
            model: config.responder_model.clone(),
        }
    }
}

impl Generator for GeminiGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn generate(&self, request: &GenRequest<'_>) -> Result<String, GenerateError> {
        if self.api_key.is_empty() {
            return Err(GenerateError::MissingApiKey);
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
            system_instruction: request.system.map(|text| Content {
                parts: vec![Part { text }],
            }),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!(model = %self.model, "sending generateContent request");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = response.status().as_u16();
        let body = response.text().unwrap_or_else(|_| "(no body)".to_string());
        if status >= 400 {
            return Err(GenerateError::Api {
                status,
                message: body,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| GenerateError::InvalidResponse(format!("parse response body: {err}")))?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerateError::InvalidResponse("no candidates in response".to_string()))?;
        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        // The API can legally return an empty candidate; surface a
        // placeholder instead of failing the stage.
        if text.is_empty() {
            return Ok("No response generated".to_string());
        }
        Ok(text)
    }
}
