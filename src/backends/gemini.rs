//! Gemini text generation
//!
//! Calls `models/{model}:generateContent` and returns the text of the first
//! candidate.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ensure_success, Generator};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: usize = 256;

pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiGenerator {
    pub fn new(api_key: String, model: String, base_url: String, client: Client) -> Self {
        Self {
            api_key,
            model,
            base_url,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl Generator for GeminiGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(self.api_key.trim()).context("invalid Gemini API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let endpoint = self.endpoint();
        debug!(model = %self.model, prompt_chars = prompt.len(), "calling Gemini");
        let resp = self
            .client
            .post(&endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .with_context(|| format!("failed to call Gemini at {}", endpoint))?;
        let resp = ensure_success(resp, "Gemini")?;

        let parsed: GenerateResponse = resp.json().context("failed to parse Gemini response")?;
        let text = parsed.first_text();
        debug!(response_chars = text.len(), "Gemini responded");
        Ok(text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
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

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, or "" when there is none
    fn first_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}
