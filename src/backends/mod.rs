//! Backends module - External provider integrations
//!
//! Provides:
//! - gemini: text generation via the Gemini REST API
//! - duckduckgo: web search via the DuckDuckGo HTML endpoint
//!
//! The pipeline only sees the [`Generator`] and [`WebSearch`] traits, so tests
//! can swap in stubs.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

use crate::core::model::SearchHit;

pub mod duckduckgo;
pub mod gemini;

pub use duckduckgo::DuckDuckGoSearch;
pub use gemini::GeminiGenerator;

const USER_AGENT: &str = concat!("chronos/", env!("CARGO_PKG_VERSION"));

/// Text-generation capability
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Web-search capability
pub trait WebSearch {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Build the blocking HTTP client shared by the providers
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

/// Turn a non-success response into an error carrying status and body
fn ensure_success(
    resp: reqwest::blocking::Response,
    provider: &str,
) -> Result<reqwest::blocking::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp
        .text()
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    anyhow::bail!("{} returned {}: {}", provider, status, body.trim())
}
