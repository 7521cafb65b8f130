//! DuckDuckGo web search
//!
//! Queries the HTML endpoint (no API key) and scrapes result blocks into
//! [`SearchHit`]s in ranking order.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{ensure_success, WebSearch};
use crate::core::model::SearchHit;
use crate::core::util::collapse_whitespace;

pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

static RESULT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.result").unwrap());
static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a.result__a").unwrap());
static SNIPPET_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".result__snippet").unwrap());

pub struct DuckDuckGoSearch {
    endpoint: String,
    client: Client,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: String, client: Client) -> Self {
        Self { endpoint, client }
    }
}

impl WebSearch for DuckDuckGoSearch {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        debug!(query, max_results, "searching DuckDuckGo");
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .with_context(|| format!("failed to call DuckDuckGo at {}", self.endpoint))?;
        let resp = ensure_success(resp, "DuckDuckGo")?;
        let body = resp
            .text()
            .context("failed to read DuckDuckGo response body")?;

        let hits = parse_results(&body, max_results);
        debug!(hits = hits.len(), "DuckDuckGo results parsed");
        Ok(hits)
    }
}

/// Extract up to `max_results` organic results from a result page
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    doc.select(&RESULT_SEL)
        .filter(|el| !is_ad(el))
        .map(|el| parse_result(&el))
        .filter(|hit| hit.title.is_some() || hit.url.is_some())
        .take(max_results)
        .collect()
}

fn is_ad(el: &ElementRef) -> bool {
    el.value().classes().any(|class| class == "result--ad")
}

fn parse_result(el: &ElementRef) -> SearchHit {
    let link = el.select(&TITLE_SEL).next();

    let title = link
        .map(|a| collapse_whitespace(&a.text().collect::<String>()))
        .filter(|t| !t.is_empty());
    let url = link
        .and_then(|a| a.value().attr("href"))
        .and_then(resolve_href);
    let snippet = el
        .select(&SNIPPET_SEL)
        .next()
        .map(|s| collapse_whitespace(&s.text().collect::<String>()))
        .filter(|s| !s.is_empty());

    SearchHit {
        title,
        url,
        snippet,
    }
}

/// Unwrap DuckDuckGo redirect links (`//duckduckgo.com/l/?uddg=<target>`)
pub fn resolve_href(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    let Ok(parsed) = Url::parse(&absolute) else {
        return Some(href.to_string());
    };

    let is_redirect = parsed
        .host_str()
        .map(|host| host.ends_with("duckduckgo.com"))
        .unwrap_or(false)
        && parsed.path().starts_with("/l/");
    if is_redirect {
        if let Some((_, target)) = parsed.query_pairs().find(|(key, _)| key == "uddg") {
            return Some(target.into_owned());
        }
    }

    Some(absolute)
}
