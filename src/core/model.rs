//! Pipeline data model
//!
//! Every stage of a run (reconstruct, search, render, write) exchanges the
//! types defined here.

use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of context sources kept per fragment
pub const MAX_SOURCES: usize = 5;

pub const NO_TITLE: &str = "No title";
pub const NO_URL: &str = "No URL";
pub const NO_SNIPPET: &str = "No snippet";

/// A single operator-supplied fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// 1-based position in the run, used for the report filename
    pub ordinal: usize,
    text: String,
}

impl Fragment {
    /// Build a fragment from raw input. Returns `None` for blank input.
    pub fn new(ordinal: usize, raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            ordinal,
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Why a reconstruction produced no usable text
#[derive(Debug, Error)]
pub enum ReconstructError {
    /// The generation provider call failed (network, HTTP status, parsing)
    #[error("Error in reconstruction: {0:#}")]
    Provider(#[source] anyhow::Error),

    /// The provider answered, but with nothing usable
    #[error("Reconstruction failed: no response from the model")]
    EmptyResponse,
}

impl ReconstructError {
    /// Short machine-friendly kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ReconstructError::Provider(_) => "provider",
            ReconstructError::EmptyResponse => "empty_response",
        }
    }
}

/// Outcome of the reconstruction step
pub type Reconstruction = Result<String, ReconstructError>;

/// A raw hit as returned by a search provider. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
}

/// A context source shown in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SourceRecord {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

impl From<SearchHit> for SourceRecord {
    fn from(hit: SearchHit) -> Self {
        fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| placeholder.to_string())
        }

        Self {
            title: or_placeholder(hit.title, NO_TITLE),
            url: or_placeholder(hit.url, NO_URL),
            snippet: or_placeholder(hit.snippet, NO_SNIPPET),
        }
    }
}

/// What happened to one fragment
#[derive(Debug)]
pub enum FragmentOutcome {
    /// Report printed and written to `path`
    Reported { path: PathBuf, sources: usize },
    /// Reconstruction failed; no search, no report
    Skipped { reason: String },
    /// Report printed, but the file could not be written
    Unsaved { reason: String },
}

/// Tally of a whole run, with every fragment's outcome in input order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reported: usize,
    pub skipped: usize,
    pub unsaved: usize,
    pub outcomes: Vec<FragmentOutcome>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: FragmentOutcome) {
        match outcome {
            FragmentOutcome::Reported { .. } => self.reported += 1,
            FragmentOutcome::Skipped { .. } => self.skipped += 1,
            FragmentOutcome::Unsaved { .. } => self.unsaved += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}
