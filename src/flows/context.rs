//! Context search flow
//!
//! Looks up web sources for a reconstruction. Search problems are never
//! fatal: they print a diagnostic and yield no sources.

use colored::Colorize;
use tracing::{debug, info, warn};

use crate::backends::WebSearch;
use crate::core::model::{SourceRecord, MAX_SOURCES};
use crate::flows::pipeline::ProgressReporter;

/// Search for up to [`MAX_SOURCES`] context sources. Diagnostics go through
/// `progress` so they do not collide with a running spinner.
pub fn search_context(
    search: &dyn WebSearch,
    query: &str,
    progress: &dyn ProgressReporter,
) -> Vec<SourceRecord> {
    match search.search(query, MAX_SOURCES) {
        Ok(hits) => {
            let sources: Vec<SourceRecord> = hits
                .into_iter()
                .take(MAX_SOURCES)
                .map(SourceRecord::from)
                .collect();
            for (rank, source) in sources.iter().enumerate() {
                debug!(
                    rank = rank + 1,
                    title = %source.title,
                    url = %source.url,
                    snippet = %source.snippet,
                    "context source"
                );
            }
            info!(count = sources.len(), "context sources found");
            sources
        }
        Err(err) => {
            warn!(error = %format!("{:#}", err), "search provider failed");
            progress.notice(&format!("{} {:#}", "Search error:".yellow(), err));
            Vec::new()
        }
    }
}
