//! Reconstruction flow
//!
//! Asks the generation provider for the most likely original text of a
//! fragment. Failures come back as a typed [`ReconstructError`], never as
//! text that could be mistaken for a reconstruction.

use tracing::{debug, warn};

use crate::backends::Generator;
use crate::core::model::{ReconstructError, Reconstruction};

/// Build the instruction prompt for one fragment
pub fn build_prompt(fragment: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are an expert in reconstructing corrupted or fragmented digital text from old internet archives.\n");
    prompt.push_str(&format!("The fragment is: \"{}\"\n\n", fragment));
    prompt.push_str("Reconstruct it to form coherent, original English text. Consider:\n");
    prompt.push_str("- Typos, leetspeak (e.g., 3=E, 1=I, 0=O), missing letters, or garbled encoding.\n");
    prompt.push_str("- Context from the early web (1990s-2000s forums, emails, ASCII art).\n");
    prompt.push_str("- Keep it concise (1-2 sentences max).\n");
    prompt.push_str("- If ambiguous, choose the most likely historical/internet-related meaning.\n\n");
    prompt.push_str("Output ONLY the reconstructed text, nothing else.\n");
    prompt
}

/// Reconstruct a fragment with the given provider
pub fn reconstruct(generator: &dyn Generator, fragment: &str) -> Reconstruction {
    let prompt = build_prompt(fragment);
    let response = generator.generate(&prompt).map_err(|err| {
        warn!(error = %format!("{:#}", err), "generation provider failed");
        ReconstructError::Provider(err)
    })?;

    let text = response.trim();
    if text.is_empty() {
        warn!("generation provider returned an empty response");
        return Err(ReconstructError::EmptyResponse);
    }

    debug!(chars = text.len(), "reconstruction received");
    Ok(text.to_string())
}
