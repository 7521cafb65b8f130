//! Flows module - The reconstruction pipeline steps
//!
//! - reconstruct: fragment -> reconstructed text (generation provider)
//! - context: reconstructed text -> context sources (search provider)
//! - pipeline: drives both steps per fragment and writes the reports

pub mod context;
pub mod pipeline;
pub mod reconstruct;
