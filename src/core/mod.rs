//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Pipeline data model (fragments, sources, outcomes)
//! - Fragment input resolution
//! - The fixed-width report renderer
//! - Common text utilities

pub mod input;
pub mod model;
pub mod render;
pub mod util;
