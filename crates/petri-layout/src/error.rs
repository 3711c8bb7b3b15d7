//! Error types for Petri net layout operations.
//!
//! This module provides the main error type [`PetriLayoutError`] which wraps
//! the error conditions that can occur while reading, laying out and writing
//! a net.

use std::io;

use thiserror::Error;

use crate::layout::LayoutError;

/// The main error type for Petri net layout operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the JSON source next to the parser error, so
/// callers can point at the offending line and column.
#[derive(Debug, Error)]
pub enum PetriLayoutError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: serde_json::Error, src: String },

    #[error("Serialization error: {0}")]
    Serialize(serde_json::Error),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PetriLayoutError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
