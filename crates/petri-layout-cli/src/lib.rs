//! CLI logic for the Petri net layout tool.
//!
//! This module reads a net document, lays it out and writes the routed
//! document back as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use petri_layout::{
    LayoutDirection, LayoutMode, NetLayouter, PetriLayoutError, records::NetDocument,
};

/// Run the Petri net layout CLI application
///
/// This function processes the input file through the layout pipeline
/// and writes the routed document to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `PetriLayoutError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - JSON parsing errors
/// - Duplicate node identifiers
/// - Serialization errors
pub fn run(args: &Args) -> Result<(), PetriLayoutError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing net"
    );

    // Load configuration
    let app_config = config::load_config(args.config.as_ref())?;
    let direction = resolve_direction(
        args.direction.as_deref(),
        app_config.layout().direction(),
    );
    let mode = if args.relayout {
        LayoutMode::Relayout
    } else {
        LayoutMode::Fresh
    };

    // Read input file
    let source = fs::read_to_string(&args.input)?;
    let document = NetDocument::from_json(&source)?;

    let layouter = NetLayouter::new(app_config);
    let routed = layouter.layout_document(&document, direction, mode)?;

    // Write output file
    fs::write(&args.output, routed.to_json_pretty()?)?;

    info!(output_file = args.output; "Routed net exported successfully");

    Ok(())
}

/// Command-line direction wins over the configured one; unknown names fall back.
fn resolve_direction(requested: Option<&str>, configured: LayoutDirection) -> LayoutDirection {
    let Some(requested) = requested else {
        return configured;
    };
    requested.parse().unwrap_or_else(|err| {
        warn!(err:%, fallback = configured.to_string(); "Ignoring layout direction");
        configured
    })
}
