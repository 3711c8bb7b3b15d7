//! Error adapter for converting PetriLayoutError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # JSON Parse Errors
//!
//! `serde_json` reports failures as a line and column. The adapter turns that
//! position into a byte offset into the original document so miette can
//! underline the offending character.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};
use serde_json::error::Category;

use petri_layout::PetriLayoutError;

/// Adapter for a JSON parse failure together with its source document.
pub struct ParseDiagnosticAdapter<'a> {
    /// The wrapped parser error
    err: &'a serde_json::Error,
    /// Source document for displaying snippets
    src: &'a str,
}

impl<'a> ParseDiagnosticAdapter<'a> {
    /// Create a new parse diagnostic adapter.
    pub fn new(err: &'a serde_json::Error, src: &'a str) -> Self {
        Self { err, src }
    }

    fn span(&self) -> SourceSpan {
        let offset = byte_offset(self.src, self.err.line(), self.err.column());
        let len = usize::from(offset < self.src.len());
        SourceSpan::new(offset.into(), len)
    }
}

impl fmt::Debug for ParseDiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseDiagnosticAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for ParseDiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.err)
    }
}

impl std::error::Error for ParseDiagnosticAdapter<'_> {}

impl MietteDiagnostic for ParseDiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("petri_layout::parse"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.err.classify() {
            Category::Data => {
                "nodes need `id` and `shapeKind`; arcs need `id`, `source` and `target`"
            }
            Category::Eof => "the document ends early; check for unclosed brackets",
            Category::Syntax | Category::Io => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let message = match self.err.classify() {
            Category::Syntax => "invalid JSON",
            Category::Data => "unexpected value",
            Category::Eof => "input ends here",
            Category::Io => return None,
        };
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some(message.to_string()), self.span()),
        )))
    }
}

/// Adapter for non-diagnostic [`PetriLayoutError`] variants.
///
/// This adapter handles errors that don't carry a source document, such as
/// I/O errors, graph errors, layout errors, and configuration errors.
pub struct ErrorAdapter<'a>(pub &'a PetriLayoutError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            PetriLayoutError::Io(_) => "petri_layout::io",
            PetriLayoutError::Parse { .. } => return None,
            PetriLayoutError::Serialize(_) => "petri_layout::serialize",
            PetriLayoutError::Graph(_) => "petri_layout::graph",
            PetriLayoutError::Layout(_) => "petri_layout::layout",
            PetriLayoutError::Config(_) => "petri_layout::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        None
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
///
/// This enum wraps either a parse diagnostic or a non-diagnostic error,
/// providing a uniform interface for error rendering.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A JSON parse failure with source location information.
    Diagnostic(ParseDiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Byte offset of a 1-based line and column, clamped to the source length.
fn byte_offset(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(src.len())
}

/// Convert a [`PetriLayoutError`] into a list of reportable errors.
///
/// [`PetriLayoutError::Parse`] becomes a [`Reportable::Diagnostic`] pointing
/// into the source document; every other variant becomes a single
/// [`Reportable::Error`].
pub fn to_reportables(err: &PetriLayoutError) -> Vec<Reportable<'_>> {
    match err {
        PetriLayoutError::Parse {
            err: parse_err,
            src,
        } => vec![Reportable::Diagnostic(ParseDiagnosticAdapter::new(
            parse_err, src,
        ))],
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}
