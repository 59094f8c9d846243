//! Error types for the resume2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DriverError`]: **Fatal.** the run cannot proceed at all (source
//!   directory missing, output directory not writable, a comparator side
//!   failed). Returned as `Err(DriverError)` from [`crate::batch::run_batch`]
//!   and [`crate::compare::run_compare`].
//!
//! * [`ItemError`]: **Non-fatal.** one converter invocation on one document
//!   failed. Stored inside [`crate::output::ConversionResult`] so a batch can
//!   report the failure and move on to the next document.
//!
//! The comparator needs both sides to succeed, so it lifts an [`ItemError`]
//! into [`DriverError::ConverterFailed`]; the batch converter never does.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the resume2md library.
#[derive(Debug, Error)]
pub enum DriverError {
    // ── Setup errors ──────────────────────────────────────────────────────
    /// The source directory does not exist.
    #[error("Source directory not found: '{path}'")]
    SourceDirNotFound { path: PathBuf },

    /// The source directory exists but holds no matching documents.
    #[error("No .{extension} files found in '{path}'")]
    NoInputDocuments { path: PathBuf, extension: String },

    /// Directory enumeration failed part-way.
    #[error("Failed to scan '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An explicitly requested input document does not exist.
    #[error("Input document not found: '{path}'")]
    InputNotFound { path: PathBuf },

    /// Could not create an output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// A converter failed during a comparison; the report cannot be built.
    #[error("Failed to convert with {tool}: {source}")]
    ConverterFailed {
        tool: String,
        #[source]
        source: ItemError,
    },

    // ── Read errors ───────────────────────────────────────────────────────
    /// Could not read a converter's output file.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output was not valid UTF-8 and strict decoding was requested.
    #[error("'{path}' is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidUtf8 { path: PathBuf, offset: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single converter invocation.
///
/// Stored alongside [`crate::output::ConversionResult`] when an item fails.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ItemError {
    /// The converter process could not be started (not installed, not
    /// executable, …).
    #[error("{tool} could not be started: {detail}")]
    SpawnFailed { tool: String, detail: String },

    /// The converter ran but exited unsuccessfully.
    ///
    /// `code` is `None` when the process was terminated by a signal.
    #[error("{tool} exited with {}: {}", exit_label(.code), .stderr.trim())]
    ExitFailure {
        tool: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// The converter reported success but its expected output is absent.
    #[error("{tool} output file not found at '{}'", .path.display())]
    MissingOutput { tool: String, path: PathBuf },
}

impl ItemError {
    /// The diagnostic text most useful to an operator: the captured error
    /// stream for exit failures, the display message otherwise.
    pub fn detail(&self) -> String {
        match self {
            ItemError::ExitFailure { stderr, .. } if !stderr.trim().is_empty() => {
                stderr.trim().to_string()
            }
            other => other.to_string(),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match *code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_failure_display_includes_trimmed_stderr() {
        let e = ItemError::ExitFailure {
            tool: "docling".into(),
            code: Some(2),
            stdout: String::new(),
            stderr: "  boom: bad xref\n".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("docling"), "got: {msg}");
        assert!(msg.contains("status 2"), "got: {msg}");
        assert!(msg.ends_with("boom: bad xref"), "got: {msg}");
    }

    #[test]
    fn exit_failure_without_code_mentions_signal() {
        let e = ItemError::ExitFailure {
            tool: "markitdown".into(),
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(e.to_string().contains("signal"));
    }

    #[test]
    fn detail_prefers_stderr() {
        let e = ItemError::ExitFailure {
            tool: "docling".into(),
            code: Some(1),
            stdout: "ignored".into(),
            stderr: "Traceback: oops\n".into(),
        };
        assert_eq!(e.detail(), "Traceback: oops");

        let e = ItemError::SpawnFailed {
            tool: "docling".into(),
            detail: "No such file or directory".into(),
        };
        assert!(e.detail().contains("could not be started"));
    }

    #[test]
    fn converter_failed_wraps_item_error() {
        let e = DriverError::ConverterFailed {
            tool: "docling".into(),
            source: ItemError::MissingOutput {
                tool: "docling".into(),
                path: PathBuf::from("out/docling/cv.md"),
            },
        };
        let msg = e.to_string();
        assert!(msg.starts_with("Failed to convert with docling"), "got: {msg}");
        assert!(msg.contains("out/docling/cv.md"), "got: {msg}");
    }

    #[test]
    fn no_input_documents_display() {
        let e = DriverError::NoInputDocuments {
            path: PathBuf::from("downloaded-resumes"),
            extension: "pdf".into(),
        };
        assert!(e.to_string().contains(".pdf"));
        assert!(e.to_string().contains("downloaded-resumes"));
    }
}
