//! Result types returned by the two flows, and the text rendering of the
//! comparison report.
//!
//! Everything here is `Serialize` so the CLI can emit `--json` without a
//! second set of types.

use crate::error::ItemError;
use crate::pipeline::scan::InputDocument;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Outcome of one converter invocation on one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub document: PathBuf,
    pub converter: String,
    /// Where the Markdown is expected, set on success.
    pub output_path: Option<PathBuf>,
    /// Set on failure.
    pub error: Option<ItemError>,
}

impl ConversionResult {
    pub(crate) fn new(
        doc: &InputDocument,
        converter: &str,
        outcome: Result<PathBuf, ItemError>,
    ) -> Self {
        let (output_path, error) = match outcome {
            Ok(p) => (Some(p), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            document: doc.path().to_path_buf(),
            converter: converter.to_string(),
            output_path,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Turn a success whose output file does not exist into
    /// [`ItemError::MissingOutput`].
    pub fn verify_output(mut self) -> Self {
        if let Some(path) = self.output_path.take() {
            if path.exists() {
                self.output_path = Some(path);
            } else {
                self.error = Some(ItemError::MissingOutput {
                    tool: self.converter.clone(),
                    path,
                });
            }
        }
        self
    }

    /// Split into the output path or the error.
    pub fn into_result(self) -> Result<PathBuf, ItemError> {
        match (self.output_path, self.error) {
            (_, Some(e)) => Err(e),
            (Some(p), None) => Ok(p),
            (None, None) => Err(ItemError::MissingOutput {
                tool: self.converter,
                path: PathBuf::new(),
            }),
        }
    }
}

/// Totals and per-item results of one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Matching documents found (N).
    pub total: usize,
    /// Documents skipped because their output already exists (M).
    pub already_converted: usize,
    /// Documents that needed conversion (N − M).
    pub needs_conversion: usize,
    /// Nothing was invoked; `results` is empty.
    pub dry_run: bool,
    /// Documents that needed conversion, in processing order. Filled only
    /// for dry runs, where `results` stays empty.
    pub pending: Vec<PathBuf>,
    /// One entry per attempted conversion, in processing order.
    pub results: Vec<ConversionResult>,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// One converter's side of a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideReport {
    pub converter: String,
    pub output_path: PathBuf,
    pub size_bytes: u64,
    /// The first lines of the output, in order.
    pub preview: Vec<String>,
}

/// The full comparison of two converters on one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub document: PathBuf,
    pub a: SideReport,
    pub b: SideReport,
    /// Unified diff from `a` to `b`, truncated to `diff_line_limit` lines.
    pub diff: Vec<String>,
    /// Length of the diff before truncation.
    pub diff_total_lines: usize,
    pub preview_lines: usize,
    pub diff_line_limit: usize,
}

const RULE_WIDTH: usize = 80;

impl ComparisonReport {
    pub fn document_name(&self) -> String {
        self.document
            .file_name()
            .unwrap_or(self.document.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    pub fn is_diff_truncated(&self) -> bool {
        self.diff_total_lines > self.diff.len()
    }

    /// Render the report as sectioned text, in a fixed order: document,
    /// sizes, preview A, preview B, diff, output paths.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let width = self.a.converter.len().max(self.b.converter.len()) + 1;

        writeln!(f, "Selected PDF: {}", self.document_name())?;
        writeln!(f, "{rule}")?;

        writeln!(f, "\nFile sizes:")?;
        for side in [&self.a, &self.b] {
            writeln!(
                f,
                "  {:<width$} {} bytes",
                format!("{}:", side.converter),
                group_thousands(side.size_bytes)
            )?;
        }

        for side in [&self.a, &self.b] {
            writeln!(f, "\n{rule}")?;
            writeln!(
                f,
                "{} OUTPUT (first {} lines):",
                side.converter.to_uppercase(),
                self.preview_lines
            )?;
            writeln!(f, "{rule}")?;
            for line in &side.preview {
                writeln!(f, "{line}")?;
            }
        }

        writeln!(f, "\n{rule}")?;
        writeln!(f, "DIFF (first {} lines):", self.diff_line_limit)?;
        writeln!(f, "{rule}")?;
        if self.diff.is_empty() {
            writeln!(f, "(outputs are identical)")?;
        }
        for line in &self.diff {
            writeln!(f, "{line}")?;
        }
        if self.is_diff_truncated() {
            writeln!(
                f,
                "… {} more diff lines not shown",
                self.diff_total_lines - self.diff.len()
            )?;
        }

        writeln!(f, "\n\nFull outputs saved to:")?;
        for side in [&self.a, &self.b] {
            writeln!(
                f,
                "  {:<width$} {}",
                format!("{}:", side.converter),
                side.output_path.display()
            )?;
        }
        Ok(())
    }
}

/// `1234567` → `"1,234,567"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
