//! # resume2md
//!
//! Drive external PDF-to-Markdown converters over a folder of resumes, and
//! compare what two different converters make of the same document.
//!
//! The conversion itself is delegated entirely to command-line tools
//! (`docling`, `markitdown`). This crate decides which documents to convert,
//! runs the tools one at a time, checks their exit status, and reports.
//!
//! ## Flows
//!
//! ```text
//! batch    scan ─▶ skip already converted ─▶ convert each (failures recorded) ─▶ summary
//! compare  scan ─▶ pick one at random ─▶ convert with A and B ─▶ sizes, previews, diff
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume2md::{run_batch, BatchConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .source_dir("./downloaded-resumes")
//!         .build()?;
//!     let summary = run_batch(&config)?;
//!     eprintln!("{}/{} converted", summary.succeeded(), summary.attempted());
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without the tools
//!
//! Every process goes through [`ProcessRunner`]; pass a fake to
//! [`run_batch_with`] or [`run_compare_with`] to exercise the flows without
//! spawning anything.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod compare;
pub mod config;
pub mod converter;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod policy;
pub mod process;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{run_batch, run_batch_with};
pub use compare::{run_compare, run_compare_with};
pub use config::{BatchConfig, BatchConfigBuilder, CompareConfig, CompareConfigBuilder};
pub use converter::{ConverterKind, ExternalConverter, OutputTarget};
pub use error::{DriverError, ItemError};
pub use output::{BatchSummary, ComparisonReport, ConversionResult, SideReport};
pub use pipeline::scan::InputDocument;
pub use pipeline::text::Decoding;
pub use policy::{ConversionPolicy, SiblingMarkdownExists};
pub use process::{ProcessOutput, ProcessRunner, SystemRunner};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
