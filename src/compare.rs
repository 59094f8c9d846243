//! Dual-converter comparison of one randomly chosen document.
//!
//! ```text
//! scan ──▶ pick one ──▶ converter A ──▶ converter B ──▶ read + diff ──▶ report
//! ```
//!
//! Both sides must succeed. A non-zero exit, a failed spawn, or a missing
//! output file on either side aborts with [`DriverError::ConverterFailed`]
//! before anything is read; there is no partial report.

use crate::config::{CompareConfig, INPUT_EXTENSION};
use crate::converter::ExternalConverter;
use crate::error::DriverError;
use crate::output::{ComparisonReport, SideReport};
use crate::pipeline::diff::unified_diff;
use crate::pipeline::scan::{scan_documents, select_random, InputDocument};
use crate::pipeline::text::{head, read_lines};
use crate::process::{ProcessRunner, SystemRunner};
use std::path::{Path, PathBuf};
use tracing::info;

/// Compare the configured converters on one document using real processes.
pub fn run_compare(config: &CompareConfig) -> Result<ComparisonReport, DriverError> {
    run_compare_with(config, &SystemRunner)
}

/// [`run_compare`] with an injected process runner.
pub fn run_compare_with<R>(config: &CompareConfig, runner: &R) -> Result<ComparisonReport, DriverError>
where
    R: ProcessRunner + ?Sized,
{
    // ── Step 1: Choose the document ──────────────────────────────────────
    let doc = choose_document(config)?;
    info!("Selected PDF: {}", doc.name());

    // ── Step 2: Convert with both tools ──────────────────────────────────
    create_dir(&config.output_dir)?;
    let a_path = convert_side(config, runner, &config.converter_a, &doc, 1)?;
    let b_path = convert_side(config, runner, &config.converter_b, &doc, 2)?;

    // ── Step 3: Read, preview, diff ──────────────────────────────────────
    let a_lines = read_lines(&a_path, config.decoding)?;
    let b_lines = read_lines(&b_path, config.decoding)?;

    let mut diff = unified_diff(
        &a_lines,
        &b_lines,
        &format!("{} output", config.converter_a.name()),
        &format!("{} output", config.converter_b.name()),
        config.diff_context,
    );
    let diff_total_lines = diff.len();
    diff.truncate(config.diff_line_limit);

    let report = ComparisonReport {
        document: doc.path().to_path_buf(),
        a: side_report(&config.converter_a, a_path, &a_lines, config.preview_lines)?,
        b: side_report(&config.converter_b, b_path, &b_lines, config.preview_lines)?,
        diff,
        diff_total_lines,
        preview_lines: config.preview_lines,
        diff_line_limit: config.diff_line_limit,
    };
    info!(
        "Comparison complete: {} diff lines ({} shown)",
        report.diff_total_lines,
        report.diff.len()
    );
    Ok(report)
}

/// The explicit input if one was given, else a random scan result.
fn choose_document(config: &CompareConfig) -> Result<InputDocument, DriverError> {
    if let Some(ref input) = config.input {
        if !input.is_file() {
            return Err(DriverError::InputNotFound {
                path: input.clone(),
            });
        }
        return Ok(InputDocument::new(input.clone()));
    }

    let docs = scan_documents(&config.source_dir, INPUT_EXTENSION)?;
    select_random(&docs, config.seed)
        .cloned()
        .ok_or_else(|| DriverError::NoInputDocuments {
            path: config.source_dir.clone(),
            extension: INPUT_EXTENSION.to_string(),
        })
}

fn create_dir(dir: &Path) -> Result<(), DriverError> {
    std::fs::create_dir_all(dir).map_err(|source| DriverError::OutputDirFailed {
        path: dir.to_path_buf(),
        source,
    })
}

/// Run one converter and return its verified output path.
fn convert_side<R>(
    config: &CompareConfig,
    runner: &R,
    converter: &ExternalConverter,
    doc: &InputDocument,
    index: usize,
) -> Result<PathBuf, DriverError>
where
    R: ProcessRunner + ?Sized,
{
    info!("Converting with {}...", converter.name());
    if let Some(ref cb) = config.progress_callback {
        cb.on_item_start(index, 2, doc.path(), converter.name());
    }

    let target = converter.compare_target(&config.output_dir);
    if let Some(dir) = target.directory() {
        create_dir(dir)?;
    }

    let result = converter.run(runner, doc, &target).verify_output();
    match result.into_result() {
        Ok(path) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_item_complete(index, 2, doc.path(), &path);
            }
            Ok(path)
        }
        Err(source) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_item_error(index, 2, doc.path(), &source);
            }
            Err(DriverError::ConverterFailed {
                tool: converter.name().to_string(),
                source,
            })
        }
    }
}

fn side_report(
    converter: &ExternalConverter,
    output_path: PathBuf,
    lines: &[String],
    preview_lines: usize,
) -> Result<SideReport, DriverError> {
    let size_bytes = std::fs::metadata(&output_path)
        .map_err(|source| DriverError::ReadFailed {
            path: output_path.clone(),
            source,
        })?
        .len();
    Ok(SideReport {
        converter: converter.name().to_string(),
        output_path,
        size_bytes,
        preview: head(lines, preview_lines),
    })
}
