//! Batch conversion: convert every document in a directory that does not
//! have Markdown output yet.
//!
//! Documents are attempted one at a time, in directory enumeration order.
//! A failed conversion is recorded in the [`BatchSummary`] and the run moves
//! on; it is never retried within the same run. Because the skip check is
//! name-based, running the batch again after a full success invokes
//! nothing.

use crate::config::{BatchConfig, INPUT_EXTENSION};
use crate::error::DriverError;
use crate::output::BatchSummary;
use crate::pipeline::scan::{scan_documents, InputDocument};
use crate::policy::{ConversionPolicy, SiblingMarkdownExists};
use crate::process::{ProcessRunner, SystemRunner};
use tracing::{debug, info, warn};

/// Run a batch with real processes and the default skip policy.
///
/// # Returns
/// `Ok(BatchSummary)` whenever orchestration succeeded, even if individual
/// conversions failed (check [`BatchSummary::failed`]). A missing source
/// directory or one without PDFs yields an all-zero summary.
///
/// # Errors
/// Only for fatal problems: the directory could not be enumerated or the
/// output directory could not be created.
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary, DriverError> {
    run_batch_with(config, &SystemRunner, &SiblingMarkdownExists)
}

/// [`run_batch`] with an injected process runner and skip policy.
pub fn run_batch_with<R, P>(
    config: &BatchConfig,
    runner: &R,
    policy: &P,
) -> Result<BatchSummary, DriverError>
where
    R: ProcessRunner + ?Sized,
    P: ConversionPolicy + ?Sized,
{
    let output_dir = config.effective_output_dir();
    let mut summary = BatchSummary {
        source_dir: config.source_dir.clone(),
        output_dir: output_dir.clone(),
        dry_run: config.dry_run,
        ..BatchSummary::default()
    };

    // ── Step 1: Scan ─────────────────────────────────────────────────────
    let docs = match scan_documents(&config.source_dir, INPUT_EXTENSION) {
        Ok(docs) => docs,
        Err(DriverError::SourceDirNotFound { path }) => {
            warn!("Source directory {} not found; nothing to convert", path.display());
            return Ok(summary);
        }
        Err(e) => return Err(e),
    };
    if docs.is_empty() {
        info!("No PDF files found in {}", config.source_dir.display());
        return Ok(summary);
    }

    // ── Step 2: Partition ────────────────────────────────────────────────
    let total = docs.len();
    let pending: Vec<InputDocument> = docs
        .into_iter()
        .filter(|d| {
            let done = policy.is_converted(d, &output_dir);
            if done {
                debug!("Skipping {}: output exists", d.name());
            }
            !done
        })
        .collect();

    summary.total = total;
    summary.needs_conversion = pending.len();
    summary.already_converted = total - pending.len();
    info!(
        "Total PDFs: {}, already converted: {}, need conversion: {}",
        summary.total, summary.already_converted, summary.needs_conversion
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(
            summary.total,
            summary.already_converted,
            summary.needs_conversion,
        );
    }

    if config.dry_run {
        summary.pending = pending.iter().map(|d| d.path().to_path_buf()).collect();
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_complete(0, 0);
        }
        return Ok(summary);
    }

    if !pending.is_empty() {
        std::fs::create_dir_all(&output_dir).map_err(|source| DriverError::OutputDirFailed {
            path: output_dir.clone(),
            source,
        })?;
    }

    // ── Step 3: Convert one at a time ────────────────────────────────────
    let n = pending.len();
    for (i, doc) in pending.iter().enumerate() {
        let index = i + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_start(index, n, doc.path(), config.converter.name());
        }

        let target = config.converter.batch_target(&output_dir, doc);
        let result = config.converter.run(runner, doc, &target);

        match (&result.output_path, &result.error) {
            (_, Some(err)) => {
                warn!("[{}/{}] {} failed: {}", index, n, doc.name(), err);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_error(index, n, doc.path(), err);
                }
            }
            (Some(out), None) => {
                if !out.exists() {
                    warn!(
                        "[{}/{}] {} exited successfully but {} does not exist",
                        index,
                        n,
                        config.converter.name(),
                        out.display()
                    );
                }
                info!("[{}/{}] Converted {}", index, n, doc.name());
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_complete(index, n, doc.path(), out);
                }
            }
            (None, None) => {}
        }

        summary.results.push(result);
    }

    info!(
        "Batch complete: {}/{} converted",
        summary.succeeded(),
        summary.attempted()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(summary.attempted(), summary.succeeded());
    }

    Ok(summary)
}
