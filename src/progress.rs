//! Progress-callback trait for per-item conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] (or the compare
//! builder) to receive events as each converter invocation starts and ends.
//! The library itself only logs through `tracing`; what the operator sees on
//! the terminal is entirely up to the callback.
//!
//! # Example
//!
//! ```rust
//! use resume2md::{BatchConfig, ConversionProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_item_complete(&self, index: usize, total: usize, _doc: &Path, _out: &Path) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{index}/{total} done");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ItemError;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch converter and the comparator around each converter
/// invocation.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Indices are 1-based.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after the scan, before any conversion.
    ///
    /// # Arguments
    /// * `total`: matching documents found
    /// * `already_converted`: documents skipped by the existence check
    /// * `needs_conversion`: documents that will be attempted
    fn on_batch_start(&self, total: usize, already_converted: usize, needs_conversion: usize) {
        let _ = (total, already_converted, needs_conversion);
    }

    /// Called just before a converter process is started.
    fn on_item_start(&self, index: usize, total: usize, document: &Path, converter: &str) {
        let _ = (index, total, document, converter);
    }

    /// Called when the converter exited successfully.
    fn on_item_complete(&self, index: usize, total: usize, document: &Path, output: &Path) {
        let _ = (index, total, document, output);
    }

    /// Called when the converter could not be started, failed, or left no
    /// output behind.
    fn on_item_error(&self, index: usize, total: usize, document: &Path, error: &ItemError) {
        let _ = (index, total, document, error);
    }

    /// Called once after every pending document has been attempted.
    fn on_batch_complete(&self, attempted: usize, succeeded: usize) {
        let _ = (attempted, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in the config structs.
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
