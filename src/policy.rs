//! The "already converted" decision used by the batch converter.
//!
//! The default policy is name-based only: a document counts as converted as
//! soon as `<output_dir>/<stem>.md` exists, whatever it contains. An empty
//! or half-written file left by an interrupted run is therefore skipped on
//! the next run; delete it to force reconversion.

use crate::pipeline::scan::InputDocument;
use std::path::Path;

/// Decides whether a document can be skipped.
pub trait ConversionPolicy {
    fn is_converted(&self, doc: &InputDocument, output_dir: &Path) -> bool;
}

/// Converted iff a same-stem `.md` file exists in the output directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiblingMarkdownExists;

impl ConversionPolicy for SiblingMarkdownExists {
    fn is_converted(&self, doc: &InputDocument, output_dir: &Path) -> bool {
        output_dir.join(doc.output_file_name()).exists()
    }
}

impl<F> ConversionPolicy for F
where
    F: Fn(&InputDocument, &Path) -> bool,
{
    fn is_converted(&self, doc: &InputDocument, output_dir: &Path) -> bool {
        self(doc, output_dir)
    }
}
