//! Configuration types for the batch converter and the comparator.
//!
//! Each flow is controlled through one struct built via its builder:
//! [`BatchConfig`] / [`BatchConfigBuilder`] and [`CompareConfig`] /
//! [`CompareConfigBuilder`]. Callers set only what they care about and rely
//! on the defaults for the rest, which reproduce the conventional operator
//! layout (`./downloaded-resumes` in, `./pdf-comparison` for comparisons).

use crate::converter::ExternalConverter;
use crate::error::DriverError;
use crate::pipeline::text::Decoding;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Directory scanned for input documents when none is given.
pub const DEFAULT_SOURCE_DIR: &str = "./downloaded-resumes";

/// Directory the comparator writes both outputs into.
pub const DEFAULT_COMPARE_DIR: &str = "./pdf-comparison";

/// Extension (without the dot) of input documents.
pub const INPUT_EXTENSION: &str = "pdf";

/// Extension (without the dot) of converted Markdown.
pub const OUTPUT_EXTENSION: &str = "md";

/// Lines of each output shown in the comparison report.
pub const DEFAULT_PREVIEW_LINES: usize = 50;

/// Unified-diff context lines around each change.
pub const DEFAULT_DIFF_CONTEXT: usize = 3;

/// Maximum diff lines printed in the comparison report.
pub const DEFAULT_DIFF_LINE_LIMIT: usize = 100;

// ── Batch ────────────────────────────────────────────────────────────────

/// Configuration for a batch conversion run.
#[derive(Clone)]
pub struct BatchConfig {
    /// Directory scanned for `*.pdf` documents.
    pub source_dir: PathBuf,

    /// Directory the converter writes `<stem>.md` into and the
    /// already-converted check looks in. `None` means `source_dir`.
    pub output_dir: Option<PathBuf>,

    /// Converter invoked once per document that still needs conversion.
    /// Default: docling.
    pub converter: ExternalConverter,

    /// Partition and report without invoking the converter. Default: false.
    pub dry_run: bool,

    /// Receives per-item events while the batch runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: None,
            converter: ExternalConverter::docling(),
            dry_run: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("source_dir", &self.source_dir)
            .field("output_dir", &self.output_dir)
            .field("converter", &self.converter)
            .field("dry_run", &self.dry_run)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// The directory outputs land in: `output_dir`, else `source_dir`.
    pub fn effective_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.source_dir.clone())
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.source_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn converter(mut self, converter: ExternalConverter) -> Self {
        self.config.converter = converter;
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, DriverError> {
        let c = &self.config;
        if c.source_dir.as_os_str().is_empty() {
            return Err(DriverError::InvalidConfig(
                "Source directory must not be empty".into(),
            ));
        }
        c.converter.validate()?;
        Ok(self.config)
    }
}

// ── Compare ──────────────────────────────────────────────────────────────

/// Configuration for a dual-converter comparison run.
#[derive(Clone)]
pub struct CompareConfig {
    /// Directory the random input document is chosen from.
    pub source_dir: PathBuf,

    /// Compare a specific document instead of picking one at random.
    pub input: Option<PathBuf>,

    /// Directory both converters write into.
    pub output_dir: PathBuf,

    /// The "from" side of the diff. Default: markitdown.
    pub converter_a: ExternalConverter,

    /// The "to" side of the diff. Default: docling.
    pub converter_b: ExternalConverter,

    /// Seed for the random choice; `None` uses the thread RNG.
    pub seed: Option<u64>,

    /// Lines of each output shown in the preview sections. Default: 50.
    pub preview_lines: usize,

    /// Context lines around each diff hunk. Default: 3.
    pub diff_context: usize,

    /// Maximum diff lines kept in the report. Default: 100.
    pub diff_line_limit: usize,

    /// How undecodable bytes in converter output are handled.
    /// Default: [`Decoding::DropInvalid`].
    pub decoding: Decoding,

    /// Receives one start/complete event per converter.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            input: None,
            output_dir: PathBuf::from(DEFAULT_COMPARE_DIR),
            converter_a: ExternalConverter::markitdown(),
            converter_b: ExternalConverter::docling(),
            seed: None,
            preview_lines: DEFAULT_PREVIEW_LINES,
            diff_context: DEFAULT_DIFF_CONTEXT,
            diff_line_limit: DEFAULT_DIFF_LINE_LIMIT,
            decoding: Decoding::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CompareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareConfig")
            .field("source_dir", &self.source_dir)
            .field("input", &self.input)
            .field("output_dir", &self.output_dir)
            .field("converter_a", &self.converter_a)
            .field("converter_b", &self.converter_b)
            .field("seed", &self.seed)
            .field("preview_lines", &self.preview_lines)
            .field("diff_context", &self.diff_context)
            .field("diff_line_limit", &self.diff_line_limit)
            .field("decoding", &self.decoding)
            .finish()
    }
}

impl CompareConfig {
    /// Create a new builder for `CompareConfig`.
    pub fn builder() -> CompareConfigBuilder {
        CompareConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CompareConfig`].
#[derive(Debug)]
pub struct CompareConfigBuilder {
    config: CompareConfig,
}

impl CompareConfigBuilder {
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.source_dir = dir.into();
        self
    }

    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input = Some(path.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn converter_a(mut self, converter: ExternalConverter) -> Self {
        self.config.converter_a = converter;
        self
    }

    pub fn converter_b(mut self, converter: ExternalConverter) -> Self {
        self.config.converter_b = converter;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn preview_lines(mut self, n: usize) -> Self {
        self.config.preview_lines = n;
        self
    }

    pub fn diff_context(mut self, n: usize) -> Self {
        self.config.diff_context = n;
        self
    }

    pub fn diff_line_limit(mut self, n: usize) -> Self {
        self.config.diff_line_limit = n;
        self
    }

    pub fn decoding(mut self, decoding: Decoding) -> Self {
        self.config.decoding = decoding;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CompareConfig, DriverError> {
        let c = &self.config;
        c.converter_a.validate()?;
        c.converter_b.validate()?;
        if c.converter_a.name() == c.converter_b.name() {
            return Err(DriverError::InvalidConfig(format!(
                "Both sides use the converter name '{}'; their outputs would collide",
                c.converter_a.name()
            )));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(DriverError::InvalidConfig(
                "Comparison output directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
