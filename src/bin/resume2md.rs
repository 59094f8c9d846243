//! CLI binary for resume2md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `BatchConfig` / `CompareConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use resume2md::config::{
    DEFAULT_COMPARE_DIR, DEFAULT_DIFF_CONTEXT, DEFAULT_DIFF_LINE_LIMIT, DEFAULT_PREVIEW_LINES,
    DEFAULT_SOURCE_DIR,
};
use resume2md::{
    run_batch, run_compare, BatchConfig, BatchSummary, CompareConfig, ConversionProgressCallback,
    ConverterKind, Decoding, DriverError, ExternalConverter, ItemError, ProgressCallback,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Shorten converter diagnostics to their last non-empty line, at most
/// `max_chars` characters.
fn truncate_error(error: &str, max_chars: usize) -> String {
    let line = error
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim();
    if line.chars().count() > max_chars {
        let cut: String = line.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    } else {
        line.to_string()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

// ── Batch progress: indicatif bar ────────────────────────────────────────────

/// Terminal progress callback: a live progress bar plus one log line per
/// document.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize, already_converted: usize, needs_conversion: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(needs_conversion as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}  {}",
            cyan("◆"),
            bold(&format!("{total} PDFs")),
            dim(&format!(
                "{already_converted} already converted, {needs_conversion} to convert"
            ))
        ));
    }

    fn on_item_start(&self, _index: usize, _total: usize, document: &Path, _converter: &str) {
        self.bar.set_message(file_name(document));
    }

    fn on_item_complete(&self, index: usize, total: usize, document: &Path, _output: &Path) {
        self.bar.println(format!(
            "  {} [{:>3}/{:<3}] {}",
            green("✓"),
            index,
            total,
            file_name(document)
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, document: &Path, error: &ItemError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} [{:>3}/{:<3}] {}  {}",
            red("✗"),
            index,
            total,
            file_name(document),
            red(&truncate_error(&error.detail(), 80)),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, attempted: usize, succeeded: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if succeeded == 0 { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                attempted,
                red(&failed.to_string()),
            );
        }
    }
}

// ── Plain progress: one line per document ────────────────────────────────────

/// Line-oriented output for non-interactive runs (`--no-progress`).
struct PlainProgressCallback;

impl ConversionProgressCallback for PlainProgressCallback {
    fn on_batch_start(&self, total: usize, already_converted: usize, needs_conversion: usize) {
        eprintln!("Total PDFs: {total}");
        eprintln!("Already converted: {already_converted}");
        eprintln!("Need conversion: {needs_conversion}\n");
    }

    fn on_item_start(&self, index: usize, total: usize, document: &Path, _converter: &str) {
        eprint!("[{index}/{total}] Converting {}...", file_name(document));
        io::stderr().flush().ok();
    }

    fn on_item_complete(&self, _index: usize, _total: usize, _document: &Path, _output: &Path) {
        eprintln!(" ✅");
    }

    fn on_item_error(&self, _index: usize, _total: usize, _document: &Path, error: &ItemError) {
        eprintln!(" ❌ Error: {}", truncate_error(&error.detail(), 200));
    }

    fn on_batch_complete(&self, attempted: usize, succeeded: usize) {
        if attempted > 0 {
            eprintln!("\nConverted {succeeded}/{attempted}");
        }
    }
}

// ── Compare progress ─────────────────────────────────────────────────────────

struct CompareProgressCallback;

impl ConversionProgressCallback for CompareProgressCallback {
    fn on_item_start(&self, _index: usize, _total: usize, _document: &Path, converter: &str) {
        eprintln!("Converting with {converter}...");
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every PDF in ./downloaded-resumes that has no .md yet
  resume2md batch

  # Same, from another folder, writing Markdown elsewhere
  resume2md batch --source-dir ~/resumes --output-dir ~/resumes-md

  # Show what would be converted
  resume2md batch --dry-run

  # Compare markitdown and docling on a random resume
  resume2md compare

  # Reproducible choice, machine-readable report
  resume2md compare --seed 42 --json > report.json

  # Compare on a specific file
  resume2md compare --input ./downloaded-resumes/jane_doe.pdf

ENVIRONMENT VARIABLES:
  RESUME2MD_SOURCE_DIR    Directory scanned for *.pdf
  RESUME2MD_DOCLING       Path to the docling executable
  RESUME2MD_MARKITDOWN    Path to the markitdown executable
  RUST_LOG                Override log filtering (e.g. resume2md=debug)
"#;

/// Convert PDF resumes to Markdown with external converters, and compare them.
#[derive(Parser, Debug)]
#[command(
    name = "resume2md",
    version,
    about = "Batch-convert PDF resumes to Markdown and compare converter output",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the docling executable.
    #[arg(long, global = true, env = "RESUME2MD_DOCLING", default_value = "docling")]
    docling_bin: PathBuf,

    /// Path to the markitdown executable.
    #[arg(long, global = true, env = "RESUME2MD_MARKITDOWN", default_value = "markitdown")]
    markitdown_bin: PathBuf,

    /// Output a JSON summary/report instead of text.
    #[arg(long, global = true, env = "RESUME2MD_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, global = true, env = "RESUME2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "RESUME2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, global = true, env = "RESUME2MD_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every PDF that has no Markdown output yet.
    Batch(BatchArgs),
    /// Convert one random PDF with two converters and diff the results.
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Directory containing the PDFs.
    #[arg(long, env = "RESUME2MD_SOURCE_DIR", default_value = DEFAULT_SOURCE_DIR)]
    source_dir: PathBuf,

    /// Where Markdown is written and looked for. Defaults to the source directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Converter used for every document.
    #[arg(long, value_enum, default_value = "docling")]
    converter: ConverterArg,

    /// List what would be converted without running anything.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Directory the random PDF is chosen from.
    #[arg(long, env = "RESUME2MD_SOURCE_DIR", default_value = DEFAULT_SOURCE_DIR)]
    source_dir: PathBuf,

    /// Compare this PDF instead of a random one.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory both outputs are written into.
    #[arg(long, default_value = DEFAULT_COMPARE_DIR)]
    output_dir: PathBuf,

    /// Seed for a reproducible random choice.
    #[arg(long)]
    seed: Option<u64>,

    /// Lines of each output shown in the preview sections.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_LINES)]
    preview_lines: usize,

    /// Context lines around each diff hunk.
    #[arg(long, default_value_t = DEFAULT_DIFF_CONTEXT)]
    diff_context: usize,

    /// Maximum diff lines shown.
    #[arg(long, default_value_t = DEFAULT_DIFF_LINE_LIMIT)]
    diff_lines: usize,

    /// Handling of bytes that are not valid UTF-8.
    #[arg(long, value_enum, default_value = "drop")]
    decoding: DecodingArg,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ConverterArg {
    Docling,
    Markitdown,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum DecodingArg {
    Drop,
    Replace,
    Strict,
}

impl From<DecodingArg> for Decoding {
    fn from(v: DecodingArg) -> Self {
        match v {
            DecodingArg::Drop => Decoding::DropInvalid,
            DecodingArg::Replace => Decoding::Replace,
            DecodingArg::Strict => Decoding::Strict,
        }
    }
}

impl Cli {
    fn converter(&self, kind: ConverterKind) -> ExternalConverter {
        let program = match kind {
            ConverterKind::Docling => &self.docling_bin,
            ConverterKind::Markitdown => &self.markitdown_bin,
        };
        ExternalConverter::new(kind).with_program(program.clone())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.json && matches!(cli.command, Command::Batch(_));
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Batch(ref args) => batch(&cli, args, show_progress),
        Command::Compare(ref args) => compare(&cli, args),
    }
}

fn batch(cli: &Cli, args: &BatchArgs, show_progress: bool) -> Result<()> {
    let kind = match args.converter {
        ConverterArg::Docling => ConverterKind::Docling,
        ConverterArg::Markitdown => ConverterKind::Markitdown,
    };

    let mut builder = BatchConfig::builder()
        .source_dir(&args.source_dir)
        .converter(cli.converter(kind))
        .dry_run(args.dry_run);
    if let Some(ref dir) = args.output_dir {
        builder = builder.output_dir(dir);
    }
    let bar = show_progress.then(CliProgressCallback::new);
    let progress: Option<ProgressCallback> = match bar {
        Some(ref cb) => Some(cb.clone() as ProgressCallback),
        None if !cli.quiet && !cli.json => Some(Arc::new(PlainProgressCallback)),
        None => None,
    };
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    let result = run_batch(&config);
    // Empty runs return before any event reaches the bar.
    if let Some(cb) = bar {
        cb.bar.finish_and_clear();
    }
    let summary = result.context("Batch conversion failed")?;

    if cli.json {
        let json =
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else if !cli.quiet {
        print_batch_summary(&summary);
    }
    Ok(())
}

fn print_batch_summary(summary: &BatchSummary) {
    if summary.total == 0 {
        eprintln!("No PDF files found");
        return;
    }
    if summary.dry_run {
        for path in &summary.pending {
            println!("{}", path.display());
        }
        eprintln!(
            "{} {} of {} PDFs would be converted",
            dim("dry run:"),
            summary.needs_conversion,
            summary.total
        );
        return;
    }
    if summary.needs_conversion == 0 {
        eprintln!("{} all {} PDFs already converted", green("✔"), summary.total);
    }
}

fn compare(cli: &Cli, args: &CompareArgs) -> Result<()> {
    let mut builder = CompareConfig::builder()
        .source_dir(&args.source_dir)
        .output_dir(&args.output_dir)
        .converter_a(cli.converter(ConverterKind::Markitdown))
        .converter_b(cli.converter(ConverterKind::Docling))
        .preview_lines(args.preview_lines)
        .diff_context(args.diff_context)
        .diff_line_limit(args.diff_lines)
        .decoding(args.decoding.into());
    if let Some(ref input) = args.input {
        builder = builder.input(input);
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if !cli.quiet && !cli.json {
        builder = builder.progress_callback(Arc::new(CompareProgressCallback));
    }
    let config = builder.build().context("Invalid configuration")?;

    let report = match run_compare(&config) {
        Ok(report) => report,
        Err(DriverError::ConverterFailed {
            tool,
            source: ItemError::ExitFailure {
                code,
                stdout,
                stderr,
                ..
            },
        }) => {
            eprintln!("Error with {tool}: exit status {code:?}");
            eprintln!("stdout: {stdout}");
            eprintln!("stderr: {stderr}");
            anyhow::bail!("Failed to convert with {tool}");
        }
        Err(e) => return Err(e).context("Comparison failed"),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(report.render().as_bytes())
            .context("Failed to write to stdout")?;
    }
    Ok(())
}
