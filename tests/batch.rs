//! Batch conversion against a fake converter.

mod common;

use common::{touch_all, FakeRunner};
use resume2md::{
    run_batch_with, BatchConfig, ConversionProgressCallback, ExternalConverter, InputDocument,
    ItemError, SiblingMarkdownExists,
};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn config(dir: &Path) -> BatchConfig {
    BatchConfig::builder().source_dir(dir).build().unwrap()
}

#[test]
fn converts_only_documents_without_markdown() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["alice.pdf", "bob.pdf", "carol.pdf"]);
    fs::write(tmp.path().join("bob.md"), "# bob").unwrap();

    let runner = FakeRunner::new();
    let summary = run_batch_with(&config(tmp.path()), &runner, &SiblingMarkdownExists).unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.already_converted, 1);
    assert_eq!(summary.needs_conversion, 2);
    assert_eq!(runner.call_count(), 2);
    assert!(!runner.inputs().contains(&"bob.pdf".to_string()));
    assert_eq!(summary.succeeded(), 2);
    assert!(tmp.path().join("alice.md").is_file());
    assert!(tmp.path().join("carol.md").is_file());
    // Existing output untouched.
    assert_eq!(fs::read_to_string(tmp.path().join("bob.md")).unwrap(), "# bob");
}

#[test]
fn docling_is_invoked_with_output_directory() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["jane.pdf"]);

    let runner = FakeRunner::new();
    run_batch_with(&config(tmp.path()), &runner, &SiblingMarkdownExists).unwrap();

    let call = &runner.calls()[0];
    assert_eq!(call.program, "docling");
    assert_eq!(call.args[..3], ["--to", "md", "--output"]);
    assert_eq!(Path::new(&call.args[3]), tmp.path());
    assert!(call.args[4].ends_with("jane.pdf"));
}

#[test]
fn missing_source_directory_is_an_empty_run() {
    let tmp = TempDir::new().unwrap();
    let runner = FakeRunner::new();
    let summary = run_batch_with(
        &config(&tmp.path().join("nope")),
        &runner,
        &SiblingMarkdownExists,
    )
    .unwrap();

    assert_eq!(summary.total, 0);
    assert_eq!(summary.attempted(), 0);
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn directory_without_pdfs_invokes_nothing() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["notes.txt", ".hidden.pdf", "scan.PDF"]);
    fs::create_dir(tmp.path().join("folder.pdf")).unwrap();

    let runner = FakeRunner::new();
    let summary = run_batch_with(&config(tmp.path()), &runner, &SiblingMarkdownExists).unwrap();

    assert_eq!(summary.total, 0);
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn one_failure_does_not_stop_the_batch() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["a.pdf", "b.pdf", "c.pdf"]);

    let runner = FakeRunner::new().failing_on("b.pdf");
    let summary = run_batch_with(&config(tmp.path()), &runner, &SiblingMarkdownExists).unwrap();

    assert_eq!(runner.call_count(), 3);
    assert_eq!(summary.attempted(), 3);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);

    let failure = summary.failures().next().unwrap();
    assert!(failure.document.ends_with("b.pdf"));
    match failure.error {
        Some(ItemError::ExitFailure { code, ref stderr, .. }) => {
            assert_eq!(code, Some(1));
            assert!(stderr.contains("could not parse b.pdf"));
        }
        ref other => panic!("unexpected error: {other:?}"),
    }
    assert!(!tmp.path().join("b.md").exists());
}

#[test]
fn unstartable_converter_is_recorded_per_item() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["a.pdf", "b.pdf"]);

    let runner = FakeRunner::new().unspawnable("docling");
    let summary = run_batch_with(&config(tmp.path()), &runner, &SiblingMarkdownExists).unwrap();

    assert_eq!(summary.attempted(), 2);
    assert_eq!(summary.succeeded(), 0);
    assert!(summary
        .failures()
        .all(|r| matches!(r.error, Some(ItemError::SpawnFailed { .. }))));
}

#[test]
fn second_run_after_success_invokes_nothing() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["a.pdf", "b.pdf"]);
    let cfg = config(tmp.path());

    let first = FakeRunner::new();
    run_batch_with(&cfg, &first, &SiblingMarkdownExists).unwrap();
    assert_eq!(first.call_count(), 2);

    let second = FakeRunner::new();
    let summary = run_batch_with(&cfg, &second, &SiblingMarkdownExists).unwrap();
    assert_eq!(second.call_count(), 0);
    assert_eq!(summary.already_converted, 2);
    assert_eq!(summary.needs_conversion, 0);
}

#[test]
fn failed_documents_are_retried_on_the_next_run() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["a.pdf", "b.pdf"]);
    let cfg = config(tmp.path());

    run_batch_with(&cfg, &FakeRunner::new().failing_on("a.pdf"), &SiblingMarkdownExists).unwrap();

    let retry = FakeRunner::new();
    run_batch_with(&cfg, &retry, &SiblingMarkdownExists).unwrap();
    assert_eq!(retry.inputs(), vec!["a.pdf".to_string()]);
}

#[test]
fn zero_exit_without_output_still_counts_as_success() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["a.pdf"]);

    let runner = FakeRunner::new().without_output_for("docling");
    let summary = run_batch_with(&config(tmp.path()), &runner, &SiblingMarkdownExists).unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert!(!tmp.path().join("a.md").exists());
}

#[test]
fn dry_run_lists_pending_without_invoking() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["a.pdf", "b.pdf"]);
    fs::write(tmp.path().join("a.md"), "").unwrap();
    let out = tmp.path().join("md");

    let cfg = BatchConfig::builder()
        .source_dir(tmp.path())
        .output_dir(&out)
        .dry_run(true)
        .build()
        .unwrap();
    let runner = FakeRunner::new();
    let summary = run_batch_with(&cfg, &runner, &SiblingMarkdownExists).unwrap();

    assert_eq!(runner.call_count(), 0);
    assert!(summary.dry_run);
    assert_eq!(summary.needs_conversion, 2);
    assert_eq!(summary.pending.len(), 2);
    assert!(summary.results.is_empty());
    assert!(!out.exists());
}

#[test]
fn custom_policy_decides_what_is_pending() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["keep.pdf", "redo.pdf"]);
    fs::write(tmp.path().join("redo.md"), "").unwrap();

    let only_keep = |doc: &InputDocument, _: &Path| doc.name() != "keep.pdf";
    let runner = FakeRunner::new();
    let summary = run_batch_with(&config(tmp.path()), &runner, &only_keep).unwrap();

    assert_eq!(runner.inputs(), vec!["keep.pdf".to_string()]);
    assert_eq!(summary.already_converted, 1);
}

#[test]
fn output_dir_override_is_used_for_skip_and_write() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    touch_all(src.path(), &["a.pdf", "b.pdf"]);
    // Markdown next to the source no longer counts.
    fs::write(src.path().join("a.md"), "").unwrap();
    fs::write(out.path().join("b.md"), "").unwrap();

    let cfg = BatchConfig::builder()
        .source_dir(src.path())
        .output_dir(out.path())
        .build()
        .unwrap();
    let runner = FakeRunner::new();
    let summary = run_batch_with(&cfg, &runner, &SiblingMarkdownExists).unwrap();

    assert_eq!(runner.inputs(), vec!["a.pdf".to_string()]);
    assert_eq!(summary.output_dir, out.path());
    assert!(out.path().join("a.md").is_file());
}

#[test]
fn markitdown_batch_writes_named_files() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["jane.pdf"]);

    let cfg = BatchConfig::builder()
        .source_dir(tmp.path())
        .converter(ExternalConverter::markitdown())
        .build()
        .unwrap();
    let runner = FakeRunner::new();
    run_batch_with(&cfg, &runner, &SiblingMarkdownExists).unwrap();

    let call = &runner.calls()[0];
    assert_eq!(call.program, "markitdown");
    assert_eq!(call.args[1], "-o");
    assert!(call.args[2].ends_with("jane.md"));
    assert!(tmp.path().join("jane.md").is_file());
}

#[derive(Default)]
struct Counter {
    started: AtomicUsize,
    completed: AtomicUsize,
    errored: AtomicUsize,
    needs: AtomicUsize,
    finished: AtomicUsize,
}

impl ConversionProgressCallback for Counter {
    fn on_batch_start(&self, _total: usize, _already: usize, needs: usize) {
        self.needs.store(needs, Ordering::SeqCst);
    }
    fn on_item_start(&self, _i: usize, _n: usize, _doc: &Path, _converter: &str) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }
    fn on_item_complete(&self, _i: usize, _n: usize, _doc: &Path, _out: &Path) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
    fn on_item_error(&self, _i: usize, _n: usize, _doc: &Path, _err: &ItemError) {
        self.errored.fetch_add(1, Ordering::SeqCst);
    }
    fn on_batch_complete(&self, _attempted: usize, _succeeded: usize) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn progress_callback_sees_every_item() {
    let tmp = TempDir::new().unwrap();
    touch_all(tmp.path(), &["a.pdf", "b.pdf", "c.pdf"]);

    let counter = Arc::new(Counter::default());
    let cfg = BatchConfig::builder()
        .source_dir(tmp.path())
        .progress_callback(counter.clone())
        .build()
        .unwrap();
    run_batch_with(&cfg, &FakeRunner::new().failing_on("c.pdf"), &SiblingMarkdownExists).unwrap();

    assert_eq!(counter.needs.load(Ordering::SeqCst), 3);
    assert_eq!(counter.started.load(Ordering::SeqCst), 3);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 2);
    assert_eq!(counter.errored.load(Ordering::SeqCst), 1);
    assert_eq!(counter.finished.load(Ordering::SeqCst), 1);
}
