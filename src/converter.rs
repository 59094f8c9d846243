//! External converter tools and how to call them.
//!
//! A converter is a black box: it gets an input path, an output-format
//! selector, and an output location. Two calling conventions exist:
//!
//! | Kind         | Output style | Command line                                   |
//! |--------------|--------------|------------------------------------------------|
//! | `markitdown` | named file   | `markitdown <input> -o <file>`                 |
//! | `docling`    | directory    | `docling --to md --output <dir> <input>`       |
//!
//! Directory-style tools choose their own file name (`<stem>.md`), so the
//! caller derives the expected path rather than naming it.

use crate::config::OUTPUT_EXTENSION;
use crate::error::{DriverError, ItemError};
use crate::output::ConversionResult;
use crate::pipeline::scan::InputDocument;
use crate::process::ProcessRunner;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The command-line conventions this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// Writes one named Markdown file.
    Markitdown,
    /// Writes `<stem>.md` into an output directory.
    Docling,
}

impl ConverterKind {
    pub fn style(self) -> OutputStyle {
        match self {
            ConverterKind::Markitdown => OutputStyle::File,
            ConverterKind::Docling => OutputStyle::Directory,
        }
    }

    /// Default display name, also the default program name on `PATH`.
    pub fn default_name(self) -> &'static str {
        match self {
            ConverterKind::Markitdown => "markitdown",
            ConverterKind::Docling => "docling",
        }
    }
}

/// Whether a tool is told the output file or only the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    File,
    Directory,
}

/// Where one invocation should put its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Directory(PathBuf),
}

impl OutputTarget {
    /// The path the converted Markdown is expected at for `doc`.
    pub fn expected_output(&self, doc: &InputDocument) -> PathBuf {
        match self {
            OutputTarget::File(p) => p.clone(),
            OutputTarget::Directory(d) => d.join(doc.output_file_name()),
        }
    }

    /// The directory that must exist before the tool runs.
    pub fn directory(&self) -> Option<&Path> {
        match self {
            OutputTarget::File(p) => p.parent().filter(|p| !p.as_os_str().is_empty()),
            OutputTarget::Directory(d) => Some(d),
        }
    }
}

/// One configured external converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalConverter {
    kind: ConverterKind,
    name: String,
    program: OsString,
}

impl ExternalConverter {
    /// A converter of `kind` named after the tool and found on `PATH`.
    pub fn new(kind: ConverterKind) -> Self {
        Self {
            kind,
            name: kind.default_name().to_string(),
            program: OsString::from(kind.default_name()),
        }
    }

    pub fn markitdown() -> Self {
        Self::new(ConverterKind::Markitdown)
    }

    pub fn docling() -> Self {
        Self::new(ConverterKind::Docling)
    }

    /// Use a specific executable instead of the one on `PATH`.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Override the display name used in reports and output paths.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn kind(&self) -> ConverterKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub(crate) fn validate(&self) -> Result<(), DriverError> {
        if self.name.is_empty() {
            return Err(DriverError::InvalidConfig(
                "Converter name must not be empty".into(),
            ));
        }
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(DriverError::InvalidConfig(format!(
                "Converter name '{}' cannot be used as a file name",
                self.name
            )));
        }
        if self.program.is_empty() {
            return Err(DriverError::InvalidConfig(format!(
                "Converter '{}' has an empty program path",
                self.name
            )));
        }
        Ok(())
    }

    /// Target for a batch run: the Markdown lands as `<dir>/<stem>.md`.
    pub fn batch_target(&self, dir: &Path, doc: &InputDocument) -> OutputTarget {
        match self.kind.style() {
            OutputStyle::File => OutputTarget::File(dir.join(doc.output_file_name())),
            OutputStyle::Directory => OutputTarget::Directory(dir.to_path_buf()),
        }
    }

    /// Target for a comparison run: file-style tools write
    /// `<dir>/<name>_output.md`, directory-style tools get `<dir>/<name>/`.
    pub fn compare_target(&self, dir: &Path) -> OutputTarget {
        match self.kind.style() {
            OutputStyle::File => {
                OutputTarget::File(dir.join(format!("{}_output.{OUTPUT_EXTENSION}", self.name)))
            }
            OutputStyle::Directory => OutputTarget::Directory(dir.join(&self.name)),
        }
    }

    /// Command-line arguments for converting `input` into `target`.
    pub fn build_args(&self, input: &Path, target: &OutputTarget) -> Vec<OsString> {
        match self.kind {
            ConverterKind::Markitdown => {
                let out = match target {
                    OutputTarget::File(p) => p.clone(),
                    OutputTarget::Directory(d) => {
                        d.join(InputDocument::output_file_name_for(input))
                    }
                };
                vec![input.into(), "-o".into(), out.into()]
            }
            ConverterKind::Docling => {
                let dir = target
                    .directory()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                vec![
                    "--to".into(),
                    OUTPUT_EXTENSION.into(),
                    "--output".into(),
                    dir.into(),
                    input.into(),
                ]
            }
        }
    }

    /// Invoke the tool once and classify the outcome by exit status.
    ///
    /// A zero exit yields a success whose `output_path` is the expected
    /// output location; whether that file exists is not checked here (see
    /// [`ConversionResult::verify_output`]).
    pub fn run<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        doc: &InputDocument,
        target: &OutputTarget,
    ) -> ConversionResult {
        let args = self.build_args(doc.path(), target);
        debug!("{}: converting {}", self.name, doc.path().display());

        let outcome = match runner.invoke(&self.program, &args) {
            Err(e) => Err(ItemError::SpawnFailed {
                tool: self.name.clone(),
                detail: e.to_string(),
            }),
            Ok(out) if !out.success() => Err(ItemError::ExitFailure {
                tool: self.name.clone(),
                code: out.code,
                stdout: out.stdout_lossy(),
                stderr: out.stderr_lossy(),
            }),
            Ok(_) => Ok(target.expected_output(doc)),
        };

        ConversionResult::new(doc, &self.name, outcome)
    }
}

impl fmt::Display for ExternalConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.program == self.name.as_str() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} ({})", self.name, Path::new(&self.program).display())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> InputDocument {
        InputDocument::new("resumes/jane_doe.pdf")
    }

    fn strs(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn markitdown_args_name_the_output_file() {
        let c = ExternalConverter::markitdown();
        let target = c.compare_target(Path::new("cmp"));
        assert_eq!(
            target,
            OutputTarget::File(PathBuf::from("cmp/markitdown_output.md"))
        );
        assert_eq!(
            strs(&c.build_args(doc().path(), &target)),
            ["resumes/jane_doe.pdf", "-o", "cmp/markitdown_output.md"]
        );
    }

    #[test]
    fn docling_args_name_the_output_directory() {
        let c = ExternalConverter::docling();
        let target = c.compare_target(Path::new("cmp"));
        assert_eq!(target, OutputTarget::Directory(PathBuf::from("cmp/docling")));
        assert_eq!(
            strs(&c.build_args(doc().path(), &target)),
            ["--to", "md", "--output", "cmp/docling", "resumes/jane_doe.pdf"]
        );
        assert_eq!(
            target.expected_output(&doc()),
            PathBuf::from("cmp/docling/jane_doe.md")
        );
    }

    #[test]
    fn batch_targets_land_next_to_stem() {
        let dir = Path::new("resumes");
        for c in [ExternalConverter::markitdown(), ExternalConverter::docling()] {
            let target = c.batch_target(dir, &doc());
            assert_eq!(
                target.expected_output(&doc()),
                PathBuf::from("resumes/jane_doe.md"),
                "{c}"
            );
        }
    }

    #[test]
    fn program_override_keeps_name() {
        let c = ExternalConverter::docling().with_program("/opt/venv/bin/docling");
        assert_eq!(c.name(), "docling");
        assert_eq!(c.program(), &OsString::from("/opt/venv/bin/docling"));
        assert_eq!(c.to_string(), "docling (/opt/venv/bin/docling)");
    }

    #[test]
    fn validate_rejects_path_like_names() {
        assert!(ExternalConverter::docling().validate().is_ok());
        assert!(ExternalConverter::docling().with_name("a/b").validate().is_err());
        assert!(ExternalConverter::docling().with_name("").validate().is_err());
        assert!(ExternalConverter::docling()
            .with_program("")
            .validate()
            .is_err());
    }
}
