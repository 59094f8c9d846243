//! Shared fixtures for the integration tests: a fake converter runner that
//! writes Markdown where the real tools would, without spawning anything.

#![allow(dead_code)]

use resume2md::{ProcessOutput, ProcessRunner};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Route library logs to the test harness. `RUST_LOG` picks the level;
/// nothing is shown by default.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// One recorded call to [`FakeRunner::invoke`].
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// The input document: the argument ending in `.pdf`.
    pub fn input(&self) -> Option<&str> {
        self.args.iter().map(String::as_str).find(|a| a.ends_with(".pdf"))
    }
}

/// Understands both argument shapes the converters use:
/// `<input> -o <file>` and `--to md --output <dir> <input>`.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<Invocation>>,
    failing_documents: Vec<String>,
    failing_programs: Vec<String>,
    missing_programs: Vec<String>,
    unspawnable_programs: Vec<String>,
    content: HashMap<String, Vec<u8>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }

    /// Exit 1 for any input whose file name is `name`.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing_documents.push(name.to_string());
        self
    }

    /// Exit 1 whenever `program` runs.
    pub fn failing_program(mut self, program: &str) -> Self {
        self.failing_programs.push(program.to_string());
        self
    }

    /// Exit 0 for `program` but write nothing.
    pub fn without_output_for(mut self, program: &str) -> Self {
        self.missing_programs.push(program.to_string());
        self
    }

    /// Fail to start `program` at all.
    pub fn unspawnable(mut self, program: &str) -> Self {
        self.unspawnable_programs.push(program.to_string());
        self
    }

    /// Bytes `program` writes as its Markdown output.
    pub fn with_content(mut self, program: &str, content: impl Into<Vec<u8>>) -> Self {
        self.content.insert(program.to_string(), content.into());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// File names of the inputs, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|c| c.input())
            .map(|i| file_name(Path::new(i)))
            .collect()
    }

    fn output_path(args: &[String]) -> Option<PathBuf> {
        if let Some(i) = args.iter().position(|a| a == "-o") {
            return args.get(i + 1).map(PathBuf::from);
        }
        let i = args.iter().position(|a| a == "--output")?;
        let dir = PathBuf::from(args.get(i + 1)?);
        let input = Path::new(args.last()?);
        let stem = input.file_stem()?.to_string_lossy().into_owned();
        Some(dir.join(format!("{stem}.md")))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ProcessRunner for FakeRunner {
    fn invoke(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput> {
        let program = program.to_string_lossy().into_owned();
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let call = Invocation {
            program: program.clone(),
            args: args.clone(),
        };
        self.calls.lock().unwrap().push(call.clone());

        if self.unspawnable_programs.contains(&program) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory"));
        }
        if self.failing_programs.contains(&program) {
            return Ok(ProcessOutput {
                code: Some(1),
                stdout: b"partial".to_vec(),
                stderr: format!("{program}: conversion failed\n").into_bytes(),
            });
        }
        let input = call.input().map(|i| file_name(Path::new(i)));
        if let Some(ref name) = input {
            if self.failing_documents.contains(name) {
                return Ok(ProcessOutput::failed(
                    1,
                    format!("Error: could not parse {name}\n"),
                ));
            }
        }
        if self.missing_programs.contains(&program) {
            return Ok(ProcessOutput::ok());
        }

        let out = Self::output_path(&args)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no output argument"))?;
        let body = self.content.get(&program).cloned().unwrap_or_else(|| {
            format!("# {}\n\nConverted by {program}\n", input.unwrap_or_default()).into_bytes()
        });
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out, body)?;
        Ok(ProcessOutput::ok())
    }
}

/// Create empty files named `names` in `dir`.
pub fn touch_all(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"%PDF-1.4\n").unwrap();
    }
}
