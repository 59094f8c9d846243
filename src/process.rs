//! External process invocation.
//!
//! Every converter call goes through [`ProcessRunner`], so both flows (and
//! their tests) can substitute a fake without spawning real processes.
//! [`SystemRunner`] is the real implementation: it blocks until the child
//! exits and captures both output streams.

use std::ffi::{OsStr, OsString};
use std::io;
use std::process::{Command, Stdio};
use tracing::debug;

/// Captured result of one finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    /// A zero exit with no captured output.
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    /// A failed exit with the given code and error stream.
    pub fn failed(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

impl From<std::process::Output> for ProcessOutput {
    fn from(out: std::process::Output) -> Self {
        Self {
            code: out.status.code(),
            stdout: out.stdout,
            stderr: out.stderr,
        }
    }
}

/// Runs an external program to completion.
///
/// `Err` means the process could not be started at all; a process that
/// started and failed is an `Ok` with a non-zero [`ProcessOutput::code`].
pub trait ProcessRunner {
    fn invoke(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn invoke(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput> {
        (**self).invoke(program, args)
    }
}

/// Spawns real child processes via [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn invoke(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput> {
        debug!(
            "Running {} {}",
            program.to_string_lossy(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        debug!("{} exited with {:?}", program.to_string_lossy(), output.status.code());
        Ok(output.into())
    }
}
