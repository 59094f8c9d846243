//! Reading converter output as text.
//!
//! Converters occasionally emit bytes that are not valid UTF-8 (mangled
//! ligatures, stray Latin-1 from the PDF). The report is best-effort, so the
//! default [`Decoding::DropInvalid`] silently discards such sequences. The
//! strategy is an explicit parameter rather than a hidden default so callers
//! can opt into [`Decoding::Strict`].
//!
//! Line splitting follows universal-newline rules: `\r\n`, `\r` and `\n`
//! all end a line and are normalised to a kept `\n`. A final line without a
//! terminator stays unterminated, so outputs that differ only in their last
//! newline still compare unequal.

use crate::error::DriverError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How undecodable byte sequences are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Decoding {
    /// Drop invalid sequences. (default)
    #[default]
    DropInvalid,
    /// Replace each invalid sequence with U+FFFD.
    Replace,
    /// Fail with [`DriverError::InvalidUtf8`].
    Strict,
}

/// Decode `bytes` with the given strategy.
///
/// Returns the offset of the first invalid byte on strict failure.
pub fn decode(bytes: &[u8], decoding: Decoding) -> Result<String, usize> {
    match decoding {
        Decoding::DropInvalid => {
            let mut out = String::with_capacity(bytes.len());
            for chunk in bytes.utf8_chunks() {
                out.push_str(chunk.valid());
            }
            Ok(out)
        }
        Decoding::Replace => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Decoding::Strict => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| e.valid_up_to()),
    }
}

/// Read a whole file as text.
pub fn read_text(path: &Path, decoding: Decoding) -> Result<String, DriverError> {
    let bytes = std::fs::read(path).map_err(|source| DriverError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes, decoding).map_err(|offset| DriverError::InvalidUtf8 {
        path: path.to_path_buf(),
        offset,
    })
}

/// Split text into lines, treating `\r\n`, `\r` and `\n` as terminators.
///
/// Every terminated line ends with a single `\n`; the last line has none
/// when the text does not end with a terminator.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(['\r', '\n']) {
            Some(pos) => {
                let mut line = String::with_capacity(pos + 1);
                line.push_str(&rest[..pos]);
                line.push('\n');
                lines.push(line);
                let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + skip..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }
    lines
}

/// Read a file and split it into terminated lines.
pub fn read_lines(path: &Path, decoding: Decoding) -> Result<Vec<String>, DriverError> {
    read_text(path, decoding).map(|t| split_lines(&t))
}

/// The first `n` lines (or all of them if there are fewer), without their
/// terminators.
pub fn head(lines: &[String], n: usize) -> Vec<String> {
    lines
        .iter()
        .take(n)
        .map(|l| l.strip_suffix('\n').unwrap_or(l).to_string())
        .collect()
}
