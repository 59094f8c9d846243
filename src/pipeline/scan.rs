//! Input discovery: enumerate the documents in a source directory and pick
//! one at random for the comparator.
//!
//! Matching mirrors a shell `*.pdf` glob: names starting with `.` are
//! skipped and the extension comparison is case-sensitive. Results keep
//! directory enumeration order, which the platform does not guarantee to be
//! sorted.

use crate::config::OUTPUT_EXTENSION;
use crate::error::DriverError;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A document found by [`scan_documents`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDocument {
    path: PathBuf,
}

impl InputDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without its extension.
    pub fn stem(&self) -> &OsStr {
        self.path.file_stem().unwrap_or_default()
    }

    /// File name for display.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }

    /// `<stem>.md`, the name every converter output for this document gets.
    pub fn output_file_name(&self) -> OsString {
        Self::output_file_name_for(&self.path)
    }

    pub(crate) fn output_file_name_for(path: &Path) -> OsString {
        let mut name = path.file_stem().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(OUTPUT_EXTENSION);
        name
    }
}

/// Whether `path` looks like a `*.<extension>` match.
pub fn matches_extension(path: &Path, extension: &str) -> bool {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true);
    !hidden && path.extension() == Some(OsStr::new(extension))
}

/// List the regular files in `dir` whose extension is `extension`.
///
/// # Errors
/// [`DriverError::SourceDirNotFound`] if `dir` is missing or not a
/// directory; [`DriverError::ScanFailed`] if enumeration fails. An existing
/// directory without matches is `Ok` with an empty list.
pub fn scan_documents(dir: &Path, extension: &str) -> Result<Vec<InputDocument>, DriverError> {
    if !dir.is_dir() {
        return Err(DriverError::SourceDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let scan_err = |source| DriverError::ScanFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut docs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(scan_err)? {
        let path = entry.map_err(scan_err)?.path();
        if matches_extension(&path, extension) && path.is_file() {
            docs.push(InputDocument::new(path));
        }
    }

    debug!("Found {} .{} files in {}", docs.len(), extension, dir.display());
    Ok(docs)
}

/// Uniformly pick one document. A seed makes the choice reproducible.
pub fn select_random(docs: &[InputDocument], seed: Option<u64>) -> Option<&InputDocument> {
    if docs.is_empty() {
        return None;
    }

    let mut seeded_rng;
    let mut thread_rng;
    let rng: &mut dyn rand::RngCore = match seed {
        Some(s) => {
            seeded_rng = rand::rngs::StdRng::seed_from_u64(s);
            &mut seeded_rng
        }
        None => {
            thread_rng = rand::rng();
            &mut thread_rng
        }
    };

    docs.get(rng.random_range(0..docs.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_matches_extension() {
        assert!(matches_extension(Path::new("a/cv.pdf"), "pdf"));
        assert!(matches_extension(Path::new("a/cv.v2.pdf"), "pdf"));
        assert!(!matches_extension(Path::new("a/cv.PDF"), "pdf"));
        assert!(!matches_extension(Path::new("a/cv.md"), "pdf"));
        assert!(!matches_extension(Path::new("a/.hidden.pdf"), "pdf"));
        assert!(!matches_extension(Path::new("a/pdf"), "pdf"));
    }

    #[test]
    fn stem_and_output_name() {
        let d = InputDocument::new("dir/Jane Doe - Resume.pdf");
        assert_eq!(d.stem(), OsStr::new("Jane Doe - Resume"));
        assert_eq!(d.name(), "Jane Doe - Resume.pdf");
        assert_eq!(d.output_file_name(), OsString::from("Jane Doe - Resume.md"));
    }

    #[test]
    fn scan_missing_dir_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = scan_documents(&tmp.path().join("nope"), "pdf").unwrap_err();
        assert!(matches!(err, DriverError::SourceDirNotFound { .. }));
    }

    #[test]
    fn scan_filters_by_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.pdf"), b"%PDF").unwrap();
        fs::write(tmp.path().join("b.pdf"), b"%PDF").unwrap();
        fs::write(tmp.path().join("a.md"), b"# a").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(tmp.path().join("folder.pdf")).unwrap();

        let mut names: Vec<String> = scan_documents(tmp.path(), "pdf")
            .unwrap()
            .iter()
            .map(InputDocument::name)
            .collect();
        names.sort();
        assert_eq!(names, ["a.pdf", "b.pdf"]);
    }

    #[test]
    fn scan_empty_dir_is_ok() {
        let tmp = TempDir::new().unwrap();
        assert!(scan_documents(tmp.path(), "pdf").unwrap().is_empty());
    }

    #[test]
    fn select_random_is_reproducible_with_seed() {
        let docs: Vec<InputDocument> = (0..20)
            .map(|i| InputDocument::new(format!("{i}.pdf")))
            .collect();
        let first = select_random(&docs, Some(7)).unwrap();
        for _ in 0..5 {
            assert_eq!(select_random(&docs, Some(7)).unwrap(), first);
        }
        assert!(select_random(&[], Some(7)).is_none());
        assert!(docs.contains(select_random(&docs, None).unwrap()));
    }
}
