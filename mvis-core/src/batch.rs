//! Batch mode: resolving a list of UPIs into candidate archive paths

use crate::constants::UPI_NAME_OFFSET;
use crate::error::MvisError;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read UPIs, one per line; blank lines and `#` comments are ignored
pub fn read_upi_list<R: BufRead>(reader: R) -> Result<Vec<String>, MvisError> {
    let mut upis = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let upi = line.trim();
        if upi.is_empty() || upi.starts_with('#') {
            continue;
        }
        upis.push(upi.to_string());
    }

    if upis.is_empty() {
        return Err(MvisError::NoUpi);
    }
    Ok(upis)
}

/// Lazy walk over an archive tree yielding files that belong to a UPI set
///
/// Entries are visited in file name order. A file matches when its name,
/// past the channel prefix, starts with one of the UPIs; the files that
/// follow and contain the same UPI are then taken without re-matching, so
/// each UPI's archives come out contiguously. Files flagged `.bad` are
/// never yielded. An empty UPI set matches every file.
pub struct UpiWalker {
    walker: walkdir::IntoIter,
    upis: Vec<String>,
    current: Option<String>,
}

impl UpiWalker {
    /// Start walking `base`
    pub fn new(base: impl AsRef<Path>, mut upis: Vec<String>) -> Self {
        upis.sort();
        Self {
            walker: WalkDir::new(base).sort_by_file_name().into_iter(),
            upis,
            current: None,
        }
    }

    fn matches(&mut self, path: &Path) -> bool {
        if self.upis.is_empty() {
            return true;
        }
        if let Some(upi) = &self.current {
            if path.to_string_lossy().contains(upi.as_str()) {
                return true;
            }
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tail = name.get(UPI_NAME_OFFSET..).unwrap_or("");
        self.current = self
            .upis
            .iter()
            .find(|upi| tail.starts_with(upi.as_str()))
            .cloned();
        self.current.is_some()
    }
}

impl Iterator for UpiWalker {
    type Item = Result<PathBuf, MvisError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().is_some_and(|ext| ext == "bad") {
                continue;
            }
            if self.matches(entry.path()) {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}
