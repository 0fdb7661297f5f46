//! Selecting the archive files fed to the frame stream

use crate::constants::BAD_SUFFIX;
use crate::error::MvisError;
use std::path::PathBuf;

#[cfg(feature = "logging")]
use tracing::debug;

/// UPI prefix of an archive path: everything before its final `_`
pub fn upi_prefix(path: &str) -> Result<&str, MvisError> {
    path.rfind('_')
        .map(|ix| &path[..ix])
        .ok_or_else(|| MvisError::InvalidFilename(path.to_string()))
}

/// Order and deduplicate candidate archive paths
///
/// Paths flagged `.bad` are dropped unless `keep_bad` is set. The rest are
/// sorted; consecutive paths sharing a UPI prefix are retransmissions of the
/// same acquisition window, and only the last one of each run is kept.
pub fn select_archives<I, P>(paths: I, keep_bad: bool) -> Result<Vec<PathBuf>, MvisError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut candidates: Vec<String> = paths
        .into_iter()
        .map(|p| p.into().to_string_lossy().into_owned())
        .filter(|p| keep_bad || !p.ends_with(BAD_SUFFIX))
        .collect();
    candidates.sort();
    candidates.dedup();

    let mut selected: Vec<PathBuf> = Vec::new();
    let mut run: Option<(String, String)> = None;

    for path in candidates {
        let prefix = upi_prefix(&path)?.to_string();
        match run.take() {
            Some((current, _superseded)) if current == prefix => {
                #[cfg(feature = "logging")]
                debug!("Dropping retransmitted archive {}", _superseded);
                run = Some((current, path));
            }
            Some((_, last)) => {
                selected.push(PathBuf::from(last));
                run = Some((prefix, path));
            }
            None => run = Some((prefix, path)),
        }
    }
    if let Some((_, last)) = run {
        selected.push(PathBuf::from(last));
    }

    if selected.is_empty() {
        return Err(MvisError::NoValidFiles);
    }
    Ok(selected)
}
