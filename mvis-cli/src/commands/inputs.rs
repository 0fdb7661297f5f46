use anyhow::{Context, Result};
use mvis_core::{
    batch::{read_upi_list, UpiWalker},
    grouper::select_archives,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::info;

/// Where the archive paths come from
#[derive(Debug, Clone, Default)]
pub struct InputOptions {
    /// Paths given on the command line
    pub paths: Vec<String>,
    /// Keep archives flagged `.bad`
    pub keep: bool,
    /// Archive tree walked in batch mode
    pub batch: Option<PathBuf>,
    /// UPI list restricting the batch walk
    pub upis: Option<PathBuf>,
}

/// Resolve the archives to process, reading paths from stdin when none are given
pub fn resolve(opts: &InputOptions) -> Result<Vec<PathBuf>> {
    resolve_from(opts, io::stdin().lock())
}

/// Same as [`resolve`], with an explicit source for the path list
pub fn resolve_from<R: BufRead>(opts: &InputOptions, stdin: R) -> Result<Vec<PathBuf>> {
    let candidates = if let Some(base) = &opts.batch {
        let upis = match &opts.upis {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open UPI list: {}", path.display()))?;
                read_upi_list(BufReader::new(file))?
            }
            None => Vec::new(),
        };
        info!("Walking {} for {} UPI(s)", base.display(), upis.len());

        UpiWalker::new(base, upis)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to walk {}", base.display()))?
    } else if opts.paths.is_empty() {
        read_path_list(stdin)?
    } else {
        opts.paths.iter().map(PathBuf::from).collect()
    };

    let selected = select_archives(candidates, opts.keep)?;
    info!("Selected {} archive file(s)", selected.len());
    Ok(selected)
}

/// One path per line, blank lines ignored
pub fn read_path_list<R: BufRead>(reader: R) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read path list")?;
        let path = line.trim();
        if !path.is_empty() {
            paths.push(PathBuf::from(path));
        }
    }
    Ok(paths)
}
