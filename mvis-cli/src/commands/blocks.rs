use anyhow::{Context, Result};
use colored::*;
use mvis_core::{
    report::{report_blocks, BlockReport},
    MultiFileStream,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// Report missing blocks over `archives`, listing every frame when `list` is set
pub fn execute(archives: Vec<PathBuf>, list: bool) -> Result<BlockReport> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = execute_to(archives, list, &mut out)?;

    if report.missing == 0 {
        eprintln!("{} No missing blocks", "✓".green());
    } else {
        eprintln!(
            "{} {} missing block(s) in {} file(s)",
            "✗".red(),
            report.missing.to_string().red(),
            report.files.iter().filter(|f| f.missing > 0).count()
        );
    }
    Ok(report)
}

/// Same as [`execute`], printing to `out`
pub fn execute_to<W: Write>(archives: Vec<PathBuf>, list: bool, out: &mut W) -> Result<BlockReport> {
    info!("Reading blocks from {} archive file(s)", archives.len());

    let stream = MultiFileStream::open(archives).context("Failed to open archives")?;
    let report = report_blocks(stream, out, list).context("Block report failed")?;
    out.flush()?;

    if report.invalid > 0 {
        info!("{} block(s) with an invalid counter skipped", report.invalid);
    }
    Ok(report)
}
