use super::metadata::ListingTarget;
use anyhow::{Context, Result};
use mvis_core::{
    constants::{FillPolicy, PayloadMode},
    output::{Destination, FileOutput, GapStrategy, OutputConfig},
    FrameSequencer, MultiFileStream, SequenceReport,
};
use std::path::PathBuf;
use tracing::{info, warn};

/// Settings of a reconstruction run
#[derive(Debug, Clone)]
pub struct ReconstructOptions {
    /// Output directory, or standard output
    pub destination: Destination,
    /// Write a JSON descriptor next to each listing
    pub meta: bool,
    /// Drop the trailing null bytes of each payload
    pub text: bool,
    /// Byte filling missing blocks
    pub fill: FillPolicy,
    /// Layout of missing blocks
    pub strategy: GapStrategy,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            destination: Destination::Stdout,
            meta: false,
            text: false,
            fill: FillPolicy::default(),
            strategy: GapStrategy::default(),
        }
    }
}

impl ReconstructOptions {
    fn output_config(&self) -> OutputConfig {
        OutputConfig {
            destination: self.destination.clone(),
            strategy: self.strategy,
            fill: self.fill,
            mode: if self.text {
                PayloadMode::Text
            } else {
                PayloadMode::Binary
            },
        }
    }
}

/// Rebuild every logical file carried by `archives`
pub fn execute(archives: Vec<PathBuf>, opts: &ReconstructOptions) -> Result<SequenceReport> {
    info!("Reconstructing from {} archive file(s)", archives.len());

    if opts.meta && opts.destination == Destination::Stdout {
        warn!("Metadata is not written for standard output");
    }
    let emit_metadata = opts.meta && opts.destination != Destination::Stdout;

    let stream = MultiFileStream::open(archives).context("Failed to open archives")?;
    let target = ListingTarget::new(FileOutput::new(opts.output_config()), emit_metadata);

    let report = FrameSequencer::new(target)
        .run(stream)
        .context("Reconstruction failed")?;

    // Standard output may carry listings, so the summary only goes to the log
    info!(
        "Reconstructed {} file(s), {} missing block(s)",
        report.files.len(),
        report.missing_blocks()
    );
    if report.dropped_frames > 0 {
        warn!(
            "{} block(s) received outside of any file",
            report.dropped_frames
        );
    }
    for name in &report.aborted_files {
        warn!("Aborted: {}", name);
    }

    Ok(report)
}
