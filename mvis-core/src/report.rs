//! Read-only block report over a frame stream

use crate::constants::FRAME_SIZE;
use crate::error::MvisError;
use crate::sequence::SequenceTracker;
use crate::types::Frame;
use serde::Serialize;
use std::io::Write;

#[cfg(feature = "logging")]
use tracing::warn;

/// Per-file part of a block report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportedFile {
    /// Name announced by the sentinel
    pub name: String,
    /// Declared size
    pub size: u32,
    /// Data frames seen
    pub blocks: u64,
    /// Frames missing
    pub missing: u64,
}

/// Aggregate of a report pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    /// Data frames seen
    pub blocks: u64,
    /// Frames missing over all files
    pub missing: u64,
    /// Data frames with an out-of-range counter
    pub invalid: u64,
    /// Bytes of every non-idle frame, sentinels included
    pub bytes: u64,
    /// Files in stream order
    pub files: Vec<ReportedFile>,
}

impl BlockReport {
    /// Total size in KiB
    pub fn kilobytes(&self) -> u64 {
        self.bytes >> 10
    }
}

/// Walk a frame stream and report missing blocks without writing any file
///
/// With `list` set, every sentinel and data frame is printed to `out`;
/// the summary line is always printed.
pub fn report_blocks<I, W>(frames: I, out: &mut W, list: bool) -> Result<BlockReport, MvisError>
where
    I: IntoIterator<Item = Result<Frame, MvisError>>,
    W: Write,
{
    let mut report = BlockReport::default();
    let mut tracker = SequenceTracker::new();

    for frame in frames {
        let data = match frame? {
            Frame::Idle => continue,
            Frame::NewFile(header) => {
                report.bytes += FRAME_SIZE as u64;
                if list {
                    writeln!(out, "{} ({} bytes)", header.name, header.size)?;
                }
                tracker.reset();
                report.files.push(ReportedFile {
                    name: header.name,
                    size: header.size,
                    ..Default::default()
                });
                continue;
            }
            Frame::Data(data) => data,
        };
        report.bytes += FRAME_SIZE as u64;

        let _previous = tracker.last();
        let step = match tracker.observe(data.tag) {
            Ok(step) => step,
            Err(_e) => {
                #[cfg(feature = "logging")]
                warn!("{}", _e);
                report.invalid += 1;
                continue;
            }
        };
        report.blocks += 1;

        let missing = step.missing();
        if missing > 0 {
            #[cfg(feature = "logging")]
            warn!(
                "missing blocks ({}): {} ({} - {})",
                report.files.last().map_or("", |f| f.name.as_str()),
                missing,
                _previous.unwrap_or(0),
                data.tag
            );
            report.missing += missing;
        }
        if let Some(file) = report.files.last_mut() {
            file.blocks += 1;
            file.missing += missing;
        }

        if list {
            writeln!(
                out,
                "{:5} ({:04x}): {}",
                data.tag,
                data.tag,
                hex::encode(&data.payload)
            )?;
        }
    }

    writeln!(
        out,
        "{} blocks ({} missing), {}KB",
        report.blocks,
        report.missing,
        report.kilobytes()
    )?;
    Ok(report)
}
