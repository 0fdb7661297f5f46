//! Reconstruction of one logical file from its data frames

use crate::constants::PayloadMode;
use crate::decoder::trim_trailing_nulls;
use crate::error::MvisError;
use crate::sequence::{SequenceTracker, Step};
use crate::sink::BlockSink;
use crate::types::{DataFrame, FileHeader};
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::warn;

/// Final statistics of a reconstructed logical file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    /// Name announced by the new-file sentinel
    pub name: String,

    /// Where the bytes were written
    pub path: String,

    /// Size announced by the new-file sentinel
    pub declared_size: u32,

    /// Data frames written
    pub blocks: u64,

    /// Payload bytes written
    pub bytes: u64,

    /// Frames that never arrived
    pub missing: u64,

    /// Hex BLAKE3 digest of the written bytes, in write order
    pub checksum: String,

    /// Length of the output once closed
    pub output_len: u64,
}

/// Rebuilds one logical file
///
/// Owns the sequence state, counters and checksum of the file, and the sink
/// its bytes go to. Frames are accepted in stream order only.
pub struct FileAssembler {
    header: FileHeader,
    path: String,
    mode: PayloadMode,
    tracker: SequenceTracker,
    index: u64,
    blocks: u64,
    bytes: u64,
    missing: u64,
    digest: blake3::Hasher,
    sink: Box<dyn BlockSink>,
}

impl FileAssembler {
    /// Start a logical file written to `sink`; `path` labels the output
    pub fn new(
        header: FileHeader,
        path: impl Into<String>,
        mode: PayloadMode,
        sink: Box<dyn BlockSink>,
    ) -> Self {
        Self {
            header,
            path: path.into(),
            mode,
            tracker: SequenceTracker::new(),
            index: 0,
            blocks: 0,
            bytes: 0,
            missing: 0,
            digest: blake3::Hasher::new(),
            sink,
        }
    }

    /// Route one data frame into the file
    ///
    /// Returns the number of payload bytes written; duplicates write nothing. An out-of-range counter is an error and leaves
    /// the file untouched.
    pub fn write(&mut self, frame: &DataFrame) -> Result<usize, MvisError> {
        let step = self.tracker.observe(frame.tag)?;

        match step {
            Step::Duplicate => return Ok(0),
            Step::First { leading } => {
                self.index = u64::from(leading);
                if leading > 0 {
                    self.sink.skip(u64::from(leading))?;
                }
            }
            Step::Next => self.index += 1,
            Step::Gap { missing } => {
                #[cfg(feature = "logging")]
                warn!(
                    "missing blocks ({}): {} before {}",
                    self.header.name, missing, frame.tag
                );
                self.index += step.advance();
                self.sink.skip(u64::from(missing))?;
            }
        }
        self.missing += step.missing();

        let data = match self.mode {
            PayloadMode::Text => trim_trailing_nulls(&frame.payload),
            PayloadMode::Binary => &frame.payload[..],
        };
        self.sink.write_block(self.index, data)?;
        self.digest.update(data);
        self.blocks += 1;
        self.bytes += data.len() as u64;

        Ok(data.len())
    }

    /// Flush the output and seal the checksum
    pub fn close(self) -> Result<FileSummary, MvisError> {
        let output_len = self.sink.finish()?;
        Ok(FileSummary {
            name: self.header.name,
            path: self.path,
            declared_size: self.header.size,
            blocks: self.blocks,
            bytes: self.bytes,
            missing: self.missing,
            checksum: hex::encode(self.digest.finalize().as_bytes()),
            output_len,
        })
    }

    /// Flush whatever was written and drop the file without a summary
    pub fn abandon(self) -> Result<(), MvisError> {
        self.sink.finish().map(|_| ())
    }

    /// Header this file was created from
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Output location
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Payload mode
    pub fn mode(&self) -> PayloadMode {
        self.mode
    }

    /// Blocks written so far
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Bytes written so far
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Frames counted missing so far
    pub fn missing(&self) -> u64 {
        self.missing
    }

    /// Current checksum of the written bytes
    pub fn checksum(&self) -> String {
        hex::encode(self.digest.finalize().as_bytes())
    }
}
