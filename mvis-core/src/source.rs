//! Reading frames out of a single raw archive file

use crate::constants::{ARCHIVE_HEADER_SKIP, ARCHIVE_MAGIC, FRAME_SIZE};
use crate::decoder::decode_frame;
use crate::error::MvisError;
use crate::types::Frame;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::debug;

/// One raw archive file yielding fixed-size frames
#[derive(Debug)]
pub struct FrameSource<R> {
    reader: R,
    label: String,
    frames_read: u64,
}

impl FrameSource<BufReader<File>> {
    /// Open an archive file, validate its magic and skip its header
    pub fn open(path: &Path) -> Result<Self, MvisError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), path.display().to_string())
    }
}

impl<R: Read> FrameSource<R> {
    /// Wrap a reader positioned at the start of an archive
    pub fn new(mut reader: R, label: impl Into<String>) -> Result<Self, MvisError> {
        let label = label.into();

        let mut magic = [0u8; 4];
        if read_full(&mut reader, &mut magic)? != magic.len() {
            return Err(MvisError::TruncatedHeader(label));
        }
        if &magic != ARCHIVE_MAGIC {
            return Err(MvisError::BadMagic {
                path: label,
                found: magic,
            });
        }

        let mut header = [0u8; ARCHIVE_HEADER_SKIP];
        if read_full(&mut reader, &mut header)? != header.len() {
            return Err(MvisError::TruncatedHeader(label));
        }

        #[cfg(feature = "logging")]
        debug!("Opened archive {}", label);

        Ok(Self {
            reader,
            label,
            frames_read: 0,
        })
    }

    /// Read the next frame, `None` once the archive is exhausted
    ///
    /// Anything between zero and `FRAME_SIZE` bytes left at the end is an error.
    pub fn read_frame(&mut self) -> Result<Option<Frame>, MvisError> {
        let mut buf = [0u8; FRAME_SIZE];
        match read_full(&mut self.reader, &mut buf)? {
            0 => Ok(None),
            FRAME_SIZE => {
                self.frames_read += 1;
                decode_frame(&buf).map(Some)
            }
            actual => Err(MvisError::IncompleteFrame {
                expected: FRAME_SIZE,
                actual,
            }),
        }
    }

    /// Name of the archive, for logs
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of frames read so far
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

/// Fill `buf` as far as the reader allows, returning the byte count
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, MvisError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
