//! Core types for MVIS frames

use crate::constants::{COUNTER_LIMIT, IDLE_TAG, NEW_FILE_TAG};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Header of a logical file, carried by a new-file sentinel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    /// Name of the logical file (relative path of the listing)
    pub name: String,

    /// Declared total size in bytes
    pub size: u32,
}

impl FileHeader {
    /// Create a new file header
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Payload chunk of the active logical file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame {
    /// Raw tag; a valid sequence counter is below `COUNTER_LIMIT`
    pub tag: u16,

    /// Payload bytes following the tag
    pub payload: Bytes,
}

impl DataFrame {
    /// Create a data frame
    pub fn new(tag: u16, payload: Bytes) -> Self {
        Self { tag, payload }
    }

    /// Sequence counter, if the tag is within range
    pub fn counter(&self) -> Option<u16> {
        (self.tag < COUNTER_LIMIT).then_some(self.tag)
    }
}

/// A decoded 64-byte frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Start of a new logical file
    NewFile(FileHeader),

    /// Payload chunk
    Data(DataFrame),

    /// Idle filler, carries nothing
    Idle,
}

impl Frame {
    /// Tag value this frame is written with
    pub fn tag(&self) -> u16 {
        match self {
            Frame::NewFile(_) => NEW_FILE_TAG,
            Frame::Data(data) => data.tag,
            Frame::Idle => IDLE_TAG,
        }
    }

    /// Check if this is an idle frame
    pub fn is_idle(&self) -> bool {
        matches!(self, Frame::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_range() {
        let ok = DataFrame::new(32767, Bytes::new());
        let bad = DataFrame::new(32768, Bytes::new());

        assert_eq!(ok.counter(), Some(32767));
        assert_eq!(bad.counter(), None);
    }

    #[test]
    fn test_tags() {
        assert_eq!(Frame::Idle.tag(), 0xFFFE);
        assert_eq!(Frame::NewFile(FileHeader::new("x", 1)).tag(), 0xFFFF);
        assert!(Frame::Idle.is_idle());
    }
}
