//! Constants and limits for the MVIS archive format

use serde::{Deserialize, Serialize};

/// Magic bytes at the start of every raw archive file
pub const ARCHIVE_MAGIC: &[u8; 4] = b"MMA ";

/// Size of the header region following the magic, skipped before frame decoding
pub const ARCHIVE_HEADER_SKIP: usize = 12;

/// Size of one frame on the wire
pub const FRAME_SIZE: usize = 64;

/// Size of the big-endian tag opening every frame
pub const TAG_SIZE: usize = 2;

/// Payload carried by one data frame
pub const PAYLOAD_SIZE: usize = FRAME_SIZE - TAG_SIZE;

/// Size of the declared-size field of a new-file sentinel
pub const DECLARED_SIZE_LEN: usize = 4;

/// Room left for the file name in a new-file sentinel
pub const MAX_NAME_LEN: usize = FRAME_SIZE - TAG_SIZE - DECLARED_SIZE_LEN;

/// Tag announcing a new logical file
pub const NEW_FILE_TAG: u16 = 0xFFFF;

/// Tag of idle/filler frames
pub const IDLE_TAG: u16 = 0xFFFE;

/// Sequence counters live in `0..COUNTER_LIMIT`
pub const COUNTER_LIMIT: u16 = 32 << 10;

/// Mask applied to counter differences
pub const COUNTER_MASK: u16 = COUNTER_LIMIT - 1;

/// Suffix flagging archive files as bad
pub const BAD_SUFFIX: &str = ".bad";

/// Number of leading characters (channel id) skipped before matching a UPI
/// against an archive file name
pub const UPI_NAME_OFFSET: usize = 5;

/// Largest declared size reassembled in memory; larger files are streamed
pub const MAX_BUFFERED_SIZE: u32 = 256 << 20;

/// Byte used to occupy gaps left by missing frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// ASCII space (0x20)
    #[default]
    Space,
    /// Null byte (0x00)
    Null,
    /// No pre-fill: only what was written is materialized
    None,
}

impl FillPolicy {
    /// Byte written into gaps, if any
    pub const fn byte(&self) -> Option<u8> {
        match self {
            FillPolicy::Space => Some(b' '),
            FillPolicy::Null => Some(0x00),
            FillPolicy::None => None,
        }
    }
}

/// How payload bytes are extracted from data frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadMode {
    /// Write all payload bytes of every frame
    #[default]
    Binary,
    /// Trim the trailing run of null bytes of every frame before writing
    Text,
}

impl PayloadMode {
    /// Short name used in logs
    pub const fn as_str(&self) -> &'static str {
        match self {
            PayloadMode::Binary => "binary",
            PayloadMode::Text => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_geometry() {
        assert_eq!(PAYLOAD_SIZE, 62);
        assert_eq!(MAX_NAME_LEN, 58);
        assert_eq!(COUNTER_LIMIT, 32768);
        assert_eq!(COUNTER_MASK, 0x7FFF);
    }

    #[test]
    fn test_fill_bytes() {
        assert_eq!(FillPolicy::Space.byte(), Some(0x20));
        assert_eq!(FillPolicy::Null.byte(), Some(0x00));
        assert_eq!(FillPolicy::None.byte(), None);
    }
}
