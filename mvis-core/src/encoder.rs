//! Frame and archive encoding
//!
//! The production pipeline only reads archives; the encoder exists to build
//! archives for tests, benchmarks and fuzzing seeds.

use crate::constants::{
    ARCHIVE_HEADER_SKIP, ARCHIVE_MAGIC, FRAME_SIZE, IDLE_TAG, MAX_NAME_LEN, NEW_FILE_TAG,
    PAYLOAD_SIZE,
};
use crate::error::MvisError;
use bytes::{BufMut, Bytes, BytesMut};

/// Encode a new-file sentinel
///
/// Layout: tag `0xFFFF`, declared size (4 bytes, big-endian), name padded
/// with zero bytes to the end of the frame.
pub fn encode_new_file(name: &str, size: u32) -> Result<Bytes, MvisError> {
    if name.len() > MAX_NAME_LEN {
        return Err(MvisError::NameTooLong(name.len(), MAX_NAME_LEN));
    }

    let mut buf = BytesMut::with_capacity(FRAME_SIZE);
    buf.put_u16(NEW_FILE_TAG);
    buf.put_u32(size);
    buf.put_slice(name.as_bytes());
    buf.resize(FRAME_SIZE, 0);

    Ok(buf.freeze())
}

/// Encode a data frame with the given raw tag
///
/// Short payloads are padded with zero bytes.
pub fn encode_data(tag: u16, payload: &[u8]) -> Result<Bytes, MvisError> {
    if payload.len() > PAYLOAD_SIZE {
        return Err(MvisError::PayloadTooLarge(payload.len(), PAYLOAD_SIZE));
    }

    let mut buf = BytesMut::with_capacity(FRAME_SIZE);
    buf.put_u16(tag);
    buf.put_slice(payload);
    buf.resize(FRAME_SIZE, 0);

    Ok(buf.freeze())
}

/// Encode an idle filler frame
pub fn encode_idle() -> Bytes {
    let mut buf = BytesMut::with_capacity(FRAME_SIZE);
    buf.put_u16(IDLE_TAG);
    buf.resize(FRAME_SIZE, 0);
    buf.freeze()
}

/// Builder for raw archive files
///
/// ```
/// use mvis_core::encoder::ArchiveBuilder;
///
/// let archive = ArchiveBuilder::new()
///     .new_file("X", 124)
///     .data(0, &[b'A'; 62])
///     .idle()
///     .data(1, &[b'B'; 62])
///     .build()
///     .unwrap();
///
/// assert_eq!(archive.len(), 4 + 12 + 4 * 64);
/// ```
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    header: [u8; ARCHIVE_HEADER_SKIP],
    frames: Vec<Pending>,
}

#[derive(Debug)]
enum Pending {
    NewFile(String, u32),
    Data(u16, Vec<u8>),
    Idle,
    Raw(Vec<u8>),
}

impl ArchiveBuilder {
    /// Create an empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header region written after the magic
    pub fn header(mut self, header: [u8; ARCHIVE_HEADER_SKIP]) -> Self {
        self.header = header;
        self
    }

    /// Append a new-file sentinel
    pub fn new_file(mut self, name: impl Into<String>, size: u32) -> Self {
        self.frames.push(Pending::NewFile(name.into(), size));
        self
    }

    /// Append a data frame
    pub fn data(mut self, tag: u16, payload: &[u8]) -> Self {
        self.frames.push(Pending::Data(tag, payload.to_vec()));
        self
    }

    /// Append an idle frame
    pub fn idle(mut self) -> Self {
        self.frames.push(Pending::Idle);
        self
    }

    /// Append raw bytes as-is (used to build truncated archives)
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.frames.push(Pending::Raw(bytes.to_vec()));
        self
    }

    /// Encode the archive
    pub fn build(self) -> Result<Bytes, MvisError> {
        let mut buf = BytesMut::with_capacity(
            ARCHIVE_MAGIC.len() + ARCHIVE_HEADER_SKIP + self.frames.len() * FRAME_SIZE,
        );
        buf.put_slice(ARCHIVE_MAGIC);
        buf.put_slice(&self.header);

        for frame in &self.frames {
            match frame {
                Pending::NewFile(name, size) => buf.put_slice(&encode_new_file(name, *size)?),
                Pending::Data(tag, payload) => buf.put_slice(&encode_data(*tag, payload)?),
                Pending::Idle => buf.put_slice(&encode_idle()),
                Pending::Raw(bytes) => buf.put_slice(bytes),
            }
        }

        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_new_file_layout() {
        let frame = encode_new_file("abc", 0x0102_0304).unwrap();

        assert_eq!(frame.len(), FRAME_SIZE);
        assert_eq!(&frame[..6], &[0xFF, 0xFF, 0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&frame[6..9], b"abc");
        assert!(frame[9..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_name_too_long() {
        let name = "n".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            encode_new_file(&name, 1),
            Err(MvisError::NameTooLong(59, 58))
        ));
    }

    #[test]
    fn test_payload_too_large() {
        assert!(matches!(
            encode_data(0, &[0u8; 63]),
            Err(MvisError::PayloadTooLarge(63, 62))
        ));
    }

    #[test]
    fn test_archive_prefix() {
        let archive = ArchiveBuilder::new().idle().build().unwrap();

        assert_eq!(&archive[..4], b"MMA ");
        assert_eq!(archive.len(), 4 + ARCHIVE_HEADER_SKIP + FRAME_SIZE);
        assert_eq!(&archive[16..18], &[0xFF, 0xFE]);
    }
}
