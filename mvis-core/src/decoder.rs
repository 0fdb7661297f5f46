//! Frame decoding

use crate::constants::{DECLARED_SIZE_LEN, FRAME_SIZE, IDLE_TAG, NEW_FILE_TAG, TAG_SIZE};
use crate::error::MvisError;
use crate::types::{DataFrame, FileHeader, Frame};
use bytes::Bytes;

/// Decode one frame from exactly `FRAME_SIZE` bytes
///
/// Layout:
/// 1. Tag (2 bytes, big-endian)
/// 2. For a new-file sentinel: declared size (4 bytes, big-endian) then the
///    name, padded with zero bytes
/// 3. For a data frame: the payload chunk
///
/// Out-of-range counters are not rejected here; the assembler owns that rule.
pub fn decode_frame(data: &[u8]) -> Result<Frame, MvisError> {
    if data.len() != FRAME_SIZE {
        return Err(MvisError::IncompleteFrame {
            expected: FRAME_SIZE,
            actual: data.len(),
        });
    }

    let tag = u16::from_be_bytes([data[0], data[1]]);

    let frame = match tag {
        IDLE_TAG => Frame::Idle,
        NEW_FILE_TAG => {
            let size = u32::from_be_bytes([data[2], data[3], data[4], data[5]]);
            let name = trim_nulls(&data[TAG_SIZE + DECLARED_SIZE_LEN..]);
            Frame::NewFile(FileHeader::new(String::from_utf8_lossy(name), size))
        }
        _ => Frame::Data(DataFrame::new(
            tag,
            Bytes::copy_from_slice(&data[TAG_SIZE..]),
        )),
    };

    Ok(frame)
}

/// Strip zero bytes from both ends
fn trim_nulls(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| b != 0).map_or(start, |p| p + 1);
    &bytes[start..end]
}

/// Strip the trailing run of zero bytes (text mode payloads)
pub fn trim_trailing_nulls(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PAYLOAD_SIZE;
    use crate::encoder::{encode_data, encode_idle, encode_new_file};

    #[test]
    fn test_decode_new_file() {
        let raw = encode_new_file("MVIS/listing.txt", 124).unwrap();
        let frame = decode_frame(&raw).unwrap();

        assert_eq!(
            frame,
            Frame::NewFile(FileHeader::new("MVIS/listing.txt", 124))
        );
    }

    #[test]
    fn test_decode_data() {
        let raw = encode_data(7, b"hello").unwrap();
        let frame = decode_frame(&raw).unwrap();

        match frame {
            Frame::Data(data) => {
                assert_eq!(data.counter(), Some(7));
                assert_eq!(data.payload.len(), PAYLOAD_SIZE);
                assert_eq!(&data.payload[..5], b"hello");
                assert!(data.payload[5..].iter().all(|&b| b == 0));
            }
            other => panic!("expected data frame, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_idle() {
        let raw = encode_idle();
        assert_eq!(decode_frame(&raw).unwrap(), Frame::Idle);
    }

    #[test]
    fn test_out_of_range_tag_is_data() {
        let mut raw = [0u8; FRAME_SIZE];
        raw[0] = 0x90;
        let frame = decode_frame(&raw).unwrap();

        match frame {
            Frame::Data(data) => {
                assert_eq!(data.tag, 0x9000);
                assert_eq!(data.counter(), None);
            }
            other => panic!("expected data frame, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_short_buffer() {
        let result = decode_frame(&[0xFF; 10]);
        assert!(matches!(
            result,
            Err(MvisError::IncompleteFrame {
                expected: 64,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_name_trimmed_both_ends() {
        let mut raw = [0u8; FRAME_SIZE];
        raw[0] = 0xFF;
        raw[1] = 0xFF;
        raw[5] = 9;
        raw[8..11].copy_from_slice(b"abc");
        let frame = decode_frame(&raw).unwrap();

        assert_eq!(frame, Frame::NewFile(FileHeader::new("abc", 9)));
    }

    #[test]
    fn test_trim_trailing_nulls() {
        assert_eq!(trim_trailing_nulls(b"ab\0c\0\0"), b"ab\0c");
        assert_eq!(trim_trailing_nulls(b"\0\0"), b"");
        assert_eq!(trim_trailing_nulls(b"abc"), b"abc");
    }
}
