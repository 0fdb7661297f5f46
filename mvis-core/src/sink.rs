//! Output sinks implementing the gap-filling policies
//!
//! The assembler reports every accepted block with its absolute block index
//! and announces skipped blocks beforehand. Each sink picks one of the two
//! policies: absolute-offset writes into a pre-sized buffer, or a streaming
//! cursor that steps over holes.

use crate::constants::{FillPolicy, MAX_BUFFERED_SIZE, PAYLOAD_SIZE};
use crate::error::MvisError;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Destination of one logical file's bytes
pub trait BlockSink {
    /// `blocks` payload chunks are missing before the next write
    fn skip(&mut self, blocks: u64) -> Result<(), MvisError>;

    /// Write the payload of the block at `index`
    fn write_block(&mut self, index: u64, data: &[u8]) -> Result<(), MvisError>;

    /// Flush everything and return the final output length
    fn finish(self: Box<Self>) -> Result<u64, MvisError>;
}

fn block_offset(index: u64) -> u64 {
    index * PAYLOAD_SIZE as u64
}

/// Pre-sized in-memory buffer written at absolute offsets
///
/// The buffer starts at the declared size, filled with the fill byte, so
/// missing blocks simply keep that value. With `FillPolicy::None` it starts
/// empty and grows to the highest extent written. Writes past the declared
/// size extend the buffer, up to `MAX_BUFFERED_SIZE` (or the declared size when
/// larger); a write beyond that fails with `MvisError::BufferLimit`.
pub struct BufferSink<W: Write> {
    buf: Vec<u8>,
    fill: FillPolicy,
    limit: u64,
    writer: W,
}

impl<W: Write> BufferSink<W> {
    /// Buffer for a file of `declared_size` bytes, written to `writer` at the end
    pub fn new(writer: W, declared_size: u32, fill: FillPolicy) -> Self {
        let size = declared_size as usize;
        let buf = match fill.byte() {
            Some(byte) => vec![byte; size],
            None => Vec::with_capacity(size),
        };
        Self {
            buf,
            fill,
            limit: u64::from(declared_size.max(MAX_BUFFERED_SIZE)),
            writer,
        }
    }

    /// Cap the buffer at `limit` bytes instead
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit.max(self.buf.len() as u64);
        self
    }

    /// Bytes currently held
    pub fn contents(&self) -> &[u8] {
        &self.buf
    }
}

impl<W: Write> BlockSink for BufferSink<W> {
    fn skip(&mut self, _blocks: u64) -> Result<(), MvisError> {
        Ok(())
    }

    fn write_block(&mut self, index: u64, data: &[u8]) -> Result<(), MvisError> {
        let needed = block_offset(index) + data.len() as u64;
        if needed > self.limit {
            return Err(MvisError::BufferLimit {
                needed,
                limit: self.limit,
            });
        }

        let start = block_offset(index) as usize;
        let end = start + data.len();
        if end > self.buf.len() {
            self.buf.resize(end, self.fill.byte().unwrap_or(0));
        }
        self.buf[start..end].copy_from_slice(data);
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<u64, MvisError> {
        self.writer.write_all(&self.buf)?;
        self.writer.flush()?;
        Ok(self.buf.len() as u64)
    }
}

/// Streaming writer that seeks over missing blocks
///
/// Holes read back as zero bytes on regular files. The output is never
/// truncated to the declared size.
pub struct SeekSink<W: Write + Seek> {
    writer: W,
}

impl<W: Write + Seek> SeekSink<W> {
    /// Stream into `writer` from its current position
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Seek> BlockSink for SeekSink<W> {
    fn skip(&mut self, blocks: u64) -> Result<(), MvisError> {
        self.writer
            .seek(SeekFrom::Current(block_offset(blocks) as i64))?;
        Ok(())
    }

    fn write_block(&mut self, _index: u64, data: &[u8]) -> Result<(), MvisError> {
        self.writer.write_all(data)?;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<u64, MvisError> {
        self.writer.flush()?;
        Ok(self.writer.stream_position()?)
    }
}

/// Streaming writer for targets that cannot seek, such as stdout
///
/// Missing blocks are written out explicitly with the fill byte, or with
/// zero bytes when no fill byte is configured.
pub struct PipeSink<W: Write> {
    writer: W,
    fill: u8,
    written: u64,
}

impl<W: Write> PipeSink<W> {
    /// Stream into `writer`
    pub fn new(writer: W, fill: FillPolicy) -> Self {
        Self {
            writer,
            fill: fill.byte().unwrap_or(0),
            written: 0,
        }
    }
}

impl<W: Write> BlockSink for PipeSink<W> {
    fn skip(&mut self, blocks: u64) -> Result<(), MvisError> {
        let len = block_offset(blocks);
        self.written += io::copy(&mut io::repeat(self.fill).take(len), &mut self.writer)?;
        Ok(())
    }

    fn write_block(&mut self, _index: u64, data: &[u8]) -> Result<(), MvisError> {
        self.writer.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<u64, MvisError> {
        self.writer.flush()?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    /// Writer keeping its bytes reachable after the sink is consumed
    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_buffer_prefilled() {
        let out = Shared::default();
        let mut sink = BufferSink::new(out.clone(), 124, FillPolicy::Space);
        sink.write_block(1, &[b'B'; 62]).unwrap();

        assert_eq!(&sink.contents()[..62], &[b' '; 62][..]);
        let len = Box::new(sink).finish().unwrap();

        assert_eq!(len, 124);
        assert_eq!(&out.0.borrow()[62..], &[b'B'; 62][..]);
    }

    #[test]
    fn test_buffer_extends_past_declared_size() {
        let out = Shared::default();
        let mut sink = BufferSink::new(out.clone(), 62, FillPolicy::Null);
        sink.write_block(2, b"xy").unwrap();
        let len = Box::new(sink).finish().unwrap();

        let bytes = out.0.borrow();
        assert_eq!(len, 126);
        assert!(bytes[..124].iter().all(|&b| b == 0));
        assert_eq!(&bytes[124..], b"xy");
    }

    #[test]
    fn test_buffer_growth_is_capped() {
        let out = Shared::default();
        let mut sink = BufferSink::new(out.clone(), 0, FillPolicy::Space).with_limit(124);
        sink.write_block(1, &[b'B'; 62]).unwrap();

        assert_eq!(
            sink.write_block(16384, &[b'C'; 62]),
            Err(MvisError::BufferLimit {
                needed: 16385 * 62,
                limit: 124
            })
        );
        assert_eq!(sink.contents().len(), 124);
        assert_eq!(Box::new(sink).finish().unwrap(), 124);
    }

    #[test]
    fn test_default_cap_covers_declared_size() {
        let sink = BufferSink::new(io::sink(), 0, FillPolicy::None);
        assert_eq!(sink.limit, u64::from(MAX_BUFFERED_SIZE));
    }

    #[test]
    fn test_buffer_without_fill_grows() {
        let out = Shared::default();
        let mut sink = BufferSink::new(out.clone(), 1000, FillPolicy::None);
        sink.write_block(1, b"ab").unwrap();
        let len = Box::new(sink).finish().unwrap();

        assert_eq!(len, 64);
        assert_eq!(&out.0.borrow()[62..], b"ab");
    }

    #[test]
    fn test_seek_sink_leaves_hole() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut sink = SeekSink::new(&mut cursor);
            sink.write_block(0, b"aa").unwrap();
            sink.skip(1).unwrap();
            sink.write_block(2, b"bb").unwrap();
            assert_eq!(Box::new(sink).finish().unwrap(), 66);
        }

        let bytes = cursor.into_inner();
        assert_eq!(&bytes[..2], b"aa");
        assert!(bytes[2..64].iter().all(|&b| b == 0));
        assert_eq!(&bytes[64..], b"bb");
    }

    #[test]
    fn test_pipe_sink_writes_fill() {
        let out = Shared::default();
        let mut sink = PipeSink::new(out.clone(), FillPolicy::Space);
        sink.skip(2).unwrap();
        sink.write_block(2, b"z").unwrap();

        assert_eq!(Box::new(sink).finish().unwrap(), 125);
        let bytes = out.0.borrow();
        assert!(bytes[..124].iter().all(|&b| b == b' '));
        assert_eq!(bytes[124], b'z');
    }
}
