//! Routing the frame stream into logical files

use crate::assembler::{FileAssembler, FileSummary};
use crate::error::MvisError;
use crate::types::{FileHeader, Frame};
use serde::Serialize;

#[cfg(feature = "logging")]
use tracing::{error, info, warn};

/// Where reconstructed files go
pub trait OutputTarget {
    /// Create the assembler for a newly announced logical file
    fn open(&mut self, header: &FileHeader) -> Result<FileAssembler, MvisError>;

    /// Called once a logical file is closed and its checksum sealed
    fn finished(&mut self, _summary: &FileSummary) -> Result<(), MvisError> {
        Ok(())
    }
}

impl<T: OutputTarget + ?Sized> OutputTarget for &mut T {
    fn open(&mut self, header: &FileHeader) -> Result<FileAssembler, MvisError> {
        (**self).open(header)
    }

    fn finished(&mut self, summary: &FileSummary) -> Result<(), MvisError> {
        (**self).finished(summary)
    }
}

/// Outcome of one reconstruction run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SequenceReport {
    /// Files closed normally, in stream order
    pub files: Vec<FileSummary>,

    /// Data frames seen before any new-file sentinel
    pub dropped_frames: u64,

    /// Files abandoned on malformed input (bad counter, name or buffer overrun)
    pub aborted_files: Vec<String>,
}

impl SequenceReport {
    /// Missing blocks over all closed files
    pub fn missing_blocks(&self) -> u64 {
        self.files.iter().map(|f| f.missing).sum()
    }
}

enum State {
    Idle,
    Writing(FileAssembler),
}

/// State machine turning a frame stream into logical files
///
/// A new-file sentinel closes the active file, if any, and opens the next
/// one through the [`OutputTarget`]. Data frames go to the active file.
/// Malformed input abandons only the active file; IO errors stop the run.
pub struct FrameSequencer<T: OutputTarget> {
    target: T,
    state: State,
    report: SequenceReport,
}

impl<T: OutputTarget> FrameSequencer<T> {
    /// Sequencer writing through `target`
    pub fn new(target: T) -> Self {
        Self {
            target,
            state: State::Idle,
            report: SequenceReport::default(),
        }
    }

    /// Feed every frame of `frames`, then close the last file
    pub fn run<I>(mut self, frames: I) -> Result<SequenceReport, MvisError>
    where
        I: IntoIterator<Item = Result<Frame, MvisError>>,
    {
        for frame in frames {
            self.push(frame?)?;
        }
        self.finish()
    }

    /// Process one frame
    pub fn push(&mut self, frame: Frame) -> Result<(), MvisError> {
        match frame {
            Frame::Idle => Ok(()),
            Frame::NewFile(header) => {
                self.finalize()?;
                let assembler = match self.target.open(&header) {
                    Ok(assembler) => assembler,
                    Err(_e) if _e.is_format_error() => {
                        #[cfg(feature = "logging")]
                        error!("cannot create {}: {}", header.name, _e);
                        self.report.aborted_files.push(header.name);
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                };

                #[cfg(feature = "logging")]
                info!(
                    "==> {} ({} file, {} bytes, {} blocks)",
                    assembler.path(),
                    assembler.mode().as_str(),
                    header.size,
                    header.size / crate::constants::PAYLOAD_SIZE as u32
                );

                self.state = State::Writing(assembler);
                Ok(())
            }
            Frame::Data(data) => {
                let result = match &mut self.state {
                    State::Idle => {
                        #[cfg(feature = "logging")]
                        warn!("Dropping block {} received outside of any file", data.tag);
                        self.report.dropped_frames += 1;
                        return Ok(());
                    }
                    State::Writing(assembler) => assembler.write(&data),
                };

                match result {
                    Ok(_) => Ok(()),
                    Err(e) if e.is_format_error() => self.abort(e),
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Close the active file and return the run report
    pub fn finish(mut self) -> Result<SequenceReport, MvisError> {
        self.finalize()?;
        Ok(self.report)
    }

    /// Whether a logical file is currently open
    pub fn is_writing(&self) -> bool {
        matches!(self.state, State::Writing(_))
    }

    fn finalize(&mut self) -> Result<(), MvisError> {
        if let State::Writing(assembler) = std::mem::replace(&mut self.state, State::Idle) {
            let summary = assembler.close()?;

            #[cfg(feature = "logging")]
            info!(
                "<== {} ({} blocks, {} bytes, {} missing, checksum {})",
                summary.path, summary.blocks, summary.bytes, summary.missing, summary.checksum
            );

            self.target.finished(&summary)?;
            self.report.files.push(summary);
        }
        Ok(())
    }

    fn abort(&mut self, _cause: MvisError) -> Result<(), MvisError> {
        if let State::Writing(assembler) = std::mem::replace(&mut self.state, State::Idle) {
            #[cfg(feature = "logging")]
            error!("error when writing {}: {}", assembler.path(), _cause);

            let name = assembler.header().name.clone();
            assembler.abandon()?;
            self.report.aborted_files.push(name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FillPolicy, PayloadMode, PAYLOAD_SIZE};
    use crate::sink::BufferSink;
    use crate::types::DataFrame;
    use bytes::Bytes;
    use std::io;

    /// Discards output, keeps summaries
    #[derive(Default)]
    struct NullTarget {
        opened: Vec<String>,
        finished: Vec<String>,
    }

    impl OutputTarget for NullTarget {
        fn open(&mut self, header: &FileHeader) -> Result<FileAssembler, MvisError> {
            self.opened.push(header.name.clone());
            let sink = BufferSink::new(io::sink(), header.size, FillPolicy::Space);
            Ok(FileAssembler::new(
                header.clone(),
                header.name.clone(),
                PayloadMode::Binary,
                Box::new(sink),
            ))
        }

        fn finished(&mut self, summary: &FileSummary) -> Result<(), MvisError> {
            self.finished.push(summary.name.clone());
            Ok(())
        }
    }

    fn new_file(name: &str, size: u32) -> Result<Frame, MvisError> {
        Ok(Frame::NewFile(FileHeader::new(name, size)))
    }

    fn data(tag: u16) -> Result<Frame, MvisError> {
        Ok(Frame::Data(DataFrame::new(
            tag,
            Bytes::from(vec![b'x'; PAYLOAD_SIZE]),
        )))
    }

    #[test]
    fn test_files_closed_in_order() {
        let mut target = NullTarget::default();
        let report = FrameSequencer::new(&mut target)
            .run(vec![
                new_file("a", 124),
                data(0),
                data(1),
                new_file("b", 62),
                data(0),
            ])
            .unwrap();

        assert_eq!(target.opened, vec!["a", "b"]);
        assert_eq!(target.finished, vec!["a", "b"]);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].blocks, 2);
        assert_eq!(report.files[1].blocks, 1);
    }

    #[test]
    fn test_data_before_first_file_dropped() {
        let report = FrameSequencer::new(NullTarget::default())
            .run(vec![data(0), data(1), new_file("a", 62), data(0)])
            .unwrap();

        assert_eq!(report.dropped_frames, 2);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].blocks, 1);
    }

    #[test]
    fn test_invalid_counter_aborts_only_active_file() {
        let mut target = NullTarget::default();
        let report = FrameSequencer::new(&mut target)
            .run(vec![
                new_file("a", 124),
                data(0),
                data(40000),
                data(1),
                new_file("b", 62),
                data(0),
            ])
            .unwrap();

        assert_eq!(report.aborted_files, vec!["a"]);
        assert_eq!(report.dropped_frames, 1);
        assert_eq!(target.finished, vec!["b"]);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].name, "b");
    }

    #[test]
    fn test_unusable_name_skips_file() {
        struct Picky;

        impl OutputTarget for Picky {
            fn open(&mut self, header: &FileHeader) -> Result<FileAssembler, MvisError> {
                if header.name == ".." {
                    return Err(MvisError::InvalidFilename(header.name.clone()));
                }
                NullTarget::default().open(header)
            }
        }

        let report = FrameSequencer::new(Picky)
            .run(vec![new_file("..", 62), data(0), new_file("ok", 62), data(0)])
            .unwrap();

        assert_eq!(report.aborted_files, vec![".."]);
        assert_eq!(report.dropped_frames, 1);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].name, "ok");
    }

    #[test]
    fn test_runaway_buffer_aborts_file() {
        struct Capped;

        impl OutputTarget for Capped {
            fn open(&mut self, header: &FileHeader) -> Result<FileAssembler, MvisError> {
                let sink = BufferSink::new(io::sink(), header.size, FillPolicy::Space)
                    .with_limit(4096);
                Ok(FileAssembler::new(
                    header.clone(),
                    header.name.clone(),
                    PayloadMode::Binary,
                    Box::new(sink),
                ))
            }
        }

        let mut frames = vec![new_file("runaway", 0)];
        frames.extend((0..100u32).map(|i| data((i * 16383 % 32768) as u16)));
        frames.push(new_file("next", 62));
        frames.push(data(0));

        let report = FrameSequencer::new(Capped).run(frames).unwrap();

        assert_eq!(report.aborted_files, vec!["runaway"]);
        assert_eq!(report.dropped_frames, 98);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].name, "next");
    }

    #[test]
    fn test_idle_frames_invisible() {
        let report = FrameSequencer::new(NullTarget::default())
            .run(vec![
                new_file("a", 124),
                Ok(Frame::Idle),
                data(0),
                Ok(Frame::Idle),
                data(1),
            ])
            .unwrap();

        assert_eq!(report.files[0].blocks, 2);
        assert_eq!(report.files[0].missing, 0);
    }

    #[test]
    fn test_stream_error_propagates() {
        let result = FrameSequencer::new(NullTarget::default()).run(vec![
            new_file("a", 62),
            Err(MvisError::Io("read failed".into())),
        ]);

        assert!(matches!(result, Err(MvisError::Io(_))));
    }

    #[test]
    fn test_empty_file_closed() {
        let report = FrameSequencer::new(NullTarget::default())
            .run(vec![new_file("a", 62), new_file("b", 62)])
            .unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].blocks, 0);
        assert_eq!(report.files[0].checksum, blake3::hash(b"").to_hex().to_string());
    }
}
