//! Chaining archive files into one continuous frame stream

use crate::error::MvisError;
use crate::source::FrameSource;
use crate::types::Frame;
use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[cfg(feature = "logging")]
use tracing::debug;

/// An ordered set of archive files read as a single stream of frames
///
/// Idle frames are consumed and never surfaced. Archives are opened lazily,
/// one at a time, when the previous one is exhausted.
#[derive(Debug)]
pub struct MultiFileStream {
    pending: VecDeque<PathBuf>,
    current: Option<(PathBuf, FrameSource<BufReader<File>>)>,
    archives_opened: usize,
    idle_skipped: u64,
    frames_returned: u64,
}

impl MultiFileStream {
    /// Build a stream over `paths` and open the first archive
    pub fn open(paths: Vec<PathBuf>) -> Result<Self, MvisError> {
        if paths.is_empty() {
            return Err(MvisError::NoValidFiles);
        }

        let mut stream = Self {
            pending: paths.into(),
            current: None,
            archives_opened: 0,
            idle_skipped: 0,
            frames_returned: 0,
        };
        stream.advance()?;
        Ok(stream)
    }

    /// Next non-idle frame, `None` once every archive is exhausted
    pub fn next_frame(&mut self) -> Result<Option<Frame>, MvisError> {
        loop {
            let Some((_, source)) = self.current.as_mut() else {
                return Ok(None);
            };

            match source.read_frame()? {
                Some(Frame::Idle) => self.idle_skipped += 1,
                Some(frame) => {
                    self.frames_returned += 1;
                    return Ok(Some(frame));
                }
                None => {
                    #[cfg(feature = "logging")]
                    debug!(
                        "Archive {} exhausted after {} frames",
                        source.label(),
                        source.frames_read()
                    );
                    self.current = None;
                    self.advance()?;
                }
            }
        }
    }

    /// Archive currently being read
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|(path, _)| path.as_path())
    }

    /// Number of archives opened so far
    pub fn archives_opened(&self) -> usize {
        self.archives_opened
    }

    /// Number of idle frames consumed
    pub fn idle_skipped(&self) -> u64 {
        self.idle_skipped
    }

    /// Number of frames handed out
    pub fn frames_returned(&self) -> u64 {
        self.frames_returned
    }

    fn advance(&mut self) -> Result<(), MvisError> {
        if let Some(path) = self.pending.pop_front() {
            let source = FrameSource::open(&path)?;
            self.archives_opened += 1;
            self.current = Some((path, source));
        }
        Ok(())
    }
}

impl Iterator for MultiFileStream {
    type Item = Result<Frame, MvisError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ArchiveBuilder;
    use crate::types::FileHeader;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_chains_archives_and_skips_idle() {
        let td = tempdir().unwrap();
        let first = td.path().join("a_001.dat");
        let second = td.path().join("b_001.dat");

        fs::write(
            &first,
            ArchiveBuilder::new()
                .idle()
                .new_file("x", 124)
                .idle()
                .data(0, b"one")
                .build()
                .unwrap(),
        )
        .unwrap();
        fs::write(
            &second,
            ArchiveBuilder::new().idle().data(1, b"two").idle().build().unwrap(),
        )
        .unwrap();

        let mut stream = MultiFileStream::open(vec![first.clone(), second.clone()]).unwrap();
        assert_eq!(stream.current_path(), Some(first.as_path()));

        assert_eq!(
            stream.next_frame().unwrap(),
            Some(Frame::NewFile(FileHeader::new("x", 124)))
        );
        assert!(matches!(stream.next_frame().unwrap(), Some(Frame::Data(d)) if d.tag == 0));
        assert!(matches!(stream.next_frame().unwrap(), Some(Frame::Data(d)) if d.tag == 1));
        assert_eq!(stream.current_path(), Some(second.as_path()));
        assert_eq!(stream.next_frame().unwrap(), None);
        assert_eq!(stream.next_frame().unwrap(), None);

        assert_eq!(stream.archives_opened(), 2);
        assert_eq!(stream.idle_skipped(), 4);
        assert_eq!(stream.frames_returned(), 3);
    }

    #[test]
    fn test_empty_archive_in_the_middle() {
        let td = tempdir().unwrap();
        let paths: Vec<_> = ["a_1.dat", "b_1.dat", "c_1.dat"]
            .iter()
            .map(|name| td.path().join(name))
            .collect();

        fs::write(&paths[0], ArchiveBuilder::new().data(0, b"a").build().unwrap()).unwrap();
        fs::write(&paths[1], ArchiveBuilder::new().build().unwrap()).unwrap();
        fs::write(&paths[2], ArchiveBuilder::new().data(1, b"c").build().unwrap()).unwrap();

        let frames: Vec<_> = MultiFileStream::open(paths)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_bad_magic_is_fatal() {
        let td = tempdir().unwrap();
        let good = td.path().join("a_1.dat");
        let bad = td.path().join("b_1.dat");

        fs::write(&good, ArchiveBuilder::new().data(0, b"a").build().unwrap()).unwrap();
        fs::write(&bad, b"XXXX000000000000").unwrap();

        let mut stream = MultiFileStream::open(vec![good, bad]).unwrap();
        assert!(stream.next_frame().unwrap().is_some());
        assert!(matches!(
            stream.next_frame(),
            Err(MvisError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_no_paths() {
        assert!(matches!(
            MultiFileStream::open(Vec::new()),
            Err(MvisError::NoValidFiles)
        ));
    }
}
