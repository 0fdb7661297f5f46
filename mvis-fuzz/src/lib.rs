//! Fuzzing entry points for mvis-core
//!
//! Each function takes arbitrary bytes and must never panic. They can be
//! wired into a cargo-fuzz target:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Call the entry point from `fuzz_target!`

use mvis_core::{
    constants::{FillPolicy, PayloadMode},
    sink::BufferSink,
    source::FrameSource,
    FileAssembler, FileHeader, FrameSequencer, MvisError, OutputTarget,
};
use std::io::{self, Cursor};

/// Largest declared size buffered while fuzzing
const FUZZ_MAX_SIZE: u32 = 1 << 16;

pub fn fuzz_decode(data: &[u8]) {
    use mvis_core::decoder::decode_frame;

    // Try to decode - should never panic
    let _ = decode_frame(data);
}

pub fn fuzz_archive(data: &[u8]) {
    let Ok(mut source) = FrameSource::new(Cursor::new(data), "fuzz") else {
        return;
    };
    while let Ok(Some(_)) = source.read_frame() {}
}

struct Discard;

impl OutputTarget for Discard {
    fn open(&mut self, header: &FileHeader) -> Result<FileAssembler, MvisError> {
        let size = header.size.min(FUZZ_MAX_SIZE);
        Ok(FileAssembler::new(
            header.clone(),
            header.name.clone(),
            PayloadMode::Text,
            Box::new(
                BufferSink::new(io::sink(), size, FillPolicy::None)
                    .with_limit(u64::from(FUZZ_MAX_SIZE)),
            ),
        ))
    }
}

pub fn fuzz_sequencer(data: &[u8]) {
    let Ok(mut source) = FrameSource::new(Cursor::new(data), "fuzz") else {
        return;
    };
    let frames = std::iter::from_fn(move || source.read_frame().transpose());
    let _ = FrameSequencer::new(Discard).run(frames);
}
