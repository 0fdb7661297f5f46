//! # MVIS Core
//!
//! Frame sequencing and reassembly engine rebuilding MVIS listings from
//! telemetry archives. Archives store listing content as 64-byte frames with
//! a wrapping 15-bit sequence counter, interleaved across raw capture files.
//!
//! ## Modules
//!
//! - `constants`: Frame geometry, sentinel tags, fill and payload modes
//! - `types`: Decoded frames
//! - `decoder` / `encoder`: Frame wire format
//! - `source`: One raw archive file as a frame reader
//! - `stream`: Several archives chained into one frame stream
//! - `grouper`: Retransmission dedup of archive paths
//! - `batch`: UPI driven directory walk
//! - `sequence`: Wrapping counter bookkeeping
//! - `sink`: Gap-filling output policies
//! - `assembler`: Reconstruction of one logical file
//! - `sequencer`: Routing frames into logical files
//! - `output`: Filesystem and stdout targets
//! - `report`: Missing-block report without output

#![warn(missing_docs)]

pub mod assembler;
pub mod batch;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod grouper;
pub mod output;
pub mod report;
pub mod sequence;
pub mod sequencer;
pub mod sink;
pub mod source;
pub mod stream;
pub mod types;

// Re-export commonly used types
pub use assembler::{FileAssembler, FileSummary};
pub use error::MvisError;
pub use sequencer::{FrameSequencer, OutputTarget, SequenceReport};
pub use stream::MultiFileStream;
pub use types::{DataFrame, FileHeader, Frame};

/// Result type alias for MVIS operations
pub type Result<T> = core::result::Result<T, MvisError>;
