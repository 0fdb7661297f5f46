//! Error types for MVIS archive operations

/// Errors raised while reading archives and rebuilding listings
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MvisError {
    /// Archive file does not start with the expected magic
    #[error("Bad magic in {path}: expected \"MMA \", got {found:?}")]
    BadMagic {
        /// Archive the magic was read from.
        path: String,
        /// The bytes actually found.
        found: [u8; 4],
    },

    /// Archive file ends inside its magic or header region
    #[error("Truncated archive header in {0}")]
    TruncatedHeader(String),

    /// Frame cut short at the end of an archive file
    #[error("Incomplete frame: expected {expected} bytes, got {actual}")]
    IncompleteFrame {
        /// The number of bytes expected.
        expected: usize,
        /// The number of bytes actually found.
        actual: usize,
    },

    /// Data frame tag outside of the counter range
    #[error("Invalid sequence counter ({0})")]
    InvalidCounter(u16),

    /// Buffered output would grow past its memory limit
    #[error("Buffered output would reach {needed} bytes (limit {limit})")]
    BufferLimit {
        /// Length the write needs.
        needed: u64,
        /// Largest length allowed.
        limit: u64,
    },

    /// Archive path without the `_` delimiting its UPI prefix
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// File name does not fit in a new-file sentinel
    #[error("File name too long: {0} bytes (max {1})")]
    NameTooLong(usize, usize),

    /// Payload does not fit in a data frame
    #[error("Payload size {0} exceeds frame payload {1}")]
    PayloadTooLarge(usize, usize),

    /// Nothing left to process once bad files and retransmissions are removed
    #[error("No valid files provided")]
    NoValidFiles,

    /// UPI list is empty
    #[error("No UPI provided")]
    NoUpi,

    /// IO error during read/write
    #[error("IO error: {0}")]
    Io(String),
}

impl MvisError {
    /// Whether this error comes from malformed input rather than the filesystem
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            MvisError::BadMagic { .. }
                | MvisError::TruncatedHeader(_)
                | MvisError::IncompleteFrame { .. }
                | MvisError::InvalidCounter(_)
                | MvisError::BufferLimit { .. }
                | MvisError::InvalidFilename(_)
        )
    }
}

impl From<std::io::Error> for MvisError {
    fn from(err: std::io::Error) -> Self {
        MvisError::Io(err.to_string())
    }
}

impl From<walkdir::Error> for MvisError {
    fn from(err: walkdir::Error) -> Self {
        MvisError::Io(err.to_string())
    }
}
