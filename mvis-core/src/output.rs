//! Output configuration and the filesystem/stdout target

use crate::assembler::FileAssembler;
use crate::constants::{FillPolicy, PayloadMode, MAX_BUFFERED_SIZE};
use crate::error::MvisError;
use crate::sequencer::OutputTarget;
use crate::sink::{BlockSink, BufferSink, PipeSink, SeekSink};
use crate::types::FileHeader;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Component, Path, PathBuf};

#[cfg(feature = "logging")]
use tracing::warn;

/// Where listings are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// One file per logical file, under this directory
    Directory(PathBuf),
    /// Every logical file concatenated on standard output
    Stdout,
}

impl Destination {
    /// Parse a destination argument, `-` meaning standard output
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Destination::Stdout
        } else {
            Destination::Directory(PathBuf::from(arg))
        }
    }
}

/// How missing blocks are laid out in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapStrategy {
    /// Pre-sized in-memory buffer, payloads at absolute offsets
    #[default]
    Buffered,
    /// Streaming writes, seeking over missing blocks
    Seek,
}

/// Settings applied to every reconstructed file
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Where files go
    pub destination: Destination,
    /// Gap layout
    pub strategy: GapStrategy,
    /// Byte filling gaps
    pub fill: FillPolicy,
    /// Text or binary payloads
    pub mode: PayloadMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination: Destination::Stdout,
            strategy: GapStrategy::default(),
            fill: FillPolicy::default(),
            mode: PayloadMode::default(),
        }
    }
}

/// Writes listings to disk or standard output
#[derive(Debug, Clone)]
pub struct FileOutput {
    config: OutputConfig,
}

impl FileOutput {
    /// Target applying `config`
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    fn strategy_for(&self, header: &FileHeader) -> GapStrategy {
        if self.config.strategy == GapStrategy::Buffered && header.size > MAX_BUFFERED_SIZE {
            #[cfg(feature = "logging")]
            warn!(
                "{} declares {} bytes, streaming instead of buffering",
                header.name, header.size
            );
            return GapStrategy::Seek;
        }
        self.config.strategy
    }
}

impl OutputTarget for FileOutput {
    fn open(&mut self, header: &FileHeader) -> Result<FileAssembler, MvisError> {
        let fill = self.config.fill;
        let strategy = self.strategy_for(header);

        let (path, sink): (String, Box<dyn BlockSink>) = match &self.config.destination {
            Destination::Directory(dir) => {
                let path = listing_path(dir, &header.name)?;
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let file = File::create(&path)?;
                let sink: Box<dyn BlockSink> = match strategy {
                    GapStrategy::Buffered => Box::new(BufferSink::new(file, header.size, fill)),
                    GapStrategy::Seek => Box::new(SeekSink::new(BufWriter::new(file))),
                };
                (path.display().to_string(), sink)
            }
            Destination::Stdout => {
                let sink: Box<dyn BlockSink> = match strategy {
                    GapStrategy::Buffered => {
                        Box::new(BufferSink::new(io::stdout(), header.size, fill))
                    }
                    GapStrategy::Seek => Box::new(PipeSink::new(io::stdout(), fill)),
                };
                (header.name.clone(), sink)
            }
        };

        Ok(FileAssembler::new(
            header.clone(),
            path,
            self.config.mode,
            sink,
        ))
    }
}

/// Path of a listing under `dir`, keeping the announced name inside it
///
/// Root, prefix and parent components of the name are dropped.
pub fn listing_path(dir: &Path, name: &str) -> Result<PathBuf, MvisError> {
    let relative: PathBuf = Path::new(name)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    if relative.as_os_str().is_empty() {
        return Err(MvisError::InvalidFilename(name.to_string()));
    }
    Ok(dir.join(relative))
}
