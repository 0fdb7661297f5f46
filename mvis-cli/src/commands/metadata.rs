use chrono::{DateTime, SecondsFormat, Utc};
use mvis_core::{
    output::FileOutput, FileAssembler, FileHeader, FileSummary, MvisError, OutputTarget,
};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Program name written into descriptors
pub const PROGRAM: &str = "mvis2list";

/// Version written into descriptors
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build identifier, set through `MVIS_BUILD_ID` at compile time
pub const BUILD: &str = match option_env!("MVIS_BUILD_ID") {
    Some(build) => build,
    None => "dev",
};

/// Descriptor written next to each listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Name of the producing program
    pub program: String,
    /// Version of the producing program
    pub version: String,
    /// Build identifier of the producing program
    pub build: String,
    /// RFC 3339 UTC time the descriptor was written
    pub time: String,
    /// Path of the listing
    pub filename: String,
    /// Size announced by the new-file sentinel
    pub size: u32,
    /// Hex BLAKE3 digest of the listing bytes
    pub checksum: String,
    /// Data frames written
    pub blocks: u64,
    /// Payload bytes written
    pub bytes: u64,
    /// Frames that never arrived
    pub missing: u64,
}

impl Descriptor {
    /// Descriptor of `summary`, stamped with `when`
    pub fn new(summary: &FileSummary, when: DateTime<Utc>) -> Self {
        Self {
            program: PROGRAM.to_string(),
            version: VERSION.to_string(),
            build: BUILD.to_string(),
            time: when.to_rfc3339_opts(SecondsFormat::Secs, true),
            filename: summary.path.clone(),
            size: summary.declared_size,
            checksum: summary.checksum.clone(),
            blocks: summary.blocks,
            bytes: summary.bytes,
            missing: summary.missing,
        }
    }
}

/// Path of the descriptor of a listing
pub fn descriptor_path(listing: &str) -> PathBuf {
    PathBuf::from(format!("{}.json", listing))
}

/// Write the descriptor of `summary` next to its listing
///
/// A descriptor that fails to serialize is removed rather than left half written.
pub fn write_descriptor(summary: &FileSummary) -> Result<PathBuf, MvisError> {
    let path = descriptor_path(&summary.path);
    let descriptor = Descriptor::new(summary, Utc::now());

    let result = write_json(&path, &descriptor);
    if result.is_err() {
        let _ = fs::remove_file(&path);
    }
    result.map(|_| path)
}

fn write_json(path: &Path, descriptor: &Descriptor) -> Result<(), MvisError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, descriptor)
        .map_err(|e| MvisError::Io(e.to_string()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// File output that also emits descriptors when asked to
pub struct ListingTarget {
    output: FileOutput,
    emit_metadata: bool,
    descriptors: Vec<PathBuf>,
}

impl ListingTarget {
    /// Write through `output`, adding a descriptor per file when `emit_metadata` is set
    pub fn new(output: FileOutput, emit_metadata: bool) -> Self {
        Self {
            output,
            emit_metadata,
            descriptors: Vec::new(),
        }
    }

    /// Descriptors written so far
    pub fn descriptors(&self) -> &[PathBuf] {
        &self.descriptors
    }
}

impl OutputTarget for ListingTarget {
    fn open(&mut self, header: &FileHeader) -> Result<FileAssembler, MvisError> {
        self.output.open(header)
    }

    fn finished(&mut self, summary: &FileSummary) -> Result<(), MvisError> {
        if !self.emit_metadata {
            return Ok(());
        }
        let path = write_descriptor(summary)?;
        info!("Metadata written to: {}", path.display());
        self.descriptors.push(path);
        Ok(())
    }
}
