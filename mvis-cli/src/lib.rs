//! Library entry for mvis-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use mvis_core::constants::FillPolicy;
use mvis_core::output::GapStrategy;

/// Byte used to fill missing blocks
#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum FillArg {
    /// ASCII space (0x20)
    Space,
    /// Null byte (0x00)
    Null,
    /// Do not pre-fill the output
    None,
}

impl From<FillArg> for FillPolicy {
    fn from(arg: FillArg) -> Self {
        match arg {
            FillArg::Space => FillPolicy::Space,
            FillArg::Null => FillPolicy::Null,
            FillArg::None => FillPolicy::None,
        }
    }
}

/// Layout of missing blocks in the output
#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum StrategyArg {
    /// Pre-sized buffer, payloads written at absolute offsets
    Buffered,
    /// Streaming output, seeking over missing blocks
    Seek,
}

impl From<StrategyArg> for GapStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Buffered => GapStrategy::Buffered,
            StrategyArg::Seek => GapStrategy::Seek,
        }
    }
}
