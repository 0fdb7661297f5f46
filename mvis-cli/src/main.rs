use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mvis_cli::commands::{
    blocks,
    inputs::{self, InputOptions},
    reconstruct::{self, ReconstructOptions},
};
use mvis_cli::{FillArg, StrategyArg};
use mvis_core::output::Destination;
use std::path::PathBuf;
use tracing::info_span;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "mvis2list")]
#[command(about = "Rebuild MVIS listings from recorded archive files", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Archive selection shared by every command
#[derive(Args)]
struct InputArgs {
    /// Archive files (read from stdin, one per line, when omitted)
    paths: Vec<String>,

    /// Keep archives flagged as bad
    #[arg(short, long)]
    keep: bool,

    /// Walk this directory for archives instead of taking paths
    #[arg(short, long)]
    batch: Option<PathBuf>,

    /// File listing the UPIs to pick in batch mode
    #[arg(short, long, requires = "batch")]
    upis: Option<PathBuf>,
}

impl From<InputArgs> for InputOptions {
    fn from(args: InputArgs) -> Self {
        Self {
            paths: args.paths,
            keep: args.keep,
            batch: args.batch,
            upis: args.upis,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the files carried by the archives
    Reconstruct {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output directory, `-` for standard output
        #[arg(short, long, default_value = "-")]
        datadir: String,

        /// Write a JSON descriptor next to each listing
        #[arg(short, long)]
        meta: bool,

        /// Payloads are text: drop the trailing null bytes of each block
        #[arg(short, long)]
        text: bool,

        /// Byte used for missing blocks
        #[arg(long, value_enum, default_value = "space")]
        fill: FillArg,

        /// Layout of missing blocks
        #[arg(long, value_enum, default_value = "buffered")]
        strategy: StrategyArg,
    },

    /// Print every frame and the block summary
    List {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Print the block summary only
    Report {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is kept for listings
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let span = info_span!("run");
    let _guard = span.enter();

    match cli.command {
        Commands::Reconstruct {
            inputs,
            datadir,
            meta,
            text,
            fill,
            strategy,
        } => {
            let archives = inputs::resolve(&inputs.into())?;
            let opts = ReconstructOptions {
                destination: Destination::parse(&datadir),
                meta,
                text,
                fill: fill.into(),
                strategy: strategy.into(),
            };
            reconstruct::execute(archives, &opts).map(|_| ())
        }

        Commands::List { inputs } => {
            let archives = inputs::resolve(&inputs.into())?;
            blocks::execute(archives, true).map(|_| ())
        }

        Commands::Report { inputs } => {
            let archives = inputs::resolve(&inputs.into())?;
            blocks::execute(archives, false).map(|_| ())
        }
    }
}
