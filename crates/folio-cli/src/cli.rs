use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio: inspect and copy PDF object graphs",
    version,
)]
/// Top-level command line.
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the objects of a document
    Inspect(InspectArgs),
    /// Copy objects into a new document
    Copy(CopyArgs),
    /// Show the effective document configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct CopyArgs {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Object numbers to copy
    #[arg(short = 'o', long = "object", required = true, num_args = 1..)]
    pub objects: Vec<u32>,
    /// Copy shared objects once per reference instead of once per document
    #[arg(long)]
    pub allow_duplicating: bool,
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigArgs {
    pub path: Option<PathBuf>,
}
