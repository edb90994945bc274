use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser)]
#[clap(
    version,
    about = "Course documents, tutorials and favorites for every class"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding the persisted state
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Directory holding the class datasets
    #[clap(long, value_parser)]
    pub datasets_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the edushelf application
    #[clap(subcommand)]
    pub command: Commands,
}
