pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "raziel")]
#[command(about = "Versioned, content-addressed file store")]
pub struct Args {
    /// Path to the raziel state directory (defaults to ~/.raziel)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
