pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spand")]
#[command(about = "Manage a storage namespace spanned across pooled accounts")]
pub struct Args {
    /// Path to the spandrive config directory (defaults to ~/.spandrive)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
