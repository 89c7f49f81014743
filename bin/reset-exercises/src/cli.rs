use std::path::PathBuf;

use clap::Parser;

/// Delete every exercise so that they can be re-imported.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
pub struct Args {
    /// Read configuration from a TOML file instead of the environment.
    #[arg(long)]
    pub(crate) config_path: Option<PathBuf>,

    /// Count the exercises that would be deleted without deleting them.
    #[arg(long)]
    pub(crate) dry_run: bool,
}
