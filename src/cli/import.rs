//! `taskify import`

use clap::Args;
use std::path::PathBuf;

/// Arguments for the import subcommand
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Snapshot written by `taskify export`, plain or gzipped
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Owner of the imported board (default: the snapshot's owner)
    #[arg(short, long)]
    pub user: Option<String>,
}

impl ImportArgs {
    pub fn owner<'a>(&'a self, snapshot_owner: &'a str) -> &'a str {
        self.user.as_deref().unwrap_or(snapshot_owner)
    }
}
