// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Existing checkout of the sample programs archive; cloned when omitted
    #[arg(short, long, env = "SUBETE_SOURCE_DIR")]
    pub source_dir: Option<PathBuf>,

    /// Checkout of the documentation website, for project articles
    #[arg(short, long, env = "SUBETE_DOCS_DIR")]
    pub docs_dir: Option<PathBuf>,

    /// Remote to clone when no source directory is given
    #[arg(long, env = "SUBETE_REMOTE", default_value = subete::repo::DEFAULT_REMOTE)]
    pub remote: String,

    /// Show the programs of one language (readable or folder name)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Seed for the random program pick
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render progress bars while loading
    #[arg(long)]
    pub progress: bool,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}
