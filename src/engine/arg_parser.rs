use clap::Parser;
use std::path::PathBuf;

/// Filesystem imager: catalog every file reachable from the given entrypoints.
#[derive(Clone, Parser)]
#[command(name = "fsimager")]
#[command(about = "Crawl directories and build a structured image of every reachable file.")]
pub struct Cli {
    /// Exclude files under the specified locations. Can be given multiple times.
    #[arg(long, short = 'e', value_name = "DIR")]
    pub excluded_dirs: Vec<PathBuf>,

    /// Load the named extensions before crawling. Can be given multiple times.
    #[arg(long, short = 'l', value_name = "NAME")]
    pub load_extensions: Vec<String>,

    /// Only show errors.
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Number of dispatch workers. 1 means fully sequential.
    #[arg(long, short = 't', default_value_t = 1)]
    pub threads: usize,

    /// Connection string for imaging a remote filesystem.
    #[arg(long, short = 'r', value_name = "CONN")]
    pub remote: Option<String>,

    /// Start crawling from these directories.
    #[arg(value_name = "ENTRYPOINT", required = true, num_args = 1..)]
    pub entrypoints: Vec<PathBuf>,

    /// Store the created image in this file.
    #[arg(value_name = "IMAGE_FILE")]
    pub image_file: PathBuf,
}
