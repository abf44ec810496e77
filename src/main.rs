//! Fsimager CLI: crawl directories and store a structured image of every reachable file.

use anyhow::Result;
use clap::Parser;
use fsimager::engine::arg_parser::Cli;
use fsimager::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
