//! Command handler: map parsed args onto an imaging run.

use anyhow::Result;
use std::sync::Arc;

use crate::context::{FsContext, LocalFs};
use crate::error::ImagerError;
use crate::pipeline::orchestrator::{RunConfig, run};
use crate::types::ImageOpts;
use crate::utils::setup_logging;

use super::arg_parser::Cli;

/// Handle the run: logging, context selection, orchestration, exit codes.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.quiet);

    if let Some(conn) = &cli.remote {
        // Remote transports plug in behind FsContext; none is compiled into
        // this build. Exits 1 through main's Result.
        log::error!(
            "'--remote' ('{}') requested but remote transport support is not available",
            conn
        );
        return Err(ImagerError::RemoteUnavailable.into());
    }
    let fs: Arc<dyn FsContext> = Arc::new(LocalFs);

    let config = RunConfig {
        entrypoints: cli.entrypoints.clone(),
        image_file: cli.image_file.clone(),
        extensions: cli.load_extensions.clone(),
        opts: ImageOpts {
            threads: cli.threads.max(1),
            excluded_dirs: cli.excluded_dirs.clone(),
        },
    };

    match run(&config, fs) {
        Ok(_written) => Ok(()),
        Err(err) => {
            if let Some(ImagerError::NoValidEntrypoints) = err.downcast_ref::<ImagerError>() {
                log::error!("No valid entrypoints found, exiting");
                std::process::exit(255);
            }
            Err(err)
        }
    }
}
