use anyhow::{Context, Result};
use appmap::{OsFilesystem, Reporter};
use log::info;
use std::{io, path::PathBuf};
use structopt::StructOpt;

/// Show statistics for AppMaps
#[derive(StructOpt)]
#[structopt(name = "appmap-stats")]
struct Options {
    /// Skip AppMaps larger than this many bytes
    #[structopt(long, env = "APPMAP_STATS_MAX_SIZE", default_value = "2097152000")]
    max_size: u64,
    /// Number of signatures listed in each ranking
    #[structopt(long, env = "APPMAP_STATS_TOP", default_value = "20")]
    top: usize,
    /// AppMap files, or directories to search for them
    #[structopt(parse(from_os_str), required = true)]
    paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    // Load from .env file if it is present
    dotenv::dotenv().ok();
    // Initialize logging
    env_logger::init();
    // Get command line arguments
    let options = Options::from_args();
    // Resolve the inputs up front, any failure here ends the run before a single AppMap is read
    let discovery = appmap::find_appmaps(&options.paths, options.max_size).context("Failed finding AppMaps")?;
    info!("{} appmaps admitted, {} skipped", discovery.appmaps.len(), discovery.skipped.len());
    // Statistics go to stdout, everything else to stderr
    let mut reporter = Reporter::new(io::stdout(), io::stderr(), options.top);
    for skipped in &discovery.skipped {
        reporter.diagnostic(skipped)?;
    }
    appmap::run(&OsFilesystem, &discovery.appmaps, &mut reporter)?;

    Ok(())
}
