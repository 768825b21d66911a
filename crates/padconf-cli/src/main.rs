// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

mod error;

use clap::error::ErrorKind;
use clap::Parser;
use error::{result_to_exit_code, CliError};
use padconf::config::Topology;
use padconf::dispatch::Dispatcher;
use padconf::runner::SystemRunner;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// padconf - apply a media topology to V4L2 pads and verify every format
#[derive(Parser, Debug)]
#[command(name = "padconf")]
#[command(version)]
#[command(about = "padconf - apply a media topology to V4L2 pads and verify every format")]
#[command(long_about = None)]
struct Cli {
    /// Topology document (JSON) listing the pads to configure
    topology: PathBuf,

    /// Media controller device (overrides the topology document)
    #[arg(short = 'd', long, value_name = "DEVICE")]
    media_device: Option<PathBuf>,

    /// media-ctl executable (overrides the topology document)
    #[arg(long, value_name = "PATH")]
    media_ctl: Option<PathBuf>,

    /// yavta executable (overrides the topology document)
    #[arg(long, value_name = "PATH")]
    yavta: Option<PathBuf>,

    /// Skip the topology dump after all pads are applied
    #[arg(long)]
    no_summary: bool,

    /// Enable verbose logging (use RUST_LOG=debug for more)
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let usage = CliError::Usage(err.render().to_string());
                return result_to_exit_code::<()>(Err(usage));
            }
        },
    };

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet);

    result_to_exit_code(run(cli))
}

fn run(cli: Cli) -> Result<(), CliError> {
    log::debug!("Arguments: {:?}", cli);

    let mut topology = Topology::load(&cli.topology)?;
    if let Some(media_device) = cli.media_device {
        topology.media_device = media_device;
    }
    if let Some(media_ctl) = cli.media_ctl {
        topology.tools.media_ctl = media_ctl;
    }
    if let Some(yavta) = cli.yavta {
        topology.tools.yavta = yavta;
    }

    log::info!(
        "Applying {} pads from {} on {}",
        topology.pads.len(),
        cli.topology.display(),
        topology.media_device.display()
    );

    let stdout = io::stdout();
    let mut dispatcher = Dispatcher::new(
        SystemRunner,
        stdout.lock(),
        topology.media_device,
        topology.tools,
    )
    .with_summary(!cli.no_summary);

    let report = dispatcher.run(&topology.pads)?;
    log::info!("{} pads verified", report.pads.len());

    Ok(())
}

/// Initialize env_logger based on verbosity flags
fn init_logging(verbose: bool, quiet: bool) {
    // Determine log level from flags or RUST_LOG environment variable
    let env = env_logger::Env::default();

    let env = if quiet {
        env.default_filter_or("error")
    } else if verbose {
        env.default_filter_or("debug")
    } else {
        env.default_filter_or("info")
    };

    env_logger::Builder::from_env(env)
        .format_timestamp(None) // Disable timestamps for cleaner CLI output
        .format_target(false) // Disable target (module path) for cleaner output
        .init();

    log::debug!("Logging initialized");
}
