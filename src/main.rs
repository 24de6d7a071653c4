use std::{io::Write as _, path::PathBuf};

use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Apply operator policy to a rendered manifest stream and print the result.
    Process {
        /// Deployment intent describing the managed components and their overrides.
        #[clap(long)]
        intent: PathBuf,
        /// Clear resource requests and limits from deployments and jobs.
        #[clap(long)]
        skip_resources: bool,
        /// Multi-document yaml manifest stream.
        manifests: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let args = Args::parse();
    match args.command {
        Command::Process {
            intent,
            skip_resources,
            manifests,
        } => {
            let intent = quay_middleware::load_intent(&intent)?;
            let input = std::fs::read_to_string(&manifests)
                .with_context(|| format!("reading manifests `{}`", manifests.display()))?;

            let mut stdout = std::io::stdout().lock();
            quay_middleware::process_manifests(&intent, &input, skip_resources, &mut stdout)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn init_logging() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("warn"))
        .context("creating log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
