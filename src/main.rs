use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    docvault::logging::init().context("init logging")?;

    let cli = docvault::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        docvault::cli::Command::Sync(args) => {
            docvault::sync::run(args).await.context("sync")?;
        }
        docvault::cli::Command::Manifest(args) => {
            docvault::manifest::run(args).context("manifest")?;
        }
        docvault::cli::Command::Build(args) => {
            docvault::build::run(args).await.context("build")?;
        }
    }

    Ok(())
}
