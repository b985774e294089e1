use anyhow::Context as _;

use crate::cli::{BuildArgs, ManifestArgs, SyncArgs};

/// Runs the full pipeline: sync the documents directory, then regenerate the
/// manifest from it.
pub async fn run(args: BuildArgs) -> anyhow::Result<()> {
    tracing::info!(docs_dir = %args.docs_dir, "build: sync");
    crate::sync::run(SyncArgs {
        docs_dir: args.docs_dir.clone(),
    })
    .await
    .context("sync")?;

    tracing::info!(out = %args.out, "build: manifest");
    crate::manifest::run(ManifestArgs {
        docs_dir: args.docs_dir,
        out: args.out,
    })
    .context("manifest")?;

    Ok(())
}
