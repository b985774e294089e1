use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Populate the documents directory from the configured source.
    Sync(SyncArgs),
    /// Generate the gallery manifest from the documents directory.
    Manifest(ManifestArgs),
    /// Run sync followed by manifest generation.
    Build(BuildArgs),
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Documents working directory (wiped and repopulated).
    #[arg(long, default_value = "public/documents")]
    pub docs_dir: String,
}

#[derive(Debug, Args)]
pub struct ManifestArgs {
    /// Documents working directory scanned for PDFs.
    #[arg(long, default_value = "public/documents")]
    pub docs_dir: String,

    /// Output file path for the manifest JSON.
    #[arg(long, default_value = "public/documents.json")]
    pub out: String,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Documents working directory (wiped and repopulated).
    #[arg(long, default_value = "public/documents")]
    pub docs_dir: String,

    /// Output file path for the manifest JSON.
    #[arg(long, default_value = "public/documents.json")]
    pub out: String,
}
