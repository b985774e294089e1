use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use docvault::app::auth::AuthService;
use docvault::app::gallery::DocumentLibrary;
use docvault::app::server::{AppState, router};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Documents directory served at /documents.
    #[arg(long, default_value = "public/documents")]
    docs_dir: PathBuf,

    /// Manifest file generated by `docvault manifest`.
    #[arg(long, default_value = "public/documents.json")]
    manifest: PathBuf,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    docvault::logging::init().context("init logging")?;

    let args = AppArgs::parse();
    tracing::info!(?args, "starting docvault-app");

    let auth = AuthService::from_env();
    let library = DocumentLibrary::load(&args.manifest).context("load document library")?;
    tracing::info!(documents = library.entries().len(), "loaded manifest");

    let state = AppState {
        auth,
        library: Arc::new(library),
    };
    let app = router(state, &args.docs_dir);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "install ctrl-c handler");
    }
}
