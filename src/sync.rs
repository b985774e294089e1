use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::SyncArgs;
use crate::config::{ARCHIVE_URL_ENV, ArchiveAuth, SOURCE_DIR_ENV, SyncConfig, SyncSource};

/// Populates the documents working directory from the configured source and
/// flattens the result.
pub async fn run(args: SyncArgs) -> anyhow::Result<()> {
    let config = SyncConfig::from_env().context("read sync configuration")?;
    let docs_dir = PathBuf::from(&args.docs_dir);

    let Some(source) = config.source else {
        println!("No {SOURCE_DIR_ENV} or {ARCHIVE_URL_ENV} provided. Skipping document sync.");
        return Ok(());
    };

    ensure_clean_docs_dir(&docs_dir)?;

    match &source {
        SyncSource::LocalDir(dir) => copy_from_source_dir(dir, &docs_dir)?,
        SyncSource::ArchiveUrl(url) => {
            extract_from_archive(url, &config.auth, &docs_dir).await?;
        }
    }

    crate::flatten::flatten_documents_dir(&docs_dir).context("flatten documents directory")?;

    let count = count_pdfs(&docs_dir)?;
    let plural = if count == 1 { "" } else { "s" };
    println!("Document sync complete. {count} PDF{plural} available.");

    Ok(())
}

fn ensure_clean_docs_dir(docs_dir: &Path) -> anyhow::Result<()> {
    match std::fs::remove_dir_all(docs_dir) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("remove documents dir: {}", docs_dir.display()));
        }
    }
    std::fs::create_dir_all(docs_dir)
        .with_context(|| format!("create documents dir: {}", docs_dir.display()))?;
    Ok(())
}

fn copy_from_source_dir(source_dir: &Path, docs_dir: &Path) -> anyhow::Result<()> {
    if !source_dir.exists() {
        anyhow::bail!(
            "{SOURCE_DIR_ENV} does not exist: {}",
            source_dir.display()
        );
    }

    copy_dir_recursive(source_dir, docs_dir)
        .with_context(|| format!("copy documents from: {}", source_dir.display()))?;
    println!("Copied documents from local source {}", source_dir.display());
    Ok(())
}

fn copy_dir_recursive(source: &Path, destination: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(destination)
        .with_context(|| format!("create dir: {}", destination.display()))?;

    let mut entries = std::fs::read_dir(source)
        .with_context(|| format!("read dir: {}", source.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("list dir: {}", source.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let target = destination.join(entry.file_name());

        let file_type = entry.file_type().context("read file type")?;
        if file_type.is_dir() {
            copy_dir_recursive(&path, &target)?;
        } else if file_type.is_file() {
            std::fs::copy(&path, &target).with_context(|| {
                format!("copy {} -> {}", path.display(), target.display())
            })?;
        }
    }

    Ok(())
}

async fn extract_from_archive(
    url: &url::Url,
    auth: &ArchiveAuth,
    docs_dir: &Path,
) -> anyhow::Result<()> {
    let staging = tempfile::tempdir().context("create archive staging dir")?;
    let archive_path = staging
        .path()
        .join(format!("docs-{}.zip", uuid::Uuid::new_v4().simple()));

    crate::download::download_archive(url, auth, &archive_path)
        .await
        .context("download document archive")?;

    extract_zip(&archive_path, docs_dir)
        .with_context(|| format!("extract archive: {}", archive_path.display()))?;

    println!("Downloaded and extracted documents from {url}");
    Ok(())
    // `staging` is removed on drop, taking the downloaded archive with it.
}

fn extract_zip(archive_path: &Path, docs_dir: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("open archive: {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file).context("read zip archive")?;
    archive
        .extract(docs_dir)
        .with_context(|| format!("extract zip into: {}", docs_dir.display()))?;
    Ok(())
}

fn count_pdfs(docs_dir: &Path) -> anyhow::Result<usize> {
    if !docs_dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(docs_dir)
        .with_context(|| format!("read documents dir: {}", docs_dir.display()))?
    {
        let entry = entry.context("read documents dir entry")?;
        let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
        if entry.file_type().context("read file type")?.is_file() && name.ends_with(".pdf") {
            count += 1;
        }
    }
    Ok(count)
}
