use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

/// Moves every PDF below the top level of `docs_dir` to the top level and
/// removes directories left empty afterwards.
///
/// Name collisions get a `-1`, `-2`, ... suffix before the extension, checked
/// against both the names already claimed and the filesystem. Files already
/// at the top level keep their names, so running this on a flat directory is
/// a no-op.
pub fn flatten_documents_dir(docs_dir: &Path) -> anyhow::Result<()> {
    if !docs_dir.exists() {
        return Ok(());
    }

    let mut seen: HashSet<String> = HashSet::new();
    for entry in std::fs::read_dir(docs_dir)
        .with_context(|| format!("read documents dir: {}", docs_dir.display()))?
    {
        let entry = entry.context("read documents dir entry")?;
        seen.insert(entry.file_name().to_string_lossy().to_string());
    }

    move_pdfs(docs_dir, docs_dir, &mut seen)
}

fn move_pdfs(docs_dir: &Path, current_dir: &Path, seen: &mut HashSet<String>) -> anyhow::Result<()> {
    let mut entries = std::fs::read_dir(current_dir)
        .with_context(|| format!("read dir: {}", current_dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("list dir: {}", current_dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        let file_type = entry.file_type().context("read file type")?;

        if file_type.is_dir() {
            move_pdfs(docs_dir, &path, seen)?;

            let is_empty = std::fs::read_dir(&path)
                .with_context(|| format!("re-read dir: {}", path.display()))?
                .next()
                .is_none();
            if is_empty {
                std::fs::remove_dir(&path)
                    .with_context(|| format!("remove empty dir: {}", path.display()))?;
            }
            continue;
        }

        if !file_type.is_file() || !is_pdf(&name) {
            continue;
        }

        if current_dir == docs_dir {
            seen.insert(name);
            continue;
        }

        let destination_name = unique_name(docs_dir, &name, seen);
        let destination = docs_dir.join(&destination_name);
        std::fs::rename(&path, &destination).with_context(|| {
            format!("move {} -> {}", path.display(), destination.display())
        })?;
        tracing::info!(
            from = %path.display(),
            to = %destination_name,
            "flattened"
        );
    }

    Ok(())
}

fn is_pdf(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

/// Picks an unused top-level name, appending `-<counter>` before the
/// extension until neither the seen-set nor the filesystem claims it.
fn unique_name(docs_dir: &Path, name: &str, seen: &mut HashSet<String>) -> String {
    if !seen.contains(name) && !docs_dir.join(name).exists() {
        seen.insert(name.to_owned());
        return name.to_owned();
    }

    let path = PathBuf::from(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_owned());
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = format!("{stem}-{counter}{extension}");
        if !seen.contains(&candidate) && !docs_dir.join(&candidate).exists() {
            seen.insert(candidate.clone());
            return candidate;
        }
        counter += 1;
    }
}
