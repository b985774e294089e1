use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::ManifestArgs;
use crate::formats::DocumentEntry;
use crate::metadata;

/// Scans the documents directory and writes the gallery manifest.
pub fn run(args: ManifestArgs) -> anyhow::Result<()> {
    let docs_dir = PathBuf::from(&args.docs_dir);
    let out_path = PathBuf::from(&args.out);

    std::fs::create_dir_all(&docs_dir)
        .with_context(|| format!("create documents dir: {}", docs_dir.display()))?;

    let entries = scan_documents(&docs_dir).context("scan documents directory")?;

    write_manifest(&out_path, &entries)
        .with_context(|| format!("write manifest: {}", out_path.display()))?;

    println!("Generated file list for {} documents:", entries.len());
    for entry in &entries {
        println!("- {}: {}", entry.name, entry.description);
    }

    Ok(())
}

/// Builds one entry per PDF, sorted by filename so the manifest is
/// deterministic. Ids that slugify identically are deduplicated with the
/// same counter rule the flatten step uses for filenames.
pub fn scan_documents(docs_dir: &Path) -> anyhow::Result<Vec<DocumentEntry>> {
    let mut file_names = Vec::new();
    for entry in std::fs::read_dir(docs_dir)
        .with_context(|| format!("read documents dir: {}", docs_dir.display()))?
    {
        let entry = entry.context("read documents dir entry")?;
        if !entry.file_type().context("read file type")?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.to_ascii_lowercase().ends_with(".pdf") {
            file_names.push(name);
        }
    }
    file_names.sort();

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut entries = Vec::with_capacity(file_names.len());
    for file_name in file_names {
        let stem = &file_name[..file_name.len() - ".pdf".len()];
        entries.push(DocumentEntry {
            id: unique_id(metadata::slug_id(stem), &mut seen_ids),
            name: metadata::format_title(stem),
            description: metadata::describe(stem).to_owned(),
            file: format!("/documents/{file_name}"),
        });
    }

    Ok(entries)
}

fn unique_id(slug: String, seen: &mut HashSet<String>) -> String {
    if seen.insert(slug.clone()) {
        return slug;
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{slug}-{counter}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

fn write_manifest(out_path: &Path, entries: &[DocumentEntry]) -> anyhow::Result<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create manifest parent dir: {}", parent.display()))?;
    }

    let tmp_path = out_path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(entries).context("serialize manifest")?;
    std::fs::write(&tmp_path, &data)
        .with_context(|| format!("write tmp manifest: {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, out_path)
        .with_context(|| format!("rename tmp manifest to: {}", out_path.display()))?;

    Ok(())
}
