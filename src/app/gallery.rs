use std::path::Path;

use anyhow::Context as _;

use crate::formats::DocumentEntry;

/// The manifest as served to the gallery client.
///
/// Loaded once at startup, mirroring the original's build-time embedding of
/// the generated file list.
#[derive(Debug, Clone)]
pub struct DocumentLibrary {
    entries: Vec<DocumentEntry>,
}

impl DocumentLibrary {
    /// Reads the manifest written by `docvault manifest`. A missing file
    /// yields an empty library rather than an error; the gallery renders its
    /// empty state instead.
    pub fn load(manifest_path: &Path) -> anyhow::Result<Self> {
        let bytes = match std::fs::read(manifest_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %manifest_path.display(),
                    "manifest not found; serving empty gallery"
                );
                return Ok(Self {
                    entries: Vec::new(),
                });
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("read manifest: {}", manifest_path.display()));
            }
        };

        let entries = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse manifest: {}", manifest_path.display()))?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }
}
