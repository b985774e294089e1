use serde::{Deserialize, Serialize};

/// One gallery entry in the generated manifest.
///
/// `file` is the public path the gallery fetches, always of the form
/// `/documents/<filename>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub file: String,
}
