use std::path::PathBuf;

use anyhow::Context as _;
use url::Url;

pub const SOURCE_DIR_ENV: &str = "DOCS_SOURCE_DIR";
pub const ARCHIVE_URL_ENV: &str = "DOCS_ARCHIVE_URL";
pub const ARCHIVE_TOKEN_ENV: &str = "DOCS_ARCHIVE_TOKEN";
pub const ARCHIVE_AUTH_HEADER_ENV: &str = "DOCS_ARCHIVE_AUTH_HEADER";
pub const ARCHIVE_AUTH_SCHEME_ENV: &str = "DOCS_ARCHIVE_AUTH_SCHEME";
pub const ARCHIVE_BASIC_USER_ENV: &str = "DOCS_ARCHIVE_BASIC_USER";
pub const ARCHIVE_BASIC_PASS_ENV: &str = "DOCS_ARCHIVE_BASIC_PASS";
pub const ARCHIVE_HEADER_KEY_ENV: &str = "DOCS_ARCHIVE_HEADER_KEY";
pub const ARCHIVE_HEADER_VALUE_ENV: &str = "DOCS_ARCHIVE_HEADER_VALUE";
pub const PASSPHRASE_ENV: &str = "DOCS_PASSPHRASE";

/// Where `docvault sync` pulls documents from.
///
/// A local directory takes priority when both variables are set.
#[derive(Debug, Clone)]
pub enum SyncSource {
    LocalDir(PathBuf),
    ArchiveUrl(Url),
}

/// Optional credentials sent with the archive download request.
#[derive(Debug, Clone, Default)]
pub struct ArchiveAuth {
    pub token: Option<String>,
    pub auth_header: Option<String>,
    pub auth_scheme: Option<String>,
    pub basic_user: Option<String>,
    pub basic_pass: Option<String>,
    pub header_key: Option<String>,
    pub header_value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source: Option<SyncSource>,
    pub auth: ArchiveAuth,
}

impl SyncConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let source = match env_value(SOURCE_DIR_ENV) {
            Some(dir) => Some(SyncSource::LocalDir(PathBuf::from(dir))),
            None => match env_value(ARCHIVE_URL_ENV) {
                Some(raw) => {
                    let url = Url::parse(&raw)
                        .with_context(|| format!("parse {ARCHIVE_URL_ENV}: {raw}"))?;
                    if url.scheme() != "http" && url.scheme() != "https" {
                        anyhow::bail!("{ARCHIVE_URL_ENV} must be http/https: {url}");
                    }
                    Some(SyncSource::ArchiveUrl(url))
                }
                None => None,
            },
        };

        Ok(Self {
            source,
            auth: ArchiveAuth {
                token: env_value(ARCHIVE_TOKEN_ENV),
                auth_header: env_value(ARCHIVE_AUTH_HEADER_ENV),
                auth_scheme: env_value(ARCHIVE_AUTH_SCHEME_ENV),
                basic_user: env_value(ARCHIVE_BASIC_USER_ENV),
                basic_pass: env_value(ARCHIVE_BASIC_PASS_ENV),
                header_key: env_value(ARCHIVE_HEADER_KEY_ENV),
                header_value: env_value(ARCHIVE_HEADER_VALUE_ENV),
            },
        })
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
