use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use base64::Engine as _;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, LOCATION, USER_AGENT};
use url::Url;

use crate::config::ArchiveAuth;

const MAX_REDIRECTS: usize = 5;
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads the archive at `url` to `destination`, following at most
/// [`MAX_REDIRECTS`] redirects by hand so the bound is exact. Any
/// non-redirect response other than 200 is fatal.
pub async fn download_archive(
    url: &Url,
    auth: &ArchiveAuth,
    destination: &Path,
) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("build archive http client")?;

    let headers = build_headers(auth).context("build archive request headers")?;

    let mut current = url.clone();
    let mut redirects = 0usize;

    loop {
        let response = client
            .get(current.clone())
            .headers(headers.clone())
            .header(USER_AGENT, "docvault/0.1")
            .send()
            .await
            .with_context(|| format!("GET {current}"))?;

        let status = response.status();
        if status.is_redirection() {
            if redirects >= MAX_REDIRECTS {
                anyhow::bail!("too many redirects while downloading document archive");
            }
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    anyhow::anyhow!("redirect without location header: {current}")
                })?;
            let next = current
                .join(location)
                .with_context(|| format!("resolve redirect location: {location}"))?;
            tracing::debug!(from = %current, to = %next, "following redirect");
            current = next;
            redirects += 1;
            continue;
        }

        if status != StatusCode::OK {
            anyhow::bail!("failed to download archive ({status}): {current}");
        }

        return write_body_to_file(response, destination).await;
    }
}

async fn write_body_to_file(
    mut response: reqwest::Response,
    destination: &Path,
) -> anyhow::Result<()> {
    let mut file = std::fs::File::create(destination)
        .with_context(|| format!("create download file: {}", destination.display()))?;

    while let Some(chunk) = response.chunk().await.context("read archive chunk")? {
        file.write_all(&chunk)
            .with_context(|| format!("write download file: {}", destination.display()))?;
    }

    file.flush()
        .with_context(|| format!("flush download file: {}", destination.display()))?;
    Ok(())
}

/// Assembles the request headers from the configured auth inputs.
///
/// Bearer and basic are independent; basic overwrites a bearer header that
/// used the default `Authorization` name. The custom header is applied last,
/// regardless of the other two.
pub fn build_headers(auth: &ArchiveAuth) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(token) = &auth.token {
        let name = auth.auth_header.as_deref().unwrap_or("Authorization");
        let scheme = auth.auth_scheme.as_deref().unwrap_or("Bearer");
        let value = if scheme.is_empty() {
            token.clone()
        } else {
            format!("{scheme} {token}")
        };
        headers.insert(
            HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid auth header name: {name}"))?,
            HeaderValue::from_str(&value).context("invalid auth header value")?,
        );
    }

    if let (Some(user), Some(pass)) = (&auth.basic_user, &auth.basic_pass) {
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}"))
                .context("invalid basic auth header value")?,
        );
    }

    if let (Some(key), Some(value)) = (&auth.header_key, &auth.header_value) {
        headers.insert(
            HeaderName::from_bytes(key.as_bytes())
                .with_context(|| format!("invalid custom header name: {key}"))?,
            HeaderValue::from_str(value).context("invalid custom header value")?,
        );
    }

    Ok(headers)
}
