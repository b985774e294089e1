use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use docvault::formats::DocumentEntry;
use predicates::prelude::*;

const PDF_STUB: &[u8] = b"%PDF-1.4\n%%EOF\n";

/// Loopback archive server: `/chain/<n>` hops redirect `chain_len` times
/// before landing on `/archive.zip`, which optionally requires an
/// `Authorization` header.
struct ArchiveServer {
    zip_bytes: Vec<u8>,
    required_authorization: Option<String>,
    chain_len: usize,
}

fn spawn_archive_server(
    config: ArchiveServer,
) -> (String, mpsc::Sender<()>, thread::JoinHandle<()>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let addr = server.server_addr();
    let base_url = format!("http://{addr}");

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let path = request.url().split('?').next().unwrap_or("").to_string();

            if let Some(hop) = path.strip_prefix("/chain/") {
                let hop: usize = hop.parse().expect("chain hop index");
                let next = if hop + 1 < config.chain_len {
                    format!("/chain/{}", hop + 1)
                } else {
                    "/archive.zip".to_string()
                };
                let response = tiny_http::Response::from_string("")
                    .with_status_code(302)
                    .with_header(
                        tiny_http::Header::from_bytes(&b"Location"[..], next.as_bytes())
                            .expect("location header"),
                    );
                let _ = request.respond(response);
                continue;
            }

            if path == "/archive.zip" {
                if let Some(required) = &config.required_authorization {
                    let sent = request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string());
                    if sent.as_deref() != Some(required.as_str()) {
                        let _ = request.respond(
                            tiny_http::Response::from_string("unauthorized")
                                .with_status_code(401),
                        );
                        continue;
                    }
                }

                let response = tiny_http::Response::from_data(config.zip_bytes.clone())
                    .with_header(
                        tiny_http::Header::from_bytes(
                            &b"Content-Type"[..],
                            &b"application/zip"[..],
                        )
                        .expect("content-type header"),
                    );
                let _ = request.respond(response);
                continue;
            }

            if path == "/broken.zip" {
                let _ = request.respond(
                    tiny_http::Response::from_string("boom").with_status_code(500),
                );
                continue;
            }

            let _ = request
                .respond(tiny_http::Response::from_string("not found").with_status_code(404));
        }
    });

    (base_url, shutdown_tx, handle)
}

fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, bytes) in entries {
        zip.start_file(*name, options).expect("zip start_file");
        zip.write_all(bytes).expect("zip write");
    }

    zip.finish().expect("zip finish").into_inner()
}

/// `docvault` with every sync-related variable scrubbed from the ambient
/// environment, so tests only see what they set themselves.
fn docvault_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docvault");
    for var in [
        "DOCS_SOURCE_DIR",
        "DOCS_ARCHIVE_URL",
        "DOCS_ARCHIVE_TOKEN",
        "DOCS_ARCHIVE_AUTH_HEADER",
        "DOCS_ARCHIVE_AUTH_SCHEME",
        "DOCS_ARCHIVE_BASIC_USER",
        "DOCS_ARCHIVE_BASIC_PASS",
        "DOCS_ARCHIVE_HEADER_KEY",
        "DOCS_ARCHIVE_HEADER_VALUE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write_pdf(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, PDF_STUB).expect("write pdf stub");
}

fn sorted_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    let temp = tempfile::tempdir().expect("tempdir");
    let docs_dir = temp.path().join("documents");

    docvault_cmd()
        .env("RUST_LOG", "debug")
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}

#[test]
fn sync_skips_when_no_source_is_configured() {
    let temp = tempfile::tempdir().expect("tempdir");
    let docs_dir = temp.path().join("documents");
    write_pdf(&docs_dir.join("existing.pdf"));

    docvault_cmd()
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping document sync."));

    // The working directory MUST NOT be wiped on skip.
    assert!(docs_dir.join("existing.pdf").exists());
}

#[test]
fn sync_copies_flattens_and_dedupes_a_local_source() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    write_pdf(&source.join("a.pdf"));
    write_pdf(&source.join("sub").join("a.pdf"));
    write_pdf(&source.join("sub").join("nested").join("b.pdf"));

    let docs_dir = temp.path().join("documents");
    docvault_cmd()
        .env("DOCS_SOURCE_DIR", source.to_str().unwrap())
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied documents from local source"))
        .stdout(predicate::str::contains(
            "Document sync complete. 3 PDFs available.",
        ));

    assert_eq!(sorted_names(&docs_dir), vec!["a-1.pdf", "a.pdf", "b.pdf"]);
}

#[test]
fn sync_replaces_previous_working_directory_contents() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    write_pdf(&source.join("fresh.pdf"));

    let docs_dir = temp.path().join("documents");
    write_pdf(&docs_dir.join("stale.pdf"));

    docvault_cmd()
        .env("DOCS_SOURCE_DIR", source.to_str().unwrap())
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(sorted_names(&docs_dir), vec!["fresh.pdf"]);
}

#[test]
fn sync_fails_when_the_local_source_is_missing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let docs_dir = temp.path().join("documents");

    docvault_cmd()
        .env(
            "DOCS_SOURCE_DIR",
            temp.path().join("absent").to_str().unwrap(),
        )
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn sync_prefers_the_local_source_over_the_archive_url() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    write_pdf(&source.join("local.pdf"));

    let docs_dir = temp.path().join("documents");
    docvault_cmd()
        .env("DOCS_SOURCE_DIR", source.to_str().unwrap())
        // Unreachable on purpose; it must never be contacted.
        .env("DOCS_ARCHIVE_URL", "http://127.0.0.1:9/archive.zip")
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(sorted_names(&docs_dir), vec!["local.pdf"]);
}

#[test]
fn sync_downloads_extracts_and_flattens_an_archive() {
    let zip_bytes = build_archive(&[
        ("a.pdf", PDF_STUB),
        ("sub/a.pdf", PDF_STUB),
        ("sub/readme.txt", b"not a pdf"),
    ]);
    let (base_url, shutdown_tx, handle) = spawn_archive_server(ArchiveServer {
        zip_bytes,
        required_authorization: None,
        chain_len: 0,
    });

    let temp = tempfile::tempdir().expect("tempdir");
    let docs_dir = temp.path().join("documents");
    docvault_cmd()
        .env("DOCS_ARCHIVE_URL", format!("{base_url}/archive.zip"))
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Downloaded and extracted documents from",
        ))
        .stdout(predicate::str::contains(
            "Document sync complete. 2 PDFs available.",
        ));

    assert_eq!(sorted_names(&docs_dir), vec!["a-1.pdf", "a.pdf", "sub"]);
    assert!(docs_dir.join("sub").join("readme.txt").exists());

    let _ = shutdown_tx.send(());
    let _ = handle.join();
}

#[test]
fn sync_sends_the_bearer_token_with_the_download() {
    let zip_bytes = build_archive(&[("a.pdf", PDF_STUB)]);
    let (base_url, shutdown_tx, handle) = spawn_archive_server(ArchiveServer {
        zip_bytes,
        required_authorization: Some("Bearer sesame".to_string()),
        chain_len: 0,
    });

    let temp = tempfile::tempdir().expect("tempdir");
    let docs_dir = temp.path().join("documents");

    // Without the token the server answers 401 and the sync MUST fail.
    docvault_cmd()
        .env("DOCS_ARCHIVE_URL", format!("{base_url}/archive.zip"))
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to download archive"));

    docvault_cmd()
        .env("DOCS_ARCHIVE_URL", format!("{base_url}/archive.zip"))
        .env("DOCS_ARCHIVE_TOKEN", "sesame")
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(sorted_names(&docs_dir), vec!["a.pdf"]);

    let _ = shutdown_tx.send(());
    let _ = handle.join();
}

#[test]
fn sync_follows_a_chain_of_five_redirects() {
    let zip_bytes = build_archive(&[("a.pdf", PDF_STUB)]);
    let (base_url, shutdown_tx, handle) = spawn_archive_server(ArchiveServer {
        zip_bytes,
        required_authorization: None,
        chain_len: 5,
    });

    let temp = tempfile::tempdir().expect("tempdir");
    let docs_dir = temp.path().join("documents");
    docvault_cmd()
        .env("DOCS_ARCHIVE_URL", format!("{base_url}/chain/0"))
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(sorted_names(&docs_dir), vec!["a.pdf"]);

    let _ = shutdown_tx.send(());
    let _ = handle.join();
}

#[test]
fn sync_rejects_a_sixth_redirect() {
    let zip_bytes = build_archive(&[("a.pdf", PDF_STUB)]);
    let (base_url, shutdown_tx, handle) = spawn_archive_server(ArchiveServer {
        zip_bytes,
        required_authorization: None,
        chain_len: 6,
    });

    let temp = tempfile::tempdir().expect("tempdir");
    let docs_dir = temp.path().join("documents");
    docvault_cmd()
        .env("DOCS_ARCHIVE_URL", format!("{base_url}/chain/0"))
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too many redirects"));

    let _ = shutdown_tx.send(());
    let _ = handle.join();
}

#[test]
fn sync_fails_on_a_non_success_status() {
    let (base_url, shutdown_tx, handle) = spawn_archive_server(ArchiveServer {
        zip_bytes: Vec::new(),
        required_authorization: None,
        chain_len: 0,
    });

    let temp = tempfile::tempdir().expect("tempdir");
    let docs_dir = temp.path().join("documents");
    docvault_cmd()
        .env("DOCS_ARCHIVE_URL", format!("{base_url}/broken.zip"))
        .args(["sync", "--docs-dir", docs_dir.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to download archive"));

    let _ = shutdown_tx.send(());
    let _ = handle.join();
}

#[test]
fn manifest_generates_the_expected_entry() {
    let temp = tempfile::tempdir().expect("tempdir");
    let docs_dir = temp.path().join("documents");
    write_pdf(&docs_dir.join("Drone_Haftpflicht.pdf"));

    let out_path = temp.path().join("documents.json");
    docvault_cmd()
        .args([
            "manifest",
            "--docs-dir",
            docs_dir.to_str().unwrap(),
            "--out",
            out_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated file list for 1 documents:"))
        .stdout(predicate::str::contains(
            "- Drone Haftpflicht: Liability insurance policy document",
        ));

    let manifest: Vec<DocumentEntry> =
        serde_json::from_str(&fs::read_to_string(&out_path).expect("read manifest"))
            .expect("parse manifest");
    assert_eq!(
        manifest,
        vec![DocumentEntry {
            id: "drone-haftpflicht".to_string(),
            name: "Drone Haftpflicht".to_string(),
            description: "Liability insurance policy document".to_string(),
            file: "/documents/Drone_Haftpflicht.pdf".to_string(),
        }]
    );
}

#[test]
fn manifest_of_a_missing_directory_is_empty() {
    let temp = tempfile::tempdir().expect("tempdir");
    let docs_dir = temp.path().join("documents");
    let out_path = temp.path().join("documents.json");

    docvault_cmd()
        .args([
            "manifest",
            "--docs-dir",
            docs_dir.to_str().unwrap(),
            "--out",
            out_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated file list for 0 documents:"));

    // The working directory is created fresh when absent.
    assert!(docs_dir.exists());
    assert_eq!(fs::read_to_string(&out_path).expect("read manifest"), "[]");
}

#[test]
fn build_chains_sync_and_manifest() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    write_pdf(&source.join("a.pdf"));
    write_pdf(&source.join("sub").join("a.pdf"));

    let docs_dir = temp.path().join("documents");
    let out_path = temp.path().join("documents.json");
    docvault_cmd()
        .env("DOCS_SOURCE_DIR", source.to_str().unwrap())
        .args([
            "build",
            "--docs-dir",
            docs_dir.to_str().unwrap(),
            "--out",
            out_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Document sync complete. 2 PDFs available.",
        ))
        .stdout(predicate::str::contains("Generated file list for 2 documents:"));

    assert_eq!(sorted_names(&docs_dir), vec!["a-1.pdf", "a.pdf"]);

    let manifest: Vec<DocumentEntry> =
        serde_json::from_str(&fs::read_to_string(&out_path).expect("read manifest"))
            .expect("parse manifest");
    let files: Vec<&str> = manifest.iter().map(|e| e.file.as_str()).collect();
    assert_eq!(files, vec!["/documents/a-1.pdf", "/documents/a.pdf"]);
    assert_eq!(manifest[0].id, "a-1");
    assert_eq!(manifest[1].id, "a");
}
