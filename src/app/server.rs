use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::{Html, Json};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app::auth::AuthService;
use crate::app::gallery::DocumentLibrary;
use crate::formats::DocumentEntry;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub library: Arc<DocumentLibrary>,
}

/// Builds the gallery router: the embedded page, the login and manifest API,
/// and the documents directory itself.
pub fn router(state: AppState, docs_dir: &Path) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/", get(index))
        .route("/api/login", post(login))
        .route("/api/documents", get(list_documents))
        .nest_service("/documents", ServeDir::new(docs_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn list_documents(State(state): State<AppState>) -> Json<Vec<DocumentEntry>> {
    Json(state.library.entries().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub passphrase: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub authenticated: bool,
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Json<LoginResponse> {
    Json(LoginResponse {
        authenticated: state.auth.verify(&request.passphrase),
    })
}

/// The gallery client. The persisted auth flag lives under the
/// `docvault-auth` localStorage key; documents and login verdicts come from
/// the API routes above.
const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Document Vault</title>
  <style>
    * { box-sizing: border-box; margin: 0; }
    body { font-family: system-ui, sans-serif; background: #f4f5f7; color: #1c1e21; }
    .hidden { display: none !important; }
    #login { min-height: 100vh; display: flex; align-items: center; justify-content: center; }
    #login form { background: #fff; padding: 2.5rem; border-radius: 12px; box-shadow: 0 2px 12px rgba(0,0,0,.08); width: 22rem; }
    #login h1 { font-size: 1.4rem; margin-bottom: .4rem; text-align: center; }
    #login p { font-size: .85rem; color: #5f6368; text-align: center; margin-bottom: 1.4rem; }
    #login input { width: 100%; padding: .65rem; border: 1px solid #d0d3d8; border-radius: 8px; font-size: 1rem; }
    #login button { width: 100%; margin-top: 1rem; padding: .7rem; border: 0; border-radius: 8px; background: #3b5bdb; color: #fff; font-size: 1rem; cursor: pointer; }
    #login-error { margin-top: .8rem; padding: .6rem; border-radius: 8px; background: #ffe3e3; color: #c92a2a; font-size: .85rem; }
    header { background: #fff; border-bottom: 1px solid #e3e5e8; padding: .9rem 1.4rem; display: flex; justify-content: space-between; align-items: center; position: sticky; top: 0; }
    header h1 { font-size: 1.2rem; }
    header button { padding: .5rem 1rem; border: 1px solid #d0d3d8; border-radius: 8px; background: #fff; cursor: pointer; }
    #cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(16rem, 1fr)); gap: 1.2rem; padding: 1.6rem; max-width: 72rem; margin: 0 auto; }
    .card { background: #fff; border-radius: 12px; padding: 1.4rem; box-shadow: 0 1px 6px rgba(0,0,0,.06); display: flex; flex-direction: column; gap: .6rem; }
    .card h3 { font-size: 1.05rem; }
    .card p { font-size: .85rem; color: #5f6368; flex: 1; }
    .card .actions { display: flex; gap: .6rem; }
    .card button { flex: 1; padding: .55rem; border-radius: 8px; font-size: .85rem; cursor: pointer; }
    .card .view { border: 0; background: #3b5bdb; color: #fff; }
    .card .download { border: 1px solid #d0d3d8; background: #fff; }
    #empty { text-align: center; padding: 5rem 1.5rem; }
    #empty h2 { margin-bottom: .8rem; }
    #empty p { color: #5f6368; }
    #viewer { position: fixed; inset: 0; background: rgba(20,22,26,.94); display: flex; align-items: center; justify-content: center; padding: 1rem; }
    #viewer .frame { background: #fff; border-radius: 10px; width: 100%; height: 100%; max-width: 72rem; display: flex; flex-direction: column; overflow: hidden; }
    #viewer .bar { display: flex; justify-content: space-between; align-items: center; padding: .8rem 1.2rem; border-bottom: 1px solid #e3e5e8; }
    #viewer iframe { flex: 1; border: 0; width: 100%; }
    #viewer .bar button { padding: .5rem .9rem; border: 1px solid #d0d3d8; border-radius: 8px; background: #fff; cursor: pointer; margin-left: .6rem; }
  </style>
</head>
<body>
  <div id="login">
    <form id="login-form">
      <h1>Document Vault</h1>
      <p>Enter your passphrase to access the documents</p>
      <input id="passphrase" type="password" placeholder="Passphrase" required autofocus>
      <div id="login-error" class="hidden">Incorrect passphrase</div>
      <button type="submit">Access Documents</button>
    </form>
  </div>

  <div id="gallery" class="hidden">
    <header>
      <h1>Document Vault</h1>
      <button id="logout">Logout</button>
    </header>
    <main>
      <div id="cards"></div>
      <div id="empty" class="hidden">
        <h2>No Documents Found</h2>
        <p>No PDF documents were found in the documents folder.</p>
        <p>Add PDF files to the documents directory and rerun the sync.</p>
      </div>
    </main>
  </div>

  <div id="viewer" class="hidden">
    <div class="frame">
      <div class="bar">
        <strong id="viewer-title"></strong>
        <span>
          <button id="viewer-download">Download PDF</button>
          <button id="viewer-close">Close</button>
        </span>
      </div>
      <iframe id="viewer-frame" title="Document viewer"></iframe>
    </div>
  </div>

  <script>
    const AUTH_KEY = 'docvault-auth';
    let current = null;

    const el = (id) => document.getElementById(id);
    const show = (id) => el(id).classList.remove('hidden');
    const hide = (id) => el(id).classList.add('hidden');

    async function loadGallery() {
      hide('login');
      show('gallery');
      const documents = await fetch('/api/documents').then((r) => r.json());
      const cards = el('cards');
      cards.replaceChildren();
      if (!documents.length) {
        show('empty');
        return;
      }
      hide('empty');
      for (const doc of documents) {
        const card = document.createElement('div');
        card.className = 'card';
        const title = document.createElement('h3');
        title.textContent = doc.name;
        const description = document.createElement('p');
        description.textContent = doc.description;
        const actions = document.createElement('div');
        actions.className = 'actions';
        const view = document.createElement('button');
        view.className = 'view';
        view.textContent = 'View Document';
        view.addEventListener('click', () => openViewer(doc));
        const download = document.createElement('button');
        download.className = 'download';
        download.textContent = 'Download PDF';
        download.addEventListener('click', () => downloadDocument(doc));
        actions.append(view, download);
        card.append(title, description, actions);
        cards.append(card);
      }
    }

    function openViewer(doc) {
      current = doc;
      el('viewer-title').textContent = doc.name;
      el('viewer-frame').src = doc.file;
      show('viewer');
    }

    function closeViewer() {
      current = null;
      el('viewer-frame').src = '';
      hide('viewer');
    }

    function downloadDocument(doc) {
      const link = document.createElement('a');
      link.href = doc.file;
      link.download = doc.name + '.pdf';
      document.body.appendChild(link);
      link.click();
      link.remove();
    }

    el('login-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const input = el('passphrase');
      const response = await fetch('/api/login', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ passphrase: input.value }),
      }).then((r) => r.json());
      if (response.authenticated) {
        localStorage.setItem(AUTH_KEY, 'true');
        hide('login-error');
        loadGallery();
      } else {
        show('login-error');
        input.value = '';
      }
    });

    el('logout').addEventListener('click', () => {
      localStorage.removeItem(AUTH_KEY);
      hide('gallery');
      show('login');
    });

    el('viewer-close').addEventListener('click', closeViewer);
    el('viewer-download').addEventListener('click', () => {
      if (current) downloadDocument(current);
    });

    if (localStorage.getItem(AUTH_KEY) === 'true') {
      loadGallery();
    }
  </script>
</body>
</html>
"##;
