//! End-to-end checks of the repositories over real HTTP against a fake backend.

mod support;

use client_lib::adapters::{FileSessionStore, LocalFile, MemorySessionStore};
use client_lib::{AuthClient, FileRepository, ScriptRepository};
use podscript_core::{Credential, ErrorKind, MediaType, ScriptDraft, SessionStore};
use std::io::Write;
use std::sync::Arc;
use support::{dead_address, gateway, spawn_backend, GOOD_TOKEN};
use tokio_util::sync::CancellationToken;

fn session_with(token: &str) -> Arc<MemorySessionStore> {
    Arc::new(MemorySessionStore::with_credential(Credential::new(token)))
}

#[tokio::test]
async fn loads_and_creates_scripts() {
    let base = spawn_backend().await;
    let repo = ScriptRepository::new(gateway(&base, session_with(GOOD_TOKEN)));
    let cancel = CancellationToken::new();

    let loaded = repo.load("p1", &cancel).await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].name, "Ep1");
    assert_eq!(loaded[0].project_id, "p1");
    assert_eq!(loaded[0].tags, vec!["podcast".to_string()]);

    let draft = ScriptDraft::manual("Spotify", "Ep3", "hello");
    let created = repo.create("p1", &draft, &cancel).await.unwrap();
    assert_eq!(created.id, "s-new");
    assert_eq!(created.name, "Ep3");
    assert_eq!(created.project_id, "p1");

    let ids: Vec<_> = repo.items().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["s-new", "s1", "s2"]);
    assert!(!repo.is_loading());
    assert!(repo.error().is_none());
}

#[tokio::test]
async fn rejected_token_is_forgotten() {
    let base = spawn_backend().await;
    let session = session_with("stale");
    let repo = ScriptRepository::new(gateway(&base, session.clone()));

    let result = repo.load("p1", &CancellationToken::new()).await;

    assert_eq!(result, Err(ErrorKind::Unauthenticated));
    assert!(session.get().is_none());
    assert_eq!(repo.error(), Some(ErrorKind::Unauthenticated));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let base = spawn_backend().await;
    let repo = ScriptRepository::new(gateway(&base, session_with(GOOD_TOKEN)));

    let result = repo.load("slow", &CancellationToken::new()).await;

    assert_eq!(result, Err(ErrorKind::Timeout));
    assert!(!repo.is_loading());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let base = dead_address().await;
    let repo = ScriptRepository::new(gateway(&base, session_with(GOOD_TOKEN)));

    let result = repo.load("p1", &CancellationToken::new()).await;

    assert_eq!(result, Err(ErrorKind::NetworkUnavailable));
}

#[tokio::test]
async fn non_envelope_body_is_malformed() {
    let base = spawn_backend().await;
    let repo = ScriptRepository::new(gateway(&base, session_with(GOOD_TOKEN)));

    let result = repo.load("garbage", &CancellationToken::new()).await;

    assert!(matches!(result, Err(ErrorKind::MalformedResponse(_))));
    assert!(repo.items().is_empty());
}

#[tokio::test]
async fn success_false_keeps_the_list() {
    let base = spawn_backend().await;
    let repo = ScriptRepository::new(gateway(&base, session_with(GOOD_TOKEN)));
    let cancel = CancellationToken::new();
    repo.load("p1", &cancel).await.unwrap();

    let result = repo.delete("missing", &cancel).await;

    assert_eq!(result, Err(ErrorKind::ServerRejected("not found".into())));
    assert_eq!(repo.items().len(), 2);

    assert_eq!(repo.delete("s1", &cancel).await, Ok(true));
    let ids: Vec<_> = repo.items().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["s2"]);
}

#[tokio::test]
async fn uploads_a_file_as_multipart() {
    let base = spawn_backend().await;
    let repo = FileRepository::new(gateway(&base, session_with(GOOD_TOKEN)));
    let mut tmp = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
    tmp.write_all(&[1, 2, 3, 4, 5]).unwrap();

    let file = LocalFile::from_path(tmp.path());
    let uploaded = repo
        .upload_file("p9", &file, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(uploaded.id, "p9-f1");
    assert_eq!(uploaded.name, file.name);
    assert_eq!(uploaded.media_type, Some(MediaType::Audio));
    assert_eq!(uploaded.transcript.as_deref(), Some("5 bytes"));
    assert_eq!(repo.items().len(), 1);
}

#[tokio::test]
async fn remembered_login_survives_a_restart() {
    let base = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("podscript").join("session.json");
    let cancel = CancellationToken::new();

    let auth = AuthClient::new(gateway(&base, Arc::new(FileSessionStore::new(&path))));
    auth.login("ann@example.com", "secret", true, &cancel)
        .await
        .unwrap();
    assert!(path.exists());

    // A fresh store over the same file stands in for a new process.
    let repo = ScriptRepository::new(gateway(&base, Arc::new(FileSessionStore::new(&path))));
    assert_eq!(repo.load("p1", &cancel).await.unwrap().len(), 2);
}

#[tokio::test]
async fn bad_password_leaves_no_session() {
    let base = spawn_backend().await;
    let session = Arc::new(MemorySessionStore::new());
    let auth = AuthClient::new(gateway(&base, session.clone()));

    let result = auth
        .login("ann@example.com", "wrong", true, &CancellationToken::new())
        .await;

    assert_eq!(
        result,
        Err(ErrorKind::ServerRejected("Invalid credentials".into()))
    );
    assert!(session.get().is_none());
}
