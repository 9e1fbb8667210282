//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::outbound::persistence::SnapshotStore;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Open a snapshot store rooted in a fresh temporary directory.
///
/// Returns the directory guard alongside the store; dropping the guard
/// deletes the snapshot files, so tests must keep it alive for the store's
/// lifetime.
pub fn temp_snapshot_store() -> (tempfile::TempDir, Arc<SnapshotStore>) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = Arc::new(SnapshotStore::open(dir.path()).expect("open snapshot store"));
    (dir, store)
}
