//! Per-screen session over the shared document
//!
//! Each screen owns a [`Session`]: its own last-known-good snapshot, its own
//! error state and its own write gate. Sessions never share a cache, so two
//! screens may hold different views of the same document until they reload.
//!
//! Lifecycle:
//! - `load` replaces the snapshot with a fresh read
//! - `activate` is a focus gain and reloads
//! - `deactivate` is a focus loss and leaves in-flight work alone
//! - `dispose` is an unmount; later responses come back as [`Applied::Discarded`]

use crate::error::{SyncError, ValidationError};
use crate::notice::{Notice, Notifier};
use async_trait::async_trait;
use loadopt_client::{ClientError, DocumentStore};
use loadopt_model::Document;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Title used when a read fails
pub(crate) const LOAD_ERROR_TITLE: &str = "Error";

/// Outcome of an operation that completed without error
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Applied<T> {
    /// Result was applied to the session
    Committed(T),
    /// The session was disposed before the response arrived
    Discarded,
}

impl<T> Applied<T> {
    /// Committed value, if any
    #[inline]
    pub fn committed(self) -> Option<T> {
        match self {
            Self::Committed(v) => Some(v),
            Self::Discarded => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded)
    }

    /// Map the committed value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
        match self {
            Self::Committed(v) => Applied::Committed(f(v)),
            Self::Discarded => Applied::Discarded,
        }
    }
}

/// What a merge step decided
pub(crate) enum Merge<T> {
    /// Write the merged document
    Write(T),
    /// Nothing changed; keep the fresh read without writing
    Skip(T),
}

struct Inner {
    name: &'static str,
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
    snapshot: Mutex<Option<Document>>,
    last_error: Mutex<Option<ClientError>>,
    disposed: AtomicBool,
    focused: AtomicBool,
    /// Serialises mutations of this session
    gate: tokio::sync::Mutex<()>,
}

/// Shared handle to one screen's state
///
/// Clones share state, so a spawned request can outlive the caller.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.inner.name)
            .field("loaded", &self.inner.snapshot.lock().is_some())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an empty session; nothing is read until [`Session::load`]
    pub fn new(
        name: &'static str,
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                store,
                notifier,
                snapshot: Mutex::new(None),
                last_error: Mutex::new(None),
                disposed: AtomicBool::new(false),
                focused: AtomicBool::new(false),
                gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Last known good document
    #[must_use]
    pub fn snapshot(&self) -> Option<Document> {
        self.inner.snapshot.lock().clone()
    }

    /// Read a projection of the snapshot without cloning all of it
    pub fn with_snapshot<R>(&self, f: impl FnOnce(Option<&Document>) -> R) -> R {
        f(self.inner.snapshot.lock().as_ref())
    }

    /// Error from the most recent failed read, cleared by a successful one
    #[must_use]
    pub fn last_error(&self) -> Option<ClientError> {
        self.inner.last_error.lock().clone()
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    #[inline]
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.inner.focused.load(Ordering::SeqCst)
    }

    /// Replace the snapshot with a fresh read
    ///
    /// On failure the previous snapshot is kept and the error is surfaced.
    ///
    /// # Errors
    /// Returns the read failure.
    pub async fn load(&self) -> Result<Applied<()>, SyncError> {
        let _gate = self.inner.gate.lock().await;
        self.reload().await
    }

    /// Focus gained
    ///
    /// # Errors
    /// Returns the read failure.
    pub async fn activate(&self) -> Result<Applied<()>, SyncError> {
        self.inner.focused.store(true, Ordering::SeqCst);
        self.load().await
    }

    /// Focus lost
    pub fn deactivate(&self) {
        self.inner.focused.store(false, Ordering::SeqCst);
    }

    /// Screen unmounted
    pub fn dispose(&self) {
        if !self.inner.disposed.swap(true, Ordering::SeqCst) {
            tracing::debug!(session = self.inner.name, "session disposed");
        }
        self.inner.focused.store(false, Ordering::SeqCst);
    }

    /// Read without taking the gate; callers hold it
    pub(crate) async fn reload(&self) -> Result<Applied<()>, SyncError> {
        let result = self.inner.store.read().await;
        if self.discard("read") {
            return Ok(Applied::Discarded);
        }
        match result {
            Ok(doc) => {
                self.observe(&doc);
                *self.inner.last_error.lock() = None;
                self.replace(doc);
                Ok(Applied::Committed(()))
            }
            Err(err) => {
                *self.inner.last_error.lock() = Some(err.clone());
                self.surface(LOAD_ERROR_TITLE, &err);
                Err(err.into())
            }
        }
    }

    /// Fetch the current document, merge a change into it and write it back
    ///
    /// The snapshot is only replaced once the write is acknowledged. A
    /// server change landing between the read and the write is overwritten.
    pub(crate) async fn fetch_merge_write<T, F>(
        &self,
        title: &'static str,
        merge: F,
    ) -> Result<Applied<T>, SyncError>
    where
        F: FnOnce(&mut Document) -> Merge<T> + Send,
        T: Send,
    {
        let _gate = self.inner.gate.lock().await;

        let fresh = match self.inner.store.read().await {
            Ok(doc) => doc,
            Err(err) => return self.fail(title, err),
        };
        self.observe(&fresh);

        let mut merged = fresh.clone();
        let value = match merge(&mut merged) {
            Merge::Write(value) => value,
            Merge::Skip(value) => {
                if self.discard("read") {
                    return Ok(Applied::Discarded);
                }
                self.replace(fresh);
                return Ok(Applied::Committed(value));
            }
        };

        match self.inner.store.write(&merged).await {
            Ok(stored) => {
                if self.discard("write") {
                    return Ok(Applied::Discarded);
                }
                self.replace(stored);
                Ok(Applied::Committed(value))
            }
            Err(err) => self.fail(title, err),
        }
    }

    /// Publish a local change, then write the resulting snapshot
    ///
    /// On failure the local change is reverted, the error is surfaced and
    /// the session reloads from the server. There is no retry.
    pub(crate) async fn write_optimistic<T, F>(
        &self,
        title: &'static str,
        edit: F,
    ) -> Result<Applied<T>, SyncError>
    where
        F: FnOnce(&mut Document) -> Result<T, SyncError> + Send,
        T: Send,
    {
        let _gate = self.inner.gate.lock().await;

        let (before, optimistic, value) = {
            let mut snapshot = self.inner.snapshot.lock();
            let Some(current) = snapshot.as_mut() else {
                return Err(ValidationError::NotLoaded.into());
            };
            let before = current.clone();
            let value = edit(current)?;
            (before, current.clone(), value)
        };

        match self.inner.store.write(&optimistic).await {
            Ok(stored) => {
                if self.discard("write") {
                    return Ok(Applied::Discarded);
                }
                self.replace(stored);
                Ok(Applied::Committed(value))
            }
            Err(err) => {
                if self.discard("write") {
                    return Ok(Applied::Discarded);
                }
                self.replace(before);
                self.surface(title, &err);
                // the reload surfaces its own failure
                let _ = self.reload().await;
                Err(err.into())
            }
        }
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.inner.notifier.notify(notice);
    }

    pub(crate) fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.inner.notifier)
    }

    fn replace(&self, doc: Document) {
        *self.inner.snapshot.lock() = Some(doc);
    }

    fn fail<T>(&self, title: &'static str, err: ClientError) -> Result<Applied<T>, SyncError> {
        if self.discard("error") {
            return Ok(Applied::Discarded);
        }
        self.surface(title, &err);
        Err(err.into())
    }

    fn surface(&self, title: &'static str, err: &ClientError) {
        tracing::warn!(session = self.inner.name, error = %err, "{title}");
        self.notify(Notice::error(title, err.to_string()));
    }

    fn discard(&self, what: &'static str) -> bool {
        let disposed = self.is_disposed();
        if disposed {
            tracing::debug!(session = self.inner.name, response = what, "late response discarded");
        }
        disposed
    }

    fn observe(&self, doc: &Document) {
        for violation in doc.check_invariants() {
            tracing::warn!(session = self.inner.name, %violation, "document invariant violated");
        }
    }
}

/// Shared lifecycle of every screen session
#[async_trait]
pub trait Screen: Send + Sync {
    fn session(&self) -> &Session;

    /// Re-read the document
    ///
    /// # Errors
    /// Returns the read failure after surfacing it.
    async fn load(&self) -> Result<Applied<()>, SyncError> {
        self.session().load().await
    }

    /// Focus gained; reloads
    ///
    /// # Errors
    /// Returns the read failure after surfacing it.
    async fn activate(&self) -> Result<Applied<()>, SyncError> {
        self.session().activate().await
    }

    fn deactivate(&self) {
        self.session().deactivate();
    }

    fn dispose(&self) {
        self.session().dispose();
    }

    fn snapshot(&self) -> Option<Document> {
        self.session().snapshot()
    }

    fn last_error(&self) -> Option<ClientError> {
        self.session().last_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLog;
    use loadopt_model::EntityKind;
    use loadopt_test_utils::{network_down, sample_document, InMemoryBackend};

    fn session(backend: &Arc<InMemoryBackend>, log: &Arc<NoticeLog>) -> Session {
        Session::new("test", backend.clone(), log.clone())
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_snapshot() {
        let backend = Arc::new(InMemoryBackend::new(sample_document()));
        let log = Arc::new(NoticeLog::new());
        let s = session(&backend, &log);

        s.load().await.unwrap();
        backend.fail_next_read(network_down());
        assert!(s.load().await.unwrap_err().is_network());

        assert_eq!(s.snapshot().unwrap().items.len(), 2);
        assert!(s.last_error().is_some());
        assert_eq!(log.notices()[0].title, LOAD_ERROR_TITLE);

        s.load().await.unwrap();
        assert!(s.last_error().is_none());
    }

    #[tokio::test]
    async fn skip_merge_issues_no_write() {
        let backend = Arc::new(InMemoryBackend::new(sample_document()));
        let log = Arc::new(NoticeLog::new());
        let s = session(&backend, &log);

        let applied = s
            .fetch_merge_write("Error", |_| Merge::Skip(()))
            .await
            .unwrap();
        assert_eq!(applied, Applied::Committed(()));
        assert_eq!(backend.writes(), 0);
        assert!(s.snapshot().is_some());
    }

    #[tokio::test]
    async fn merge_writes_and_adopts_echo() {
        let backend = Arc::new(InMemoryBackend::new(sample_document()));
        let log = Arc::new(NoticeLog::new());
        let s = session(&backend, &log);

        let id = s
            .fetch_merge_write("Save Error", |doc| Merge::Write(doc.next_ids.bump(EntityKind::Item)))
            .await
            .unwrap()
            .committed();
        assert_eq!(id, Some(Some(7)));
        assert_eq!(backend.document().next_ids.item, 8);
        assert_eq!(s.snapshot().unwrap().next_ids.item, 8);
    }

    #[tokio::test]
    async fn optimistic_write_requires_snapshot() {
        let backend = Arc::new(InMemoryBackend::new(sample_document()));
        let log = Arc::new(NoticeLog::new());
        let s = session(&backend, &log);

        let err = s
            .write_optimistic("Save Error", |_| Ok(()))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(backend.writes(), 0);
    }

    #[tokio::test]
    async fn dispose_is_idempotent_and_clears_focus() {
        let backend = Arc::new(InMemoryBackend::new(sample_document()));
        let log = Arc::new(NoticeLog::new());
        let s = session(&backend, &log);

        s.activate().await.unwrap();
        assert!(s.is_focused());
        s.dispose();
        s.dispose();
        assert!(s.is_disposed());
        assert!(!s.is_focused());
        assert!(s.load().await.unwrap().is_discarded());
    }
}
