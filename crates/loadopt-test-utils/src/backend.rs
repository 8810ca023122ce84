//! In-memory backend with failure and race injection
//!
//! Behaves like the real server: `read` returns the stored document, `write`
//! replaces it wholesale without any conflict detection and echoes it back.

use async_trait::async_trait;
use loadopt_client::{ClientError, DocumentStore, OptimizeRequest, PaymentProvider, Solver};
use loadopt_model::{Document, LoadPlan};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

type WriteHook = Box<dyn FnOnce(&mut Document) + Send>;

#[derive(Default)]
struct Faults {
    read: VecDeque<ClientError>,
    write: VecDeque<ClientError>,
    optimize: VecDeque<ClientError>,
}

/// Fake backend implementing every transport seam
pub struct InMemoryBackend {
    document: Mutex<Document>,
    plan: Mutex<LoadPlan>,
    faults: Mutex<Faults>,
    before_write: Mutex<Option<WriteHook>>,
    /// `false` while requests are held
    latch: watch::Sender<bool>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    optimize_calls: AtomicUsize,
    last_optimize: Mutex<Option<OptimizeRequest>>,
}

impl InMemoryBackend {
    pub fn new(document: Document) -> Self {
        let (latch, _) = watch::channel(true);
        Self {
            document: Mutex::new(document),
            plan: Mutex::new(LoadPlan::default()),
            faults: Mutex::new(Faults::default()),
            before_write: Mutex::new(None),
            latch,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            optimize_calls: AtomicUsize::new(0),
            last_optimize: Mutex::new(None),
        }
    }

    /// Server-side document
    pub fn document(&self) -> Document {
        self.document.lock().clone()
    }

    /// Change the stored document out of band, as another client would
    pub fn mutate(&self, f: impl FnOnce(&mut Document)) {
        f(&mut *self.document.lock());
    }

    pub fn set_plan(&self, plan: LoadPlan) {
        *self.plan.lock() = plan;
    }

    pub fn fail_next_read(&self, err: ClientError) {
        self.faults.lock().read.push_back(err);
    }

    pub fn fail_next_write(&self, err: ClientError) {
        self.faults.lock().write.push_back(err);
    }

    pub fn fail_next_optimize(&self, err: ClientError) {
        self.faults.lock().optimize.push_back(err);
    }

    /// Run `hook` on the stored document right before the next write lands
    ///
    /// Simulates a concurrent writer whose change arrives between this
    /// client's read and its write.
    pub fn before_next_write(&self, hook: impl FnOnce(&mut Document) + Send + 'static) {
        *self.before_write.lock() = Some(Box::new(hook));
    }

    /// Park every incoming request until [`Self::release`]
    pub fn hold(&self) {
        self.latch.send_replace(false);
    }

    pub fn release(&self) {
        self.latch.send_replace(true);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn optimize_calls(&self) -> usize {
        self.optimize_calls.load(Ordering::SeqCst)
    }

    pub fn last_optimize_request(&self) -> Option<OptimizeRequest> {
        self.last_optimize.lock().clone()
    }

    async fn pass_latch(&self) {
        let mut rx = self.latch.subscribe();
        // an error means the backend itself is gone
        let _ = rx.wait_for(|open| *open).await;
    }
}

pub fn network_down() -> ClientError {
    ClientError::Network("connection refused".into())
}

pub fn server_error(status: u16, message: &str) -> ClientError {
    ClientError::Server {
        status,
        message: message.into(),
    }
}

#[async_trait]
impl DocumentStore for InMemoryBackend {
    async fn read(&self) -> Result<Document, ClientError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.pass_latch().await;
        if let Some(err) = self.faults.lock().read.pop_front() {
            return Err(err);
        }
        Ok(self.document())
    }

    async fn write(&self, document: &Document) -> Result<Document, ClientError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.pass_latch().await;
        if let Some(err) = self.faults.lock().write.pop_front() {
            return Err(err);
        }
        let hook = self.before_write.lock().take();
        let mut stored = self.document.lock();
        if let Some(hook) = hook {
            hook(&mut *stored);
        }
        *stored = document.clone();
        Ok(stored.clone())
    }
}

#[async_trait]
impl Solver for InMemoryBackend {
    async fn optimize(&self, request: &OptimizeRequest) -> Result<LoadPlan, ClientError> {
        self.optimize_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_optimize.lock() = Some(request.clone());
        self.pass_latch().await;
        if let Some(err) = self.faults.lock().optimize.pop_front() {
            return Err(err);
        }
        Ok(self.plan.lock().clone())
    }
}

#[async_trait]
impl PaymentProvider for InMemoryBackend {
    async fn payment_config(&self) -> Result<Value, ClientError> {
        Ok(json!({"clientId": "sandbox", "currency": "USD"}))
    }

    async fn create_order(&self, body: &Value) -> Result<Value, ClientError> {
        Ok(json!({"id": "ORDER-TEST", "request": body}))
    }

    async fn capture_order(&self, body: &Value) -> Result<Value, ClientError> {
        Ok(json!({"status": "COMPLETED", "request": body}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_document;

    #[tokio::test]
    async fn write_replaces_wholesale() {
        let backend = InMemoryBackend::new(sample_document());
        let mut doc = backend.read().await.unwrap();
        doc.items.clear();
        backend.write(&doc).await.unwrap();
        assert!(backend.document().items.is_empty());
        assert_eq!((backend.reads(), backend.writes()), (1, 1));
    }

    #[tokio::test]
    async fn injected_faults_fire_once() {
        let backend = InMemoryBackend::new(sample_document());
        backend.fail_next_read(network_down());
        assert!(backend.read().await.is_err());
        assert!(backend.read().await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_change_is_clobbered_by_write() {
        let backend = InMemoryBackend::new(sample_document());
        let stale = backend.read().await.unwrap();
        backend.before_next_write(|doc| doc.customers.clear());
        backend.write(&stale).await.unwrap();
        assert_eq!(backend.document().customers.len(), 3);
    }
}
