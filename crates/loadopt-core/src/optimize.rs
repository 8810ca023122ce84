//! Optimization gateway and the optimize screen session
//!
//! The gateway checks preconditions against a snapshot and forwards the four
//! collections to the solver in a single call. Results are held in memory by
//! [`OptimizeSession`] and never written to the document.

use crate::error::{SyncError, ValidationError};
use crate::notice::{Notice, Notifier};
use crate::session::{Applied, Screen, Session};
use loadopt_client::{DocumentStore, OptimizeRequest, Solver};
use loadopt_model::{Document, LoadPlan};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const FAILED_TITLE: &str = "Optimization failed";

/// Precondition checks in front of the solver
#[derive(Clone)]
pub struct OptimizationGateway {
    solver: Arc<dyn Solver>,
}

impl std::fmt::Debug for OptimizationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizationGateway").finish_non_exhaustive()
    }
}

impl OptimizationGateway {
    pub fn new(solver: Arc<dyn Solver>) -> Self {
        Self { solver }
    }

    /// Build the solver request, or say why none can be sent
    ///
    /// # Errors
    /// [`ValidationError::NotLoaded`], [`ValidationError::NoTrucks`] or
    /// [`ValidationError::NoItems`], checked in that order.
    pub fn validate(snapshot: Option<&Document>) -> Result<OptimizeRequest, ValidationError> {
        let doc = snapshot.ok_or(ValidationError::NotLoaded)?;
        if doc.trucks.is_empty() {
            return Err(ValidationError::NoTrucks);
        }
        if doc.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        Ok(OptimizeRequest::from_document(doc))
    }

    /// Validate and run the solver once
    ///
    /// # Errors
    /// Validation failures issue no request; solver failures are returned
    /// as-is and never retried.
    pub async fn optimize(&self, snapshot: Option<&Document>) -> Result<LoadPlan, SyncError> {
        let request = Self::validate(snapshot)?;
        self.run(&request).await
    }

    async fn run(&self, request: &OptimizeRequest) -> Result<LoadPlan, SyncError> {
        tracing::debug!(
            trucks = request.trucks.len(),
            items = request.items.len(),
            "requesting load plan"
        );
        Ok(self.solver.optimize(request).await?)
    }
}

struct State {
    result: Mutex<Option<LoadPlan>>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the run ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Session behind the optimize screen
#[derive(Clone)]
pub struct OptimizeSession {
    session: Session,
    gateway: OptimizationGateway,
    state: Arc<State>,
}

impl std::fmt::Debug for OptimizeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizeSession")
            .field("session", &self.session)
            .field("in_flight", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl OptimizeSession {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        solver: Arc<dyn Solver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session: Session::new("optimize", store, notifier),
            gateway: OptimizationGateway::new(solver),
            state: Arc::new(State {
                result: Mutex::new(None),
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Plan from the most recent successful run
    #[must_use]
    pub fn result(&self) -> Option<LoadPlan> {
        self.state.result.lock().clone()
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Run the solver against the session snapshot
    ///
    /// A second call while one is outstanding is rejected without a request.
    ///
    /// # Errors
    /// Validation failures and solver failures, each surfaced as a notice.
    pub async fn run(&self) -> Result<Applied<LoadPlan>, SyncError> {
        if self.state.in_flight.swap(true, Ordering::SeqCst) {
            return Err(self.reject(ValidationError::OptimizeInFlight));
        }
        let _in_flight = InFlight(&self.state.in_flight);

        let request = self
            .session
            .with_snapshot(OptimizationGateway::validate)
            .map_err(|err| self.reject(err))?;

        *self.state.result.lock() = None;
        let result = self.gateway.run(&request).await;
        if self.session.is_disposed() {
            tracing::debug!("late load plan discarded");
            return Ok(Applied::Discarded);
        }

        match result {
            Ok(plan) => {
                tracing::info!(packers = plan.packers.len(), unplaced = plan.unplaced.len(), "load plan received");
                *self.state.result.lock() = Some(plan.clone());
                Ok(Applied::Committed(plan))
            }
            Err(err) => {
                tracing::warn!(error = %err, "optimization failed");
                self.session.notify(Notice::error(FAILED_TITLE, err.to_string()));
                Err(err)
            }
        }
    }

    fn reject(&self, err: ValidationError) -> SyncError {
        self.session.notify(Notice::error(err.title(), err.to_string()));
        err.into()
    }
}

impl Screen for OptimizeSession {
    fn session(&self) -> &Session {
        &self.session
    }

    fn dispose(&self) {
        self.session.dispose();
        *self.state.result.lock() = None;
    }
}
