//! Read-only screens: fleet listing and dashboard totals

use crate::notice::Notifier;
use crate::session::{Screen, Session};
use loadopt_client::DocumentStore;
use loadopt_model::{Carrier, DashboardSummary, Truck};
use std::sync::Arc;

/// Own trucks and carrier fleets
#[derive(Debug, Clone)]
pub struct FleetSession {
    session: Session,
}

impl FleetSession {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session: Session::new("fleet", store, notifier),
        }
    }

    #[must_use]
    pub fn trucks(&self) -> Vec<Truck> {
        self.session
            .with_snapshot(|doc| doc.map(|d| d.trucks.clone()).unwrap_or_default())
    }

    #[must_use]
    pub fn carriers(&self) -> Vec<Carrier> {
        self.session
            .with_snapshot(|doc| doc.map(|d| d.carriers.clone()).unwrap_or_default())
    }
}

impl Screen for FleetSession {
    fn session(&self) -> &Session {
        &self.session
    }
}

/// Fleet and receivables totals
///
/// While the backend is unreachable and nothing was loaded yet, `summary`
/// is `None` and [`Screen::last_error`] holds the cause for a retry prompt.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    session: Session,
}

impl DashboardSession {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session: Session::new("dashboard", store, notifier),
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<DashboardSummary> {
        self.session
            .with_snapshot(|doc| doc.map(DashboardSummary::from_document))
    }
}

impl Screen for DashboardSession {
    fn session(&self) -> &Session {
        &self.session
    }
}
