//! Hand-off of logo lookups to a background worker.
//!
//! Saving an assessment that creates a company enqueues a [`LogoJob`]; the
//! save itself never waits on the logo service. The receiving end is owned
//! by whatever runs the worker (see the `fit-logo` crate).

use fit_core::jobs::LogoJob;
use tokio::sync::mpsc;

/// Receiving half handed to the logo worker.
pub type LogoJobReceiver = mpsc::UnboundedReceiver<LogoJob>;

/// Sending half held by the service.
#[derive(Debug, Clone)]
pub struct LogoDispatcher {
    tx: mpsc::UnboundedSender<LogoJob>,
}

/// Create a connected dispatcher/receiver pair.
#[must_use]
pub fn logo_channel() -> (LogoDispatcher, LogoJobReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LogoDispatcher { tx }, rx)
}

impl LogoDispatcher {
    /// Enqueue a job. A closed channel drops the job with a warning.
    pub fn dispatch(&self, job: LogoJob) {
        if let Err(e) = self.tx.send(job) {
            tracing::warn!(company_id = %e.0.company_id, "logo worker gone, dropping job");
        }
    }
}
