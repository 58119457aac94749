//! Service layer that every repository hangs off.
//!
//! `FitService` wraps `FitDb` (raw database access) together with the clock
//! used for timestamps, the configuration retention limit, and an optional
//! logo job dispatcher. All repo methods are implemented as `impl FitService`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fit_core::clock::{Clock, SystemClock};
use fit_core::jobs::LogoJob;

use crate::FitDb;
use crate::error::DatabaseError;
use crate::logo_jobs::LogoDispatcher;

/// Number of configuration versions kept when nothing else is configured.
pub const DEFAULT_RETENTION: u32 = 20;

pub struct FitService {
    db: FitDb,
    clock: Arc<dyn Clock>,
    retention: u32,
    logos: Option<LogoDispatcher>,
}

impl FitService {
    /// Create a service over a local database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = FitDb::open_local(db_path).await?;
        Ok(Self::from_db(db, Arc::new(SystemClock)))
    }

    /// Create a service over a remote libSQL database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be established.
    pub async fn new_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = FitDb::open_remote(url, auth_token).await?;
        Ok(Self::from_db(db, Arc::new(SystemClock)))
    }

    /// Create from an existing `FitDb` with an explicit clock.
    #[must_use]
    pub fn from_db(db: FitDb, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            retention: DEFAULT_RETENTION,
            logos: None,
        }
    }

    /// Set how many configuration versions are kept. Zero is treated as one.
    #[must_use]
    pub fn with_retention(mut self, retention: u32) -> Self {
        self.retention = retention.max(1);
        self
    }

    /// Route logo jobs for newly created companies to `dispatcher`.
    pub fn attach_logo_dispatcher(&mut self, dispatcher: LogoDispatcher) {
        self.logos = Some(dispatcher);
    }

    /// Stop dispatching logo jobs and hand back the dispatcher.
    ///
    /// Dropping the returned value closes the channel once no clones remain,
    /// which lets the worker drain and exit.
    pub fn detach_logo_dispatcher(&mut self) -> Option<LogoDispatcher> {
        self.logos.take()
    }

    /// A second service sharing this database and clock, without a dispatcher.
    #[must_use]
    pub fn detached_handle(&self) -> Self {
        Self {
            db: self.db.clone(),
            clock: Arc::clone(&self.clock),
            retention: self.retention,
            logos: None,
        }
    }

    #[must_use]
    pub const fn db(&self) -> &FitDb {
        &self.db
    }

    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    #[must_use]
    pub const fn retention(&self) -> u32 {
        self.retention
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn dispatch_logo(&self, job: LogoJob) {
        match &self.logos {
            Some(dispatcher) => dispatcher.dispatch(job),
            None => tracing::debug!(company_id = %job.company_id, "no logo dispatcher attached"),
        }
    }
}
