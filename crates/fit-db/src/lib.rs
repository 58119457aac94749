//! # fit-db
//!
//! libSQL database operations for Stackfit.
//!
//! Holds all relational state: companies, assessments and their results,
//! the configuration history with the active configuration, and feature
//! flags. Works against a local file, `:memory:` for tests, or a remote
//! libSQL server.

pub mod error;
pub mod helpers;
pub mod logo_jobs;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;

#[cfg(test)]
mod test_support;

use std::fmt::Write as _;
use std::future::Future;
use std::sync::Arc;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;
use retry::{RetryConfig, is_transient_remote_error};

/// Central database handle for all Stackfit state.
///
/// Cloning is cheap and shares the underlying database and connection, so a
/// background worker can hold its own handle.
#[derive(Clone)]
pub struct FitDb {
    #[allow(dead_code)]
    db: Arc<libsql::Database>,
    conn: libsql::Connection,
    remote: bool,
    retry: RetryConfig,
}

impl FitDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let fit_db = Self {
            db: Arc::new(db),
            conn,
            remote: false,
            retry: RetryConfig::default(),
        };
        fit_db.run_migrations().await?;
        tracing::debug!(path, "opened local database");
        Ok(fit_db)
    }

    /// Open a remote libSQL database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be established or
    /// migrations fail.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        let conn = db.connect()?;

        let fit_db = Self {
            db: Arc::new(db),
            conn,
            remote: true,
            retry: RetryConfig::default(),
        };
        fit_db.run_migrations().await?;
        tracing::debug!(url, "opened remote database");
        Ok(fit_db)
    }

    /// Override the retry policy for transient remote errors.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote
    }

    /// Execute a single statement without retry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the statement fails.
    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> Result<u64, DatabaseError> {
        Ok(self.conn.execute(sql, params).await?)
    }

    /// Run a query without retry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the query fails.
    pub async fn query(
        &self,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<libsql::Rows, DatabaseError> {
        Ok(self.conn.query(sql, params).await?)
    }

    /// Execute a statement, retrying transient remote errors.
    ///
    /// Params are produced by a closure because libSQL consumes them on each attempt.
    ///
    /// # Errors
    ///
    /// Returns the last `DatabaseError` once attempts are exhausted or on a
    /// non-transient failure.
    pub async fn execute_with<P, F>(&self, sql: &str, params: F) -> Result<u64, DatabaseError>
    where
        P: IntoParams,
        F: Fn() -> P,
    {
        self.with_retry_loop(sql, || self.conn.execute(sql, params()))
            .await
    }

    /// Run a query, retrying transient remote errors.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute_with`].
    pub async fn query_with<P, F>(
        &self,
        sql: &str,
        params: F,
    ) -> Result<libsql::Rows, DatabaseError>
    where
        P: IntoParams,
        F: Fn() -> P,
    {
        self.with_retry_loop(sql, || self.conn.query(sql, params()))
            .await
    }

    async fn with_retry_loop<T, Fut, Op>(&self, sql: &str, op: Op) -> Result<T, DatabaseError>
    where
        Op: Fn() -> Fut,
        Fut: Future<Output = Result<T, libsql::Error>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e)
                    if self.remote
                        && attempt < self.retry.max_attempts
                        && is_transient_remote_error(&e) =>
                {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        ?delay,
                        error = %e,
                        sql,
                        "transient database error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"asm-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Generate an unguessable 32-hex-char public identifier for share links.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Other` if the OS random source fails.
    pub fn generate_public_id() -> Result<String, DatabaseError> {
        let mut bytes = [0u8; fit_core::ids::PUBLIC_ID_BYTES];
        getrandom::fill(&mut bytes)
            .map_err(|e| DatabaseError::Other(anyhow::anyhow!("random source failed: {e}")))?;
        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            let _ = write!(hex, "{byte:02x}");
        }
        Ok(hex)
    }
}
