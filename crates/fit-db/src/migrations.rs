//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::FitDb;
use crate::error::DatabaseError;

/// Wizard storage: companies, assessments, results.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");
/// Admin storage: config history, current config, feature flags.
const MIGRATION_002: &str = include_str!("../migrations/002_admin.sql");

impl FitDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        self.conn
            .execute_batch(MIGRATION_002)
            .await
            .map_err(|e| DatabaseError::Migration(format!("002_admin: {e}")))?;
        Ok(())
    }
}
