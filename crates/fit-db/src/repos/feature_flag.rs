//! Feature flag table: the remote source behind the flag cache.

use fit_core::entities::FeatureFlag;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::FitService;

const SELECT_COLS: &str = "name, enabled, description, updated_at, updated_by";

fn row_to_flag(row: &libsql::Row) -> Result<FeatureFlag, DatabaseError> {
    Ok(FeatureFlag {
        name: row.get::<String>(0)?,
        enabled: row.get::<i64>(1)? != 0,
        description: get_opt_string(row, 2)?,
        updated_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_by: get_opt_string(row, 4)?,
    })
}

impl FitService {
    pub async fn get_flag(&self, name: &str) -> Result<Option<FeatureFlag>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM feature_flags WHERE name = ?1");
        let mut rows = self.db().query_with(&sql, || [name]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_flag(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_flags(&self) -> Result<Vec<FeatureFlag>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM feature_flags ORDER BY name");
        let mut rows = self.db().query_with(&sql, || ()).await?;

        let mut flags = Vec::new();
        while let Some(row) = rows.next().await? {
            flags.push(row_to_flag(&row)?);
        }
        Ok(flags)
    }

    /// Flip an existing flag. Unknown names are `NotFound`; flags are only
    /// brought into existence through [`Self::create_flag`].
    pub async fn set_flag_enabled(
        &self,
        name: &str,
        enabled: bool,
        updated_by: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let now = self.now().to_rfc3339();
        let updated = self
            .db()
            .execute_with(
                "UPDATE feature_flags SET enabled = ?2, updated_at = ?3, updated_by = ?4
                 WHERE name = ?1",
                || libsql::params![name, i64::from(enabled), now.as_str(), updated_by],
            )
            .await?;
        if updated == 0 {
            return Err(DatabaseError::not_found("feature flag", name));
        }
        tracing::info!(flag = name, enabled, "updated feature flag");
        Ok(())
    }

    /// Insert a new flag. A duplicate name surfaces the constraint error.
    pub async fn create_flag(
        &self,
        name: &str,
        enabled: bool,
        description: Option<&str>,
    ) -> Result<FeatureFlag, DatabaseError> {
        let now = self.now();
        let ts = now.to_rfc3339();
        self.db()
            .execute_with(
                "INSERT INTO feature_flags (name, enabled, description, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                || libsql::params![name, i64::from(enabled), description, ts.as_str()],
            )
            .await?;
        tracing::info!(flag = name, enabled, "created feature flag");
        Ok(FeatureFlag {
            name: name.to_string(),
            enabled,
            description: description.map(String::from),
            updated_at: now,
            updated_by: None,
        })
    }
}
