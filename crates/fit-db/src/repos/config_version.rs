//! Configuration version store: bounded history, current config and rollback.
//!
//! Versions are ordered by an AUTOINCREMENT sequence, so eviction and
//! listing follow insertion order even when timestamps collide.

use fit_core::entities::{ConfigExport, ConfigSnapshot, ConfigVersion};
use fit_core::enums::PublishStatus;
use fit_core::ids::PREFIX_CONFIG_VERSION;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_json, to_json};
use crate::service::FitService;

const SELECT_COLS: &str = "id, created_at, description, snapshot";

const INSERT_VERSION: &str =
    "INSERT INTO config_versions (id, description, snapshot, created_at) VALUES (?1, ?2, ?3, ?4)";

const EVICT_OLDEST: &str = "DELETE FROM config_versions
     WHERE seq NOT IN (SELECT seq FROM config_versions ORDER BY seq DESC LIMIT ?1)";

fn row_to_version(row: &libsql::Row) -> Result<ConfigVersion, DatabaseError> {
    Ok(ConfigVersion {
        id: row.get::<String>(0)?,
        created_at: parse_datetime(&row.get::<String>(1)?)?,
        description: get_opt_string(row, 2)?,
        config: parse_json(&row.get::<String>(3)?)?,
    })
}

impl FitService {
    /// Append a snapshot to the history, evicting the oldest entries beyond
    /// the retention limit.
    pub async fn record_config_version(
        &self,
        config: &ConfigSnapshot,
        description: Option<&str>,
    ) -> Result<ConfigVersion, DatabaseError> {
        let id = self.db().generate_id(PREFIX_CONFIG_VERSION).await?;
        let now = self.now();
        let snapshot = to_json(config)?;

        let tx = self.db().conn().transaction().await?;
        tx.execute(
            INSERT_VERSION,
            libsql::params![id.as_str(), description, snapshot, now.to_rfc3339()],
        )
        .await?;
        let evicted = tx
            .execute(EVICT_OLDEST, libsql::params![i64::from(self.retention())])
            .await?;
        tx.commit().await?;

        tracing::info!(version_id = %id, evicted, "recorded config version");
        Ok(ConfigVersion {
            id,
            created_at: now,
            description: description.map(String::from),
            config: config.clone(),
        })
    }

    /// All retained versions, most recent first.
    pub async fn list_config_versions(&self) -> Result<Vec<ConfigVersion>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM config_versions ORDER BY seq DESC");
        let mut rows = self.db().query_with(&sql, || ()).await?;

        let mut versions = Vec::new();
        while let Some(row) = rows.next().await? {
            versions.push(row_to_version(&row)?);
        }
        Ok(versions)
    }

    pub async fn get_config_version(
        &self,
        id: &str,
    ) -> Result<Option<ConfigVersion>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM config_versions WHERE id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_version(&row)?)),
            None => Ok(None),
        }
    }

    /// Make a recorded version the active configuration.
    ///
    /// A single upsert-from-select: an unknown id matches no row, returns
    /// `NotFound`, and leaves the current configuration untouched. No new
    /// version is recorded, so repeating the call is a no-op.
    pub async fn rollback_config(&self, version_id: &str) -> Result<(), DatabaseError> {
        let now = self.now().to_rfc3339();
        let promoted = self
            .db()
            .execute_with(
                "INSERT INTO config_current (slot, snapshot, source_version_id, updated_at)
                 SELECT 1, snapshot, id, ?2 FROM config_versions WHERE id = ?1
                 ON CONFLICT(slot) DO UPDATE SET
                     snapshot = excluded.snapshot,
                     source_version_id = excluded.source_version_id,
                     updated_at = excluded.updated_at",
                || libsql::params![version_id, now.as_str()],
            )
            .await?;
        if promoted == 0 {
            return Err(DatabaseError::not_found("config version", version_id));
        }
        tracing::info!(version_id, "rolled back configuration");
        Ok(())
    }

    /// The active configuration, if one was ever published or rolled back to.
    pub async fn current_config(&self) -> Result<Option<ConfigSnapshot>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT snapshot FROM config_current WHERE slot = 1", || ())
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(parse_json(&row.get::<String>(0)?)?)),
            None => Ok(None),
        }
    }

    /// Id of the version the current configuration came from.
    pub async fn current_config_source(&self) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT source_version_id FROM config_current WHERE slot = 1", || ())
            .await?;
        match rows.next().await? {
            Some(row) => get_opt_string(&row, 0),
            None => Ok(None),
        }
    }

    /// Publish a snapshot: mark it published, record it, and make it current.
    pub async fn publish_config(
        &self,
        config: &ConfigSnapshot,
        description: Option<&str>,
    ) -> Result<ConfigVersion, DatabaseError> {
        let mut published = config.clone();
        published.status = PublishStatus::Published;

        let id = self.db().generate_id(PREFIX_CONFIG_VERSION).await?;
        let now = self.now();
        let ts = now.to_rfc3339();
        let snapshot = to_json(&published)?;

        let tx = self.db().conn().transaction().await?;
        tx.execute(
            INSERT_VERSION,
            libsql::params![id.as_str(), description, snapshot.as_str(), ts.as_str()],
        )
        .await?;
        tx.execute(EVICT_OLDEST, libsql::params![i64::from(self.retention())])
            .await?;
        tx.execute(
            "INSERT INTO config_current (slot, snapshot, source_version_id, updated_at)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET
                 snapshot = excluded.snapshot,
                 source_version_id = excluded.source_version_id,
                 updated_at = excluded.updated_at",
            libsql::params![snapshot.as_str(), id.as_str(), ts.as_str()],
        )
        .await?;
        tx.commit().await?;

        tracing::info!(version_id = %id, "published configuration");
        Ok(ConfigVersion {
            id,
            created_at: now,
            description: description.map(String::from),
            config: published,
        })
    }

    /// Render a version for download.
    pub async fn export_config_version(
        &self,
        id: &str,
    ) -> Result<Option<ConfigExport>, DatabaseError> {
        let Some(version) = self.get_config_version(id).await? else {
            return Ok(None);
        };
        let json = serde_json::to_string_pretty(&version.config)
            .map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(Some(ConfigExport {
            file_name: version.export_file_name(),
            json,
        }))
    }
}
