use std::path::Path;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use fit_core::entities::{CONFIG_SCHEMA_VERSION, ConfigSnapshot, ConfigVersion};
use fit_core::enums::PublishStatus;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ConfigCommands;
use crate::commands::shared::input::read_json;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct CurrentResponse {
    source_version_id: Option<String>,
    config: ConfigSnapshot,
}

#[derive(Debug, Serialize)]
struct VersionSummary {
    id: String,
    created_at: DateTime<Utc>,
    description: Option<String>,
    status: PublishStatus,
    schema_version: u32,
    sections: usize,
}

impl From<&ConfigVersion> for VersionSummary {
    fn from(version: &ConfigVersion) -> Self {
        Self {
            id: version.id.clone(),
            created_at: version.created_at,
            description: version.description.clone(),
            status: version.config.status,
            schema_version: version.config.schema_version,
            sections: version.config.sections.len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct VersionListResponse {
    versions: Vec<VersionSummary>,
}

#[derive(Debug, Serialize)]
struct ExportResponse {
    version_id: String,
    path: String,
}

#[derive(Debug, Serialize)]
struct ResolveResponse<'a> {
    brand: &'a str,
    canonical: Option<&'a str>,
}

/// Handle `stackfit config`.
pub async fn handle(
    action: &ConfigCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Publish { file, description } => {
            let snapshot: ConfigSnapshot = read_json(file, "configuration")?;
            check_schema_version(&snapshot)?;
            let version = ctx
                .service
                .publish_config(&snapshot, description.as_deref())
                .await
                .context("failed to publish configuration")?;
            output(&VersionSummary::from(&version), flags.format)
        }
        ConfigCommands::Current => {
            let config = ctx
                .service
                .current_config()
                .await?
                .context("no configuration has been published yet")?;
            let source_version_id = ctx.service.current_config_source().await?;
            output(
                &CurrentResponse {
                    source_version_id,
                    config,
                },
                flags.format,
            )
        }
        ConfigCommands::Versions => {
            let versions = ctx.service.list_config_versions().await?;
            let versions = versions.iter().map(VersionSummary::from).collect();
            output(&VersionListResponse { versions }, flags.format)
        }
        ConfigCommands::Rollback { version_id } => {
            ctx.service
                .rollback_config(version_id)
                .await
                .with_context(|| format!("failed to roll back to {version_id}"))?;
            output(
                &serde_json::json!({ "source_version_id": version_id }),
                flags.format,
            )
        }
        ConfigCommands::Export {
            version_id,
            out_dir,
        } => {
            let export = ctx
                .service
                .export_config_version(version_id)
                .await?
                .with_context(|| format!("no configuration version {version_id}"))?;
            let path = Path::new(out_dir).join(&export.file_name);
            std::fs::write(&path, export.json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            output(
                &ExportResponse {
                    version_id: version_id.clone(),
                    path: path.display().to_string(),
                },
                flags.format,
            )
        }
        ConfigCommands::Synonym { synonym, canonical } => {
            let mut snapshot = ctx
                .service
                .current_config()
                .await?
                .unwrap_or_else(ConfigSnapshot::empty);
            snapshot.set_synonym(synonym, canonical);
            let description = format!("synonym {synonym} -> {canonical}");
            let version = ctx
                .service
                .publish_config(&snapshot, Some(&description))
                .await
                .context("failed to publish configuration")?;
            output(&VersionSummary::from(&version), flags.format)
        }
        ConfigCommands::Resolve { brand } => {
            let snapshot = ctx
                .service
                .current_config()
                .await?
                .unwrap_or_else(ConfigSnapshot::empty);
            output(
                &ResolveResponse {
                    brand,
                    canonical: snapshot.canonical_brand(brand),
                },
                flags.format,
            )
        }
    }
}

/// Snapshots written by a newer build cannot be read back safely.
fn check_schema_version(snapshot: &ConfigSnapshot) -> anyhow::Result<()> {
    if snapshot.schema_version > CONFIG_SCHEMA_VERSION {
        bail!(
            "configuration schema version {} is newer than supported version {CONFIG_SCHEMA_VERSION}",
            snapshot.schema_version
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_schema_versions_are_rejected() {
        let mut snapshot = ConfigSnapshot::empty();
        assert!(check_schema_version(&snapshot).is_ok());
        snapshot.schema_version = CONFIG_SCHEMA_VERSION + 1;
        let err = check_schema_version(&snapshot).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn version_summary_counts_sections() {
        let version = ConfigVersion {
            id: "cfv-1".into(),
            created_at: Utc::now(),
            description: Some("first".into()),
            config: ConfigSnapshot::empty(),
        };
        let summary = VersionSummary::from(&version);
        assert_eq!(summary.sections, 0);
        assert_eq!(summary.status, PublishStatus::Draft);
    }

    #[tokio::test]
    async fn export_writes_named_file() {
        let flags = GlobalFlags {
            format: crate::cli::OutputFormat::Raw,
            limit: None,
            quiet: true,
            verbose: false,
            db: Some(":memory:".into()),
        };
        let mut ctx = AppContext::init(fit_config::FitConfig::default(), &flags)
            .await
            .unwrap();
        let version = ctx
            .service
            .publish_config(&ConfigSnapshot::empty(), Some("first"))
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let action = ConfigCommands::Export {
            version_id: version.id.clone(),
            out_dir: dir.path().display().to_string(),
        };
        handle(&action, &mut ctx, &flags).await.unwrap();

        let path = dir.path().join(version.export_file_name());
        let written: ConfigSnapshot =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.status, PublishStatus::Published);
    }

    #[tokio::test]
    async fn rollback_to_unknown_version_fails() {
        let flags = GlobalFlags {
            format: crate::cli::OutputFormat::Raw,
            limit: None,
            quiet: true,
            verbose: false,
            db: Some(":memory:".into()),
        };
        let mut ctx = AppContext::init(fit_config::FitConfig::default(), &flags)
            .await
            .unwrap();
        let action = ConfigCommands::Rollback {
            version_id: "cfv-missing".into(),
        };
        let err = handle(&action, &mut ctx, &flags).await.unwrap_err();
        assert!(err.to_string().contains("cfv-missing"));
    }
}
