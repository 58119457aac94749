use anyhow::Context;
use fit_core::entities::{Assessment, AssessmentData, SavedAssessment, Scorecard};
use fit_core::{migration, scorecard};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AssessCommands;
use crate::commands::serve::public_link;
use crate::commands::shared::input::read_json;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct SaveResponse {
    #[serde(flatten)]
    saved: SavedAssessment,
    share_url: String,
    logo_lookup: bool,
}

#[derive(Debug, Serialize)]
struct AssessmentListResponse {
    assessments: Vec<Assessment>,
}

#[derive(Debug, Serialize)]
struct MigrateResponse {
    migrated: bool,
    data: AssessmentData,
}

/// Handle `stackfit assess`.
pub async fn handle(
    action: &AssessCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AssessCommands::Save {
            file,
            company,
            rescore,
        } => save(file, company.as_deref(), *rescore, ctx, flags).await,
        AssessCommands::Get { public_id } => get(public_id, ctx, flags).await,
        AssessCommands::List { limit } => list(*limit, ctx, flags).await,
        AssessCommands::Score { file } => score(file, flags),
        AssessCommands::Migrate { file } => migrate(file, flags),
    }
}

async fn save(
    file: &str,
    company: Option<&str>,
    rescore: bool,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut data: AssessmentData = read_json(file, "assessment")?;
    if rescore {
        let catalog = ctx.service.current_config().await?;
        data = scorecard::rescore(&migration::migrate_if_needed(&data), catalog.as_ref());
    }

    let logo_lookup = if company.is_some() {
        ctx.start_logo_worker().await.unwrap_or_else(|error| {
            tracing::warn!(%error, "logo worker unavailable; saving without logo lookup");
            false
        })
    } else {
        false
    };

    let saved = ctx
        .service
        .save_assessment(&data, company)
        .await
        .context("failed to save assessment")?;
    let share_url = public_link(&ctx.config.server.public_base_url, &saved.public_id);
    output(
        &SaveResponse {
            saved,
            share_url,
            logo_lookup,
        },
        flags.format,
    )
}

async fn get(public_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let shared = ctx
        .service
        .get_assessment_by_public_id(public_id)
        .await?
        .with_context(|| format!("no shared assessment with public id {public_id}"))?;
    output(&shared, flags.format)
}

async fn list(limit: Option<u32>, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let limit = effective_limit(limit, flags.limit, 20);
    let assessments = ctx.service.list_assessments(limit).await?;
    output(&AssessmentListResponse { assessments }, flags.format)
}

/// Compute a scorecard from a wizard result without a catalog.
pub fn score(file: &str, flags: &GlobalFlags) -> anyhow::Result<()> {
    let data: AssessmentData = read_json(file, "assessment")?;
    let card: Scorecard = scorecard::compute(&migration::migrate_if_needed(&data), None);
    output(&card, flags.format)
}

pub fn migrate(file: &str, flags: &GlobalFlags) -> anyhow::Result<()> {
    let data: AssessmentData = read_json(file, "assessment")?;
    output(
        &MigrateResponse {
            migrated: migration::needs_migration(&data),
            data: migration::migrate_if_needed(&data),
        },
        flags.format,
    )
}
