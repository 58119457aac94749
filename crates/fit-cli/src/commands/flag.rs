use anyhow::Context;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::FlagCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct FlagState<'a> {
    name: &'a str,
    enabled: bool,
}

/// Handle `stackfit flag`.
pub async fn handle(
    action: &FlagCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        FlagCommands::Get { name } => {
            let enabled = ctx.flags.is_enabled(name).await;
            output(&FlagState { name, enabled }, flags.format)
        }
        FlagCommands::Set { name, enabled, by } => {
            ctx.flags
                .update(name, *enabled, by.as_deref())
                .await
                .with_context(|| format!("failed to update flag {name}"))?;
            output(
                &FlagState {
                    name,
                    enabled: *enabled,
                },
                flags.format,
            )
        }
        FlagCommands::Create {
            name,
            enabled,
            description,
        } => {
            let flag = ctx
                .flags
                .create(name, *enabled, description.as_deref())
                .await
                .with_context(|| format!("failed to create flag {name}"))?;
            output(&flag, flags.format)
        }
        FlagCommands::List => {
            let listed = ctx.service.list_flags().await?;
            output(&serde_json::json!({ "flags": listed }), flags.format)
        }
        FlagCommands::Clear => {
            ctx.flags.clear_cache();
            output(&serde_json::json!({ "cleared": true }), flags.format)
        }
    }
}
