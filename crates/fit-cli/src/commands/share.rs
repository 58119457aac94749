use anyhow::Context;
use fit_config::FitConfig;
use fit_core::entities::AssessmentData;
use fit_core::{migration, share};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ShareCommands;
use crate::commands::shared::input::read_json;
use crate::output::output;

#[derive(Debug, Serialize)]
struct EncodeResponse {
    token: String,
    url: String,
}

#[derive(Debug, Serialize)]
pub struct DecodedView {
    /// Whether legacy categories were rewritten for display.
    pub migrated: bool,
    pub data: AssessmentData,
}

/// Handle `stackfit share`.
pub fn handle(action: &ShareCommands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ShareCommands::Encode { file, base_url } => encode(file, base_url.as_deref(), flags),
        ShareCommands::Decode { token } => {
            let view = decoded_view(token).context("share token could not be decoded")?;
            output(&view, flags.format)
        }
    }
}

fn encode(file: &str, base_url: Option<&str>, flags: &GlobalFlags) -> anyhow::Result<()> {
    let data: AssessmentData = read_json(file, "assessment")?;
    let data = migration::migrate_if_needed(&data);
    let token = share::encode(&data)?;

    let base_url = match base_url {
        Some(url) => url.to_string(),
        None => FitConfig::load_with_dotenv()?.server.public_base_url,
    };
    let url = share::share_url(&base_url, &token);
    output(&EncodeResponse { token, url }, flags.format)
}

/// Decode a share token and migrate it for display. `None` when malformed.
pub fn decoded_view(token: &str) -> Option<DecodedView> {
    let data = share::decode(token)?;
    let migrated = migration::needs_migration(&data);
    Some(DecodedView {
        migrated,
        data: migration::migrate_if_needed(&data),
    })
}
