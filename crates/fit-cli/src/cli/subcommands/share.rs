use clap::Subcommand;

/// Stateless URL share commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ShareCommands {
    /// Encode an assessment JSON file into a share token and URL.
    Encode {
        file: String,
        /// Base URL for the printed link, overriding `server.public_base_url`
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Decode a share token back into an assessment.
    Decode { token: String },
}
