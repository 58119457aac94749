use clap::Subcommand;

/// Assessment commands. `FILE` arguments take a JSON wizard result, or `-` for stdin.
#[derive(Clone, Debug, Subcommand)]
pub enum AssessCommands {
    /// Save an assessment and print its share identifiers.
    Save {
        file: String,
        /// Company to attach; created on first use
        #[arg(long)]
        company: Option<String>,
        /// Recompute the scorecard against the current catalog before saving
        #[arg(long)]
        rescore: bool,
    },
    /// Look up a saved assessment by public identifier.
    Get { public_id: String },
    /// List saved assessments, newest first.
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Compute a scorecard without saving.
    Score { file: String },
    /// Rewrite legacy sensor categories without saving.
    Migrate { file: String },
}
