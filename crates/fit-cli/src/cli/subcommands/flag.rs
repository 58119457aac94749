use clap::{ArgAction, Subcommand};

/// Feature flag commands.
#[derive(Clone, Debug, Subcommand)]
pub enum FlagCommands {
    /// Check whether a flag is enabled.
    Get { name: String },
    /// Turn an existing flag on or off.
    Set {
        name: String,
        #[arg(action = ArgAction::Set)]
        enabled: bool,
        /// Who made the change
        #[arg(long)]
        by: Option<String>,
    },
    /// Create a new flag.
    Create {
        name: String,
        #[arg(long)]
        enabled: bool,
        #[arg(long)]
        description: Option<String>,
    },
    /// List all flags.
    List,
    /// Drop cached flag values.
    Clear,
}
