use clap::{Args, Subcommand};

use crate::cli::subcommands::{AssessCommands, ConfigCommands, FlagCommands, ShareCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Assessments: save, look up, score, migrate.
    Assess {
        #[command(subcommand)]
        action: AssessCommands,
    },
    /// Stateless share tokens.
    Share {
        #[command(subcommand)]
        action: ShareCommands,
    },
    /// Admin configuration and version history.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Feature flags.
    Flag {
        #[command(subcommand)]
        action: FlagCommands,
    },
    /// Serve share links over HTTP.
    Serve(ServeArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Address to bind, overriding `server.bind`
    #[arg(long)]
    pub bind: Option<String>,
}
