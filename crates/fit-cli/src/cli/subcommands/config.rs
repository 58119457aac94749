use clap::Subcommand;

/// Admin configuration commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ConfigCommands {
    /// Publish a configuration snapshot from a JSON file.
    Publish {
        file: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show the active configuration.
    Current,
    /// List retained versions, most recent first.
    Versions,
    /// Make a recorded version the active configuration.
    Rollback { version_id: String },
    /// Write a version to a JSON file named after its id and status.
    Export {
        version_id: String,
        /// Directory to write into
        #[arg(long, default_value = ".")]
        out_dir: String,
    },
    /// Map a brand synonym to its canonical name and publish the result.
    Synonym { synonym: String, canonical: String },
    /// Resolve a brand name against the active configuration.
    Resolve { brand: String },
}
