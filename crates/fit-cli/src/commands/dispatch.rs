use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::cli::subcommands::AssessCommands;
use crate::commands;
use crate::context::AppContext;

/// Run commands that are pure transforms of their input.
///
/// Returns `None` when the command needs the application context.
pub fn dispatch_offline(command: &Commands, flags: &GlobalFlags) -> Option<anyhow::Result<()>> {
    match command {
        Commands::Share { action } => Some(commands::share::handle(action, flags)),
        Commands::Assess {
            action: AssessCommands::Score { file },
        } => Some(commands::assess::score(file, flags)),
        Commands::Assess {
            action: AssessCommands::Migrate { file },
        } => Some(commands::assess::migrate(file, flags)),
        _ => None,
    }
}

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Assess { action } => commands::assess::handle(&action, ctx, flags).await,
        Commands::Config { action } => commands::config::handle(&action, ctx, flags).await,
        Commands::Flag { action } => commands::flag::handle(&action, ctx, flags).await,
        Commands::Serve(args) => commands::serve::handle(&args, ctx).await,
        Commands::Share { action } => commands::share::handle(&action, flags),
    }
}
