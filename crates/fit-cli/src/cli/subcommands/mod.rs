mod assess;
mod config;
mod flag;
mod share;

pub use assess::AssessCommands;
pub use config::ConfigCommands;
pub use flag::FlagCommands;
pub use share::ShareCommands;
