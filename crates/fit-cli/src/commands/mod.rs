pub mod assess;
pub mod config;
pub mod dispatch;
pub mod flag;
pub mod serve;
pub mod share;
pub mod shared;
