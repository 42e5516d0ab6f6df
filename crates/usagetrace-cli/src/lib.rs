mod args;
mod commands;
mod context;
mod handlers;
pub mod logging;
mod output;
pub mod types;

pub use args::{Cli, Commands, ImportArgs, StateCommand};
pub use commands::run;
