//! CLI command handlers.

mod check_config;
mod evaluate;

pub use check_config::run_check_config_command;
pub use evaluate::run_evaluate_command;
