//! Terminal front end for the Malvader ledger.
//!
//! Renders the menu, reads and validates input, calls the ledger and prints
//! the outcome. All domain rules live in `malvader-accounts`.

pub mod config;
pub mod menu;
pub mod prompt;
pub mod render;
pub mod shell;

pub use config::ShellConfig;
pub use prompt::{PromptError, Prompter};
pub use shell::Shell;
