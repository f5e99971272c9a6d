//! Command-line interface for clara
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch
//! - `commands`: Command implementations and helpers
//! - `tests`: Test module (cfg(test) only)

pub mod args;
mod commands;
mod run;

#[cfg(test)]
mod tests;

// Re-export argument types
pub use args::{Cli, Commands, KbCommands, VaultCommands, build_cli};

// Re-export the interactive session for embedding and tests
pub use commands::Shell;

// Re-export run function
pub use run::run;
