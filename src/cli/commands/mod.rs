//! CLI command implementations (facade).
//!
//! This module re-exports the command surface used by `run.rs` and CLI tests.
//! Implementations live in `commands/*`.

mod common;
mod config;
mod kb;
mod shell;
mod vault;

// Re-export command handlers
pub use config::execute_config_command;
pub use kb::{execute_kb_flush_command, execute_kb_ingest_command, execute_kb_size_command};
pub use shell::{Shell, execute_shell_command};
pub use vault::{
    execute_vault_clear_command, execute_vault_save_command, execute_vault_status_command,
    execute_vault_verify_command,
};
