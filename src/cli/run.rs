//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Creates the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use anyhow::Result;
use clap::Parser;

use super::args::{Cli, Commands, KbCommands, VaultCommands};
use super::commands;

use crate::{ClaraError, CliArgs, Config, ExitCode};
use clara_utils::error::{
    ChatError, ConfigError, IngestionError, ValidationError, VaultError, WorkflowError,
};
use clara_utils::logging::init_tracing;

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints the user-facing report to stderr, returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        backend_url: cli.backend_url.clone(),
        vault_path: cli.vault_path.clone(),
        verbose: cli.verbose.then_some(true),
    };

    // Discover and load configuration
    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => return Err(report_error(&err)),
    };

    // A subscriber may already be installed when embedded; keep the existing one
    let _ = init_tracing(config.verbose());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("✗ Failed to start async runtime: {err}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result: Result<()> = rt.block_on(async {
        match cli.command {
            Commands::Vault(vault_cmd) => match vault_cmd {
                VaultCommands::Status { json } => {
                    commands::execute_vault_status_command(&config, json)
                }
                VaultCommands::Save { pin, secret } => {
                    commands::execute_vault_save_command(&config, pin, secret)
                }
                VaultCommands::Verify { pin } => {
                    commands::execute_vault_verify_command(&config, pin)
                }
                VaultCommands::Clear { yes } => {
                    commands::execute_vault_clear_command(&config, yes)
                }
            },
            Commands::Kb(kb_cmd) => match kb_cmd {
                KbCommands::Ingest { file } => {
                    commands::execute_kb_ingest_command(&config, &file).await
                }
                KbCommands::Flush { yes } => {
                    commands::execute_kb_flush_command(&config, yes).await
                }
                KbCommands::Size { json } => {
                    commands::execute_kb_size_command(&config, json).await
                }
            },
            Commands::Shell => commands::execute_shell_command(&config).await,
            Commands::Config { json } => commands::execute_config_command(&config, json),
        }
    });

    match result {
        Ok(()) => Ok(()),
        Err(error) => Err(report_error(&error)),
    }
}

/// Print `error` for the user and pick its exit code.
///
/// Domain errors anywhere in the anyhow chain get the structured report;
/// anything else is an internal error.
pub(crate) fn report_error(error: &anyhow::Error) -> ExitCode {
    if let Some(clara_error) = error
        .chain()
        .find_map(|e| e.downcast_ref::<ClaraError>())
    {
        eprint!("{}", clara_error.display_for_user());
        return clara_error.to_exit_code();
    }

    if let Some(clara_error) = lift_domain_error(error) {
        eprint!("{}", clara_error.display_for_user());
        return clara_error.to_exit_code();
    }

    eprintln!("✗ Unexpected error: {error:#}");
    eprintln!("\n  General troubleshooting:");
    eprintln!("    - Run with --verbose for more detailed output");
    eprintln!("    - Check that the knowledge-base server is reachable");
    ExitCode::INTERNAL
}

fn lift_domain_error(error: &anyhow::Error) -> Option<ClaraError> {
    error.chain().find_map(|e| {
        if let Some(e) = e.downcast_ref::<VaultError>() {
            Some(ClaraError::from(e.clone()))
        } else if let Some(e) = e.downcast_ref::<WorkflowError>() {
            Some(ClaraError::from(e.clone()))
        } else if let Some(e) = e.downcast_ref::<IngestionError>() {
            Some(ClaraError::from(e.clone()))
        } else if let Some(e) = e.downcast_ref::<ChatError>() {
            Some(ClaraError::from(e.clone()))
        } else if let Some(e) = e.downcast_ref::<ValidationError>() {
            Some(ClaraError::from(e.clone()))
        } else {
            e.downcast_ref::<ConfigError>()
                .map(|e| ClaraError::from(e.clone()))
        }
    })
}
