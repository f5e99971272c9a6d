//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and all subcommand enums.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// clara - PIN-protected API key vault and knowledge-base chat
#[derive(Parser)]
#[command(name = "clara")]
#[command(about = "Store an API key behind a PIN, build a knowledge base, and chat with it")]
#[command(long_about = r#"
clara keeps one API key in a local vault protected by a 6-digit PIN, uploads
documents to a CLaRa knowledge-base server, and runs a chat session against it
once ingestion has finished.

EXAMPLES:
  # Store an API key (read from stdin) behind a PIN
  echo "sk-live-..." | clara vault save --pin 482913

  # Check that a PIN opens the vault
  clara vault verify --pin 482913

  # Show whether a key is stored
  clara vault status

  # Upload and process a document
  clara kb ingest ./handbook.pdf

  # Show the knowledge-base size, or delete it
  clara kb size
  clara kb flush --yes

  # Interactive session (select, ingest, unlock, send ...)
  clara shell

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > environment > config file > defaults
  Config file is discovered by searching upward from CWD for .clara/config.toml
  Use --config to specify an explicit config file path
  CLARA_BACKEND_URL overrides the server URL, CLARA_HOME the data directory
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the knowledge-base server (e.g. http://127.0.0.1:8000/api)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Location of the vault record file
    #[arg(long, global = true)]
    pub vault_path: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage the PIN-protected API key
    #[command(subcommand)]
    Vault(VaultCommands),

    /// Ingest documents into the knowledge base
    #[command(subcommand)]
    Kb(KbCommands),

    /// Start an interactive session
    ///
    /// Reads one command per line from stdin. Type `help` for the list.
    ///
    /// EXAMPLES:
    ///   clara shell
    ///   printf 'select notes.txt\ningest\nstatus\n' | clara shell
    Shell,

    /// Show the effective configuration and where each value came from
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Vault subcommands
#[derive(Subcommand)]
pub enum VaultCommands {
    /// Show whether a key is stored
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store an API key, replacing any existing one
    ///
    /// EXAMPLES:
    ///   echo "sk-live-..." | clara vault save --pin 482913
    ///   clara vault save --secret sk-live-... (prompts for the PIN)
    Save {
        /// 6-digit PIN (prompted for when omitted)
        #[arg(long)]
        pin: Option<String>,

        /// API key to store (read from stdin when omitted)
        #[arg(long)]
        secret: Option<String>,
    },

    /// Check that a PIN unlocks the stored key
    Verify {
        /// 6-digit PIN (prompted for when omitted)
        #[arg(long)]
        pin: Option<String>,
    },

    /// Delete the stored key
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Knowledge-base subcommands
#[derive(Subcommand)]
pub enum KbCommands {
    /// Upload and process a document
    Ingest {
        /// Document to upload
        file: PathBuf,
    },

    /// Delete the whole knowledge base on the server
    Flush {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show the number of knowledge units on the server
    Size {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Build the CLI command structure for testing and introspection
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
