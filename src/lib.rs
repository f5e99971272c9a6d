//! clara - PIN-protected API key vault and knowledge-base chat workflow
//!
//! This crate ties together the vault, the knowledge-base backend client and
//! the ingestion/chat workflow behind the `clara` command-line tool.
//!
//! clara can be used in two ways:
//! - **CLI**: run `clara vault ...`, `clara kb ...` or `clara shell`
//! - **Library**: build a [`Session`] and drive the controllers directly
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Store an API key behind a 6-digit PIN
//! echo "sk-live-..." | clara vault save --pin 482913
//!
//! # Ingest a document into the knowledge base
//! clara kb ingest notes.pdf
//!
//! # Interactive session: select, ingest, unlock, chat
//! clara shell
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use clara::{CliArgs, Config, Session};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::discover(&CliArgs::default())?;
//! let session = Session::from_config(&config)?;
//! println!("vault: {}", session.vault().state().name());
//! println!("status: {}", session.workflow().status());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod session;

// ============================================================================
// Public API
// ============================================================================

pub use session::Session;

/// Layered configuration: CLI > environment > config file > defaults.
pub use clara_config::{CliArgs, Config, ConfigSource};

/// Library-level error type with user-facing rendering and exit code mapping.
///
/// Library code returns errors and does NOT call `std::process::exit()`.
pub use clara_utils::error::{ClaraError, UserFriendlyError};

/// Exit codes matching the documented exit code table.
pub use clara_utils::exit_codes::ExitCode;

pub use clara_vault::{
    FileVaultStore, MemoryVaultStore, VaultController, VaultState, VaultStore, validate_pin,
};

pub use clara_backend::{ChatBackend, Document, HttpBackend, IngestionBackend};

pub use clara_workflow::{
    ChatTurn, IngestionReport, IngestionStatus, Speaker, TranscriptEntry, WorkflowController,
};
