use std::fmt;
use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `ClaraError` is the umbrella error returned by clara library operations that
/// cross component boundaries (the CLI, the composing `Session`). Components
/// return their own narrower error types, which convert into `ClaraError` via
/// `From`.
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Configuration file or CLI argument errors |
/// | `Validation` | Malformed PIN or empty secret, rejected before storage |
/// | `Vault` | Wrong PIN, missing record, storage failures |
/// | `Ingestion` | Knowledge-base backend failures |
/// | `Chat` | Chat backend failures |
/// | `Workflow` | Operations rejected by the workflow status gate |
///
/// # Exit Code Mapping
///
/// Use [`to_exit_code()`](Self::to_exit_code) to map errors to CLI exit codes:
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration/CLI argument errors |
/// | 3 | Validation errors |
/// | 4 | Invalid PIN |
/// | 5 | Vault storage errors |
/// | 6 | Knowledge-base backend failures (ingestion or chat) |
/// | 7 | Workflow rejections |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use clara_utils::error::{ClaraError, VaultError};
/// use clara_utils::exit_codes::ExitCode;
///
/// let err = ClaraError::Vault(VaultError::InvalidPin);
/// assert_eq!(err.to_exit_code(), ExitCode::INVALID_PIN);
/// assert!(err.display_for_user().contains("Suggestions:"));
/// ```
///
/// Library code returns `ClaraError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum ClaraError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Security,
    Storage,
    Backend,
    Workflow,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Validation => write!(f, "Validation"),
            Self::Security => write!(f, "Security"),
            Self::Storage => write!(f, "Storage"),
            Self::Backend => write!(f, "Backend"),
            Self::Workflow => write!(f, "Workflow"),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with optional \
                 [defaults], [backend] and [vault] sections."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has specific format requirements."
            )),
            Self::NotFound { .. } | Self::DiscoveryFailed { .. } => Some(
                "clara searches for .clara/config.toml starting from the current directory upward."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Compare with the example configuration in the README".to_string(),
            ],
            Self::InvalidValue { key, .. } => match key.as_str() {
                "base_url" => vec![
                    "Use an absolute http:// or https:// URL, e.g. http://127.0.0.1:8000"
                        .to_string(),
                    "Override it for one run with --backend-url".to_string(),
                ],
                "vault_path" => vec![
                    "Point [vault] path at a writable file location".to_string(),
                    "Remove the setting to use the default under CLARA_HOME".to_string(),
                ],
                _ => vec!["Check the documentation for valid values".to_string()],
            },
            Self::NotFound { .. } => vec![
                "Check that the --config path exists".to_string(),
                "Omit --config to use discovery and built-in defaults".to_string(),
            ],
            Self::DiscoveryFailed { .. } => vec![
                "Run clara from a readable working directory".to_string(),
                "Pass an explicit --config path".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

// ============================================================================
// Vault
// ============================================================================

/// Input rejected before any vault storage is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("PIN must be exactly 6 digits")]
    MalformedPin,

    #[error("API key must not be empty")]
    EmptySecret,
}

impl UserFriendlyError for ValidationError {
    fn user_message(&self) -> String {
        match self {
            Self::MalformedPin => "PIN must be exactly 6 digits.".to_string(),
            Self::EmptySecret => "Please enter an API key.".to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        Some("Nothing was written to the vault.".to_string())
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MalformedPin => vec!["Use six decimal digits, e.g. 482913".to_string()],
            Self::EmptySecret => vec![
                "Pass the key with --secret or pipe it on stdin".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

/// Vault state machine and storage errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// The decoded payload did not carry the integrity tag.
    #[error("Invalid PIN")]
    InvalidPin,

    #[error("No API key is stored in the vault")]
    NoRecord,

    #[error("Vault is not locked")]
    NotLocked,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Vault storage error: {0}")]
    Storage(String),
}

impl UserFriendlyError for VaultError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidPin => "Invalid PIN!".to_string(),
            Self::NoRecord => "No API key is stored yet.".to_string(),
            Self::NotLocked => "The vault is already unlocked.".to_string(),
            Self::Validation(inner) => inner.user_message(),
            Self::Storage(reason) => format!("Could not access the vault record: {reason}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidPin => Some(
                "The stored record is unchanged; you may try again.".to_string(),
            ),
            Self::NoRecord => None,
            Self::NotLocked => None,
            Self::Validation(inner) => inner.context(),
            Self::Storage(_) => Some(
                "The vault record lives in a single file under CLARA_HOME.".to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidPin => vec![
                "Re-enter the 6-digit PIN used when the key was saved".to_string(),
                "If the PIN is lost, clear the vault and save the key again".to_string(),
            ],
            Self::NoRecord => vec!["Save a key first with 'clara vault save'".to_string()],
            Self::NotLocked => vec!["Lock the vault before unlocking it again".to_string()],
            Self::Validation(inner) => inner.suggestions(),
            Self::Storage(_) => vec![
                "Check permissions on the vault directory".to_string(),
                "Set CLARA_HOME or [vault] path to a writable location".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPin => ErrorCategory::Security,
            Self::NoRecord | Self::NotLocked => ErrorCategory::Workflow,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Storage(_) => ErrorCategory::Storage,
        }
    }
}

// ============================================================================
// Backends
// ============================================================================

/// Knowledge-base backend failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestionError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Knowledge base size query failed: {0}")]
    SizeQuery(String),

    #[error("Flush failed: {0}")]
    Flush(String),
}

impl UserFriendlyError for IngestionError {
    fn user_message(&self) -> String {
        match self {
            Self::Upload(msg) => format!("Document upload failed: {msg}"),
            Self::Processing(msg) => format!("Document processing failed: {msg}"),
            Self::SizeQuery(msg) => format!("Could not read knowledge base size: {msg}"),
            Self::Flush(msg) => format!("Could not flush the knowledge base: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        Some("The knowledge-base server did not complete the request.".to_string())
    }

    fn suggestions(&self) -> Vec<String> {
        vec![
            "Check that the knowledge-base server is running".to_string(),
            "Verify --backend-url or [backend] base_url".to_string(),
            "Try running with --verbose to see request details".to_string(),
        ]
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Backend
    }
}

/// Chat backend failures. These are absorbed into the transcript by the
/// workflow controller but still reported to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Chat transport error: {0}")]
    Transport(String),

    #[error("Chat backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No API key available; unlock the vault first")]
    MissingSecret,

    #[error("Chat backend returned an unreadable response: {0}")]
    InvalidResponse(String),
}

impl UserFriendlyError for ChatError {
    fn user_message(&self) -> String {
        match self {
            Self::MissingSecret => "No API key is unlocked.".to_string(),
            _ => "Error connecting to server.".to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::MissingSecret => None,
            other => Some(other.to_string()),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingSecret => vec!["Save an API key and unlock it with your PIN".to_string()],
            Self::Status { status: 401 | 403, .. } => {
                vec!["Check that the stored API key is valid".to_string()]
            }
            _ => vec!["Check that the knowledge-base server is running".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingSecret => ErrorCategory::Security,
            _ => ErrorCategory::Backend,
        }
    }
}

// ============================================================================
// Workflow
// ============================================================================

/// Operations rejected or aborted by the ingestion workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("No document selected")]
    NoDocument,

    #[error("Ingestion already in progress (status: {status})")]
    IngestionInFlight { status: String },

    #[error("Chat is unavailable until the knowledge base is ready (status: {status})")]
    ChatUnavailable { status: String },

    #[error("Message is empty")]
    EmptyMessage,

    #[error(transparent)]
    Ingestion(#[from] IngestionError),
}

impl UserFriendlyError for WorkflowError {
    fn user_message(&self) -> String {
        match self {
            Self::NoDocument => "Select a document before starting ingestion.".to_string(),
            Self::IngestionInFlight { status } => {
                format!("Another document is still being ingested ({status}).")
            }
            Self::ChatUnavailable { status } => {
                format!(
                    "Chat will be available after knowledge base initialization \
                     (status: {status})."
                )
            }
            Self::EmptyMessage => "Type a question first.".to_string(),
            Self::Ingestion(inner) => inner.user_message(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Ingestion(inner) => inner.context(),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NoDocument => vec!["Use 'select <path>' in the shell".to_string()],
            Self::IngestionInFlight { .. } => {
                vec!["Wait for the current ingestion to finish".to_string()]
            }
            Self::ChatUnavailable { .. } => {
                vec!["Ingest a document first; chat opens once status is ready".to_string()]
            }
            Self::EmptyMessage => vec![],
            Self::Ingestion(inner) => inner.suggestions(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Ingestion(_) => ErrorCategory::Backend,
            _ => ErrorCategory::Workflow,
        }
    }
}

impl UserFriendlyError for ClaraError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message(),
            Self::Validation(e) => e.user_message(),
            Self::Vault(e) => e.user_message(),
            Self::Ingestion(e) => e.user_message(),
            Self::Chat(e) => e.user_message(),
            Self::Workflow(e) => e.user_message(),
            Self::Io(e) => format!("File system operation failed: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(e) => e.context(),
            Self::Validation(e) => e.context(),
            Self::Vault(e) => e.context(),
            Self::Ingestion(e) => e.context(),
            Self::Chat(e) => e.context(),
            Self::Workflow(e) => e.context(),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(e) => e.suggestions(),
            Self::Validation(e) => e.suggestions(),
            Self::Vault(e) => e.suggestions(),
            Self::Ingestion(e) => e.suggestions(),
            Self::Chat(e) => e.suggestions(),
            Self::Workflow(e) => e.suggestions(),
            Self::Io(_) => vec!["Check file permissions and available disk space".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(e) => e.category(),
            Self::Validation(e) => e.category(),
            Self::Vault(e) => e.category(),
            Self::Ingestion(e) => e.category(),
            Self::Chat(e) => e.category(),
            Self::Workflow(e) => e.category(),
            Self::Io(_) => ErrorCategory::Storage,
        }
    }
}

impl ClaraError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// ```text
    /// Error: <user message>
    ///
    /// Context: <context if available>
    ///
    /// Suggestions:
    ///   • <suggestion 1>
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            ClaraError::Config(_) => ExitCode::CLI_ARGS,
            ClaraError::Validation(_) => ExitCode::VALIDATION,
            ClaraError::Vault(vault_err) => match vault_err {
                VaultError::InvalidPin => ExitCode::INVALID_PIN,
                VaultError::Validation(_) => ExitCode::VALIDATION,
                VaultError::Storage(_) => ExitCode::VAULT_STORAGE,
                VaultError::NoRecord | VaultError::NotLocked => ExitCode::WORKFLOW_REJECTED,
            },
            ClaraError::Ingestion(_) | ClaraError::Chat(_) => ExitCode::INGESTION_FAILED,
            ClaraError::Workflow(workflow_err) => match workflow_err {
                WorkflowError::Ingestion(_) => ExitCode::INGESTION_FAILED,
                _ => ExitCode::WORKFLOW_REJECTED,
            },
            ClaraError::Io(_) => ExitCode::INTERNAL,
        }
    }
}
