//! Exit code constants for clara.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `VALIDATION` | Malformed PIN or empty secret |
//! | 4 | `INVALID_PIN` | PIN did not unlock the stored record |
//! | 5 | `VAULT_STORAGE` | Vault record could not be read or written |
//! | 6 | `INGESTION_FAILED` | Knowledge-base backend request failed |
//! | 7 | `WORKFLOW_REJECTED` | Operation not permitted in the current state |

/// Exit codes matching the documented exit code table.
///
/// ```rust
/// use clara_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::INVALID_PIN, ExitCode::from_i32(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Invalid or missing command-line arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Input rejected before any storage mutation
    pub const VALIDATION: ExitCode = ExitCode(3);

    /// Wrong PIN for the stored record
    pub const INVALID_PIN: ExitCode = ExitCode(4);

    /// Vault record I/O failure
    pub const VAULT_STORAGE: ExitCode = ExitCode(5);

    /// Upload, processing or flush failed on the backend
    pub const INGESTION_FAILED: ExitCode = ExitCode(6);

    /// Rejected by a state guard (no document, not ready, not locked, ...)
    pub const WORKFLOW_REJECTED: ExitCode = ExitCode(7);

    /// Get the numeric exit code value for `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_unique() {
        let codes = [
            ExitCode::SUCCESS,
            ExitCode::INTERNAL,
            ExitCode::CLI_ARGS,
            ExitCode::VALIDATION,
            ExitCode::INVALID_PIN,
            ExitCode::VAULT_STORAGE,
            ExitCode::INGESTION_FAILED,
            ExitCode::WORKFLOW_REJECTED,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_i32_conversion() {
        let raw: i32 = ExitCode::INGESTION_FAILED.into();
        assert_eq!(raw, 6);
        assert_eq!(ExitCode::from_i32(raw), ExitCode::INGESTION_FAILED);
    }
}
