//! Exit codes chosen for errors that reach the top of `run()`

use anyhow::Context;

use clara_utils::error::{ChatError, VaultError, WorkflowError};

use crate::ExitCode;
use crate::cli::run::report_error;

#[test]
fn test_chat_error_in_chain_uses_backend_exit_code() {
    let error = Err::<(), _>(ChatError::Transport("connection refused".to_string()))
        .context("Chat request failed")
        .unwrap_err();

    assert_eq!(report_error(&error), ExitCode::INGESTION_FAILED);
}

#[test]
fn test_domain_errors_keep_their_exit_codes() {
    let error = anyhow::Error::new(VaultError::InvalidPin);
    assert_eq!(report_error(&error), ExitCode::INVALID_PIN);

    let error = anyhow::Error::new(WorkflowError::NoDocument);
    assert_eq!(report_error(&error), ExitCode::WORKFLOW_REJECTED);
}

#[test]
fn test_unknown_error_is_internal() {
    let error = anyhow::anyhow!("something odd");
    assert_eq!(report_error(&error), ExitCode::INTERNAL);
}
