//! A running clara session: one vault plus one ingestion/chat workflow.
//!
//! The vault and the workflow do not know about each other. The session is
//! the only place where the unlocked secret flows into a chat request.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

use clara_backend::{ChatBackend, HttpBackend, IngestionBackend};
use clara_config::Config;
use clara_utils::error::WorkflowError;
use clara_vault::{FileVaultStore, VaultController, VaultStore};
use clara_workflow::{ChatTurn, WorkflowController};

pub struct Session {
    vault: VaultController,
    workflow: WorkflowController,
}

impl Session {
    #[must_use]
    pub fn new(vault: VaultController, workflow: WorkflowController) -> Self {
        Self { vault, workflow }
    }

    /// Build a session with a file-backed vault and the HTTP backend, both
    /// located by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn VaultStore> = Arc::new(FileVaultStore::new(config.vault_path()));
        let backend = Arc::new(HttpBackend::new(config.base_url()).with_context(|| {
            format!("Failed to create HTTP client for {}", config.base_url())
        })?);
        debug!(
            base_url = config.base_url(),
            vault_path = %config.vault_path(),
            "Session created"
        );
        Self::with_backends(store, backend.clone(), backend)
    }

    /// Build a session over arbitrary stores and backends.
    pub fn with_backends(
        store: Arc<dyn VaultStore>,
        ingestion: Arc<dyn IngestionBackend>,
        chat: Arc<dyn ChatBackend>,
    ) -> Result<Self> {
        let vault = VaultController::open(store).context("Failed to open vault")?;
        Ok(Self::new(vault, WorkflowController::new(ingestion, chat)))
    }

    #[must_use]
    pub fn vault(&self) -> &VaultController {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut VaultController {
        &mut self.vault
    }

    #[must_use]
    pub fn workflow(&self) -> &WorkflowController {
        &self.workflow
    }

    /// Send a chat message using the unlocked secret.
    ///
    /// A locked vault sends an empty secret, which the backend rejects and
    /// the workflow records as a failed turn.
    pub async fn send_message(&self, text: &str) -> Result<ChatTurn, WorkflowError> {
        let secret = self.vault.plaintext_secret().unwrap_or_default();
        self.workflow.send_message(text, secret).await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("vault", &self.vault.state())
            .field("workflow", &self.workflow)
            .finish()
    }
}
