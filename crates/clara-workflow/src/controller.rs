use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{Instrument, debug, info, warn};

use clara_backend::{ChatBackend, ChatReply, Document, IngestionBackend};
use clara_utils::error::{ChatError, IngestionError, WorkflowError};
use clara_utils::logging::{log_backend_failure, log_status_transition, workflow_span};

use crate::status::IngestionStatus;
use crate::transcript::{CHAT_FAILURE_REPLY, TranscriptEntry};

/// Result of a completed ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionReport {
    pub stored_name: String,
    pub units_generated: u64,
    pub knowledge_base_size: u64,
}

/// Outcome of one chat exchange. The transcript already holds the user entry
/// and either the reply or [`CHAT_FAILURE_REPLY`].
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub reply: Result<ChatReply, ChatError>,
}

impl ChatTurn {
    /// Text that was appended as the assistant entry.
    #[must_use]
    pub fn reply_text(&self) -> &str {
        match &self.reply {
            Ok(reply) => &reply.reply,
            Err(_) => CHAT_FAILURE_REPLY,
        }
    }
}

#[derive(Debug, Default)]
struct WorkflowState {
    status: IngestionStatus,
    selected_document: Option<Document>,
    event_log: Vec<String>,
    knowledge_base_size: u64,
    transcript: Vec<TranscriptEntry>,
    draft: String,
    /// Set from admission until the pipeline returns. A flush may move
    /// `status` back to idle meanwhile; this flag still blocks a second start.
    ingestion_in_flight: bool,
}

impl WorkflowState {
    fn log(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        debug!(entry = %entry, "Event log");
        self.event_log.push(entry);
    }

    fn transition(&mut self, to: IngestionStatus) {
        if self.status != to {
            log_status_transition(self.status.as_ref(), to.as_ref());
            self.status = to;
        }
    }

    fn fail_ingestion(&mut self, error: &IngestionError) {
        self.log("Error occurred during processing.");
        self.transition(IngestionStatus::Error);
        log_backend_failure("ingest", &error.to_string(), None);
    }
}

/// Drives document ingestion and the chat session.
///
/// Methods take `&self`. State sits behind a mutex that is released before
/// every backend call, so a second operation can start while one is awaiting
/// the backend. At most one ingestion runs at a time.
pub struct WorkflowController {
    ingestion: Arc<dyn IngestionBackend>,
    chat: Arc<dyn ChatBackend>,
    state: Mutex<WorkflowState>,
}

impl WorkflowController {
    pub fn new(ingestion: Arc<dyn IngestionBackend>, chat: Arc<dyn ChatBackend>) -> Self {
        Self {
            ingestion,
            chat,
            state: Mutex::new(WorkflowState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        // State stays consistent between statements, so a poisoned lock is usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make `document` the one the next ingestion will use.
    pub fn select_document(&self, document: Document) {
        let mut state = self.lock();
        info!(name = %document.name, bytes = document.len(), "Document selected");
        state.log(format!("Selected: {} ({} bytes)", document.name, document.len()));
        state.selected_document = Some(document);
    }

    /// Upload and process the selected document.
    ///
    /// Steps run strictly in order: upload, process, size refresh. A failed
    /// upload or process sets `error` and skips the remaining steps. The size
    /// refresh is best effort and reads as 0 when it fails.
    pub async fn start_ingestion(&self) -> Result<IngestionReport, WorkflowError> {
        let span = workflow_span("ingest");

        let document = {
            let mut state = self.lock();
            if state.ingestion_in_flight || !state.status.accepts_start() {
                let status = state.status.to_string();
                warn!(status = %status, "Ingestion rejected: already in progress");
                state.log(format!(
                    "Ingestion rejected: another ingestion is in progress ({status})."
                ));
                return Err(WorkflowError::IngestionInFlight { status });
            }
            let Some(document) = state.selected_document.clone() else {
                state.log("Ingestion rejected: no document selected.");
                return Err(WorkflowError::NoDocument);
            };
            state.ingestion_in_flight = true;
            state.transition(IngestionStatus::Uploading);
            state.log("Starting upload...");
            document
        };

        let result = self.run_ingestion(document).instrument(span).await;
        self.lock().ingestion_in_flight = false;
        result
    }

    async fn run_ingestion(&self, document: Document) -> Result<IngestionReport, WorkflowError> {
        let uploaded = self.ingestion.upload_document(&document).await;
        let receipt = {
            let mut state = self.lock();
            match uploaded {
                Ok(receipt) => {
                    info!(stored_name = %receipt.stored_name, "Document uploaded");
                    state.log(format!("Uploaded: {}", receipt.stored_name));
                    state.transition(IngestionStatus::Processing);
                    state.log("Step 1: Analyzing & Appending to Knowledge Base...");
                    receipt
                }
                Err(e) => {
                    state.fail_ingestion(&e);
                    return Err(e.into());
                }
            }
        };

        let processed = self
            .ingestion
            .process_document(std::slice::from_ref(&receipt.stored_name))
            .await;
        let report = {
            let mut state = self.lock();
            match processed {
                Ok(report) => {
                    info!(units_generated = report.units_generated, "Document processed");
                    state.log(format!("Generated {} QA pairs.", report.units_generated));
                    if let Some(message) = &report.message {
                        state.log(message.clone());
                    }
                    state.log("Knowledge Base Updated.");
                    report
                }
                Err(e) => {
                    state.fail_ingestion(&e);
                    return Err(e.into());
                }
            }
        };

        let size = self.query_size().await;
        {
            let mut state = self.lock();
            state.knowledge_base_size = size;
            state.transition(IngestionStatus::Ready);
        }

        Ok(IngestionReport {
            stored_name: receipt.stored_name,
            units_generated: report.units_generated,
            knowledge_base_size: size,
        })
    }

    async fn query_size(&self) -> u64 {
        match self.ingestion.knowledge_base_size().await {
            Ok(size) => {
                debug!(kb_size = size, "Knowledge base size refreshed");
                size
            }
            Err(e) => {
                log_backend_failure("db_status", &e.to_string(), None);
                0
            }
        }
    }

    /// Refresh the knowledge-base size from the backend. Failure reads as 0.
    pub async fn refresh_knowledge_base_size(&self) -> u64 {
        let size = self.query_size().await;
        let mut state = self.lock();
        state.knowledge_base_size = size;
        state.log(format!("Knowledge base size: {size} units."));
        size
    }

    /// Delete the remote knowledge base. Allowed from any status.
    ///
    /// On failure only the event log changes.
    pub async fn flush(&self) -> Result<(), WorkflowError> {
        let result = self
            .ingestion
            .flush_knowledge_base()
            .instrument(workflow_span("flush"))
            .await;

        let mut state = self.lock();
        match result {
            Ok(()) => {
                state.knowledge_base_size = 0;
                state.transition(IngestionStatus::Idle);
                state.log("Knowledge Base Flushed.");
                info!("Knowledge base flushed");
                Ok(())
            }
            Err(e) => {
                state.log("Error flushing DB.");
                log_backend_failure("flush", &e.to_string(), None);
                Err(e.into())
            }
        }
    }

    /// Send `text` to the chat backend with `secret`.
    ///
    /// Only allowed while `ready`. The user entry is appended and the draft
    /// cleared before the backend call; the reply or the fixed apology is
    /// appended after it. Chat failures never change the ingestion status.
    pub async fn send_message(
        &self,
        text: &str,
        secret: &str,
    ) -> Result<ChatTurn, WorkflowError> {
        {
            let mut state = self.lock();
            if !state.status.chat_available() {
                let status = state.status.to_string();
                state.log(format!("Chat rejected: knowledge base is {status}."));
                return Err(WorkflowError::ChatUnavailable { status });
            }
            if text.trim().is_empty() {
                state.log("Chat rejected: empty message.");
                return Err(WorkflowError::EmptyMessage);
            }
            state.transcript.push(TranscriptEntry::user(text));
            state.draft.clear();
        }

        let reply = self
            .chat
            .send_chat_message(text, secret)
            .instrument(workflow_span("chat"))
            .await;

        let mut state = self.lock();
        match &reply {
            Ok(reply) => {
                debug!(reply_len = reply.reply.len(), "Chat reply appended");
                state.transcript.push(TranscriptEntry::assistant(reply.reply.clone()));
                state.log("Chat reply received.");
            }
            Err(e) => {
                log_backend_failure("chat", &e.to_string(), Some(secret));
                state.transcript.push(TranscriptEntry::assistant(CHAT_FAILURE_REPLY));
                state.log("Chat request failed.");
            }
        }

        Ok(ChatTurn { reply })
    }

    /// Clear the transcript. Ingestion state is untouched.
    pub fn new_chat(&self) {
        let mut state = self.lock();
        state.transcript.clear();
        state.log("New chat started.");
    }

    #[must_use]
    pub fn status(&self) -> IngestionStatus {
        self.lock().status
    }

    #[must_use]
    pub fn event_log(&self) -> Vec<String> {
        self.lock().event_log.clone()
    }

    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.lock().transcript.clone()
    }

    #[must_use]
    pub fn knowledge_base_size(&self) -> u64 {
        self.lock().knowledge_base_size
    }

    #[must_use]
    pub fn selected_document(&self) -> Option<Document> {
        self.lock().selected_document.clone()
    }

    #[must_use]
    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        self.lock().draft = draft.into();
    }
}

impl std::fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("WorkflowController")
            .field("status", &state.status)
            .field("events", &state.event_log.len())
            .field("transcript", &state.transcript.len())
            .finish_non_exhaustive()
    }
}
