//! Scriptable backends for tests.
//!
//! Each fake counts its calls in `Arc<AtomicUsize>` counters. The ingestion
//! fake can hold an upload open on a [`Notify`] gate so tests can observe the
//! in-flight status.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use clara_backend::{
    ChatBackend, ChatReply, Document, IngestionBackend, ProcessReport, UploadReceipt,
};
use clara_utils::error::{ChatError, IngestionError};

/// In-memory knowledge-base server.
#[derive(Debug)]
pub struct FakeIngestionBackend {
    pub upload_calls: Arc<AtomicUsize>,
    pub process_calls: Arc<AtomicUsize>,
    pub size_calls: Arc<AtomicUsize>,
    pub flush_calls: Arc<AtomicUsize>,
    stored_name: Option<String>,
    units: u64,
    size: u64,
    fail_upload: AtomicBool,
    fail_process: AtomicBool,
    fail_size: AtomicBool,
    fail_flush: AtomicBool,
    upload_gate: Option<Arc<Notify>>,
    uploaded: Mutex<Vec<Document>>,
    processed: Mutex<Vec<Vec<String>>>,
}

impl Default for FakeIngestionBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeIngestionBackend {
    /// Succeeds everywhere: stores documents under their own name, reports
    /// 42 units and a size of 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            upload_calls: Arc::new(AtomicUsize::new(0)),
            process_calls: Arc::new(AtomicUsize::new(0)),
            size_calls: Arc::new(AtomicUsize::new(0)),
            flush_calls: Arc::new(AtomicUsize::new(0)),
            stored_name: None,
            units: 42,
            size: 0,
            fail_upload: AtomicBool::new(false),
            fail_process: AtomicBool::new(false),
            fail_size: AtomicBool::new(false),
            fail_flush: AtomicBool::new(false),
            upload_gate: None,
            uploaded: Mutex::new(Vec::new()),
            processed: Mutex::new(Vec::new()),
        }
    }

    /// Store every upload under `name` instead of the document's own name.
    #[must_use]
    pub fn with_stored_name(mut self, name: impl Into<String>) -> Self {
        self.stored_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_units(mut self, units: u64) -> Self {
        self.units = units;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn failing_upload(self) -> Self {
        self.set_fail_upload(true);
        self
    }

    #[must_use]
    pub fn failing_process(self) -> Self {
        self.fail_process.store(true, Ordering::SeqCst);
        self
    }

    #[must_use]
    pub fn failing_size(self) -> Self {
        self.fail_size.store(true, Ordering::SeqCst);
        self
    }

    #[must_use]
    pub fn failing_flush(self) -> Self {
        self.fail_flush.store(true, Ordering::SeqCst);
        self
    }

    /// Hold each upload until `gate` is notified.
    #[must_use]
    pub fn gated_upload(mut self, gate: Arc<Notify>) -> Self {
        self.upload_gate = Some(gate);
        self
    }

    pub fn set_fail_upload(&self, fail: bool) {
        self.fail_upload.store(fail, Ordering::SeqCst);
    }

    /// Names passed to each `process_document` call, in order.
    #[must_use]
    pub fn processed_names(&self) -> Vec<Vec<String>> {
        self.processed
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Documents received by `upload_document`, in order.
    #[must_use]
    pub fn uploaded_documents(&self) -> Vec<Document> {
        self.uploaded
            .lock()
            .map(|u| u.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IngestionBackend for FakeIngestionBackend {
    async fn upload_document(&self, document: &Document) -> Result<UploadReceipt, IngestionError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.upload_gate {
            gate.notified().await;
        }
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(IngestionError::Upload("HTTP 500: upload rejected".to_string()));
        }
        if let Ok(mut uploaded) = self.uploaded.lock() {
            uploaded.push(document.clone());
        }
        Ok(UploadReceipt {
            stored_name: self
                .stored_name
                .clone()
                .unwrap_or_else(|| document.name.clone()),
        })
    }

    async fn process_document(
        &self,
        stored_names: &[String],
    ) -> Result<ProcessReport, IngestionError> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut processed) = self.processed.lock() {
            processed.push(stored_names.to_vec());
        }
        if self.fail_process.load(Ordering::SeqCst) {
            return Err(IngestionError::Processing(
                "HTTP 400: No valid content extracted from uploaded files.".to_string(),
            ));
        }
        Ok(ProcessReport {
            units_generated: self.units,
            message: None,
        })
    }

    async fn knowledge_base_size(&self) -> Result<u64, IngestionError> {
        self.size_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_size.load(Ordering::SeqCst) {
            return Err(IngestionError::SizeQuery("HTTP 503".to_string()));
        }
        Ok(self.size)
    }

    async fn flush_knowledge_base(&self) -> Result<(), IngestionError> {
        self.flush_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_flush.load(Ordering::SeqCst) {
            return Err(IngestionError::Flush("HTTP 500: locked".to_string()));
        }
        Ok(())
    }
}

/// Chat server answering every message the same way.
#[derive(Debug)]
pub struct FakeChatBackend {
    pub calls: Arc<AtomicUsize>,
    outcome: Result<String, ChatError>,
    last_request: Mutex<Option<(String, String)>>,
}

impl FakeChatBackend {
    #[must_use]
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::with_outcome(Ok(reply.into()))
    }

    #[must_use]
    pub fn failing(error: ChatError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<String, ChatError>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            outcome,
            last_request: Mutex::new(None),
        }
    }

    /// `(text, secret)` of the most recent call.
    #[must_use]
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl ChatBackend for FakeChatBackend {
    async fn send_chat_message(&self, text: &str, secret: &str) -> Result<ChatReply, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some((text.to_string(), secret.to_string()));
        }
        if secret.is_empty() {
            return Err(ChatError::MissingSecret);
        }
        self.outcome
            .clone()
            .map(|reply| ChatReply { reply })
    }
}
