use async_trait::async_trait;
use std::fmt;
use std::path::Path;

use clara_utils::error::{ChatError, IngestionError};

/// A document selected for ingestion. Bytes are opaque to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Load a document from disk, named after the file name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Name under which the server stored an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub stored_name: String,
}

/// Outcome of processing stored documents into knowledge units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub units_generated: u64,
    /// Free-form note from the server (e.g. a skipped training step).
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
}

/// Knowledge-base side of the remote server.
#[async_trait]
pub trait IngestionBackend: Send + Sync {
    async fn upload_document(&self, document: &Document) -> Result<UploadReceipt, IngestionError>;

    async fn process_document(
        &self,
        stored_names: &[String],
    ) -> Result<ProcessReport, IngestionError>;

    /// Number of units in the knowledge base.
    async fn knowledge_base_size(&self) -> Result<u64, IngestionError>;

    async fn flush_knowledge_base(&self) -> Result<(), IngestionError>;
}

/// Chat inference side of the remote server.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_chat_message(&self, text: &str, secret: &str) -> Result<ChatReply, ChatError>;
}
