//! Contracts for the remote collaborators of the ingestion workflow.
//!
//! [`IngestionBackend`] covers upload, processing, size and flush of the
//! knowledge base; [`ChatBackend`] sends one chat message. [`HttpBackend`]
//! implements both against the knowledge-base server's REST routes.

mod http_backend;
mod types;

pub use http_backend::HttpBackend;
pub use types::{
    ChatBackend, ChatReply, Document, IngestionBackend, ProcessReport, UploadReceipt,
};
