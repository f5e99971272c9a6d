//! Ingestion pipeline and chat session for clara.
//!
//! [`WorkflowController`] uploads and processes a selected document, tracks
//! the coarse [`IngestionStatus`], and only lets chat messages through once
//! the knowledge base is `ready`.

mod controller;
mod status;
mod transcript;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use controller::{ChatTurn, IngestionReport, WorkflowController};
pub use status::IngestionStatus;
pub use transcript::{CHAT_FAILURE_REPLY, Speaker, TranscriptEntry};
