//! Knowledge-base command implementations
//!
//! Handles `clara kb ingest|flush|size`. Each command runs one workflow
//! operation against the configured server and prints its event log.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use clara_backend::{Document, IngestionBackend};
use clara_workflow::WorkflowController;

use super::common::{FLUSH_QUESTION, confirm, http_backend};
use crate::{ClaraError, Config};

fn workflow(config: &Config) -> Result<WorkflowController> {
    let backend = http_backend(config)?;
    Ok(WorkflowController::new(backend.clone(), backend))
}

fn print_log(workflow: &WorkflowController) {
    for entry in workflow.event_log() {
        println!("{entry}");
    }
}

/// Execute the kb ingest command
pub async fn execute_kb_ingest_command(config: &Config, file: &Path) -> Result<()> {
    let document = Document::from_path(file)
        .map_err(ClaraError::from)
        .with_context(|| format!("Failed to read document: {}", file.display()))?;

    let workflow = workflow(config)?;
    workflow.select_document(document);
    let result = workflow.start_ingestion().await;
    print_log(&workflow);

    let report = result?;
    println!();
    println!("Status: {}", workflow.status());
    println!("  Stored as: {}", report.stored_name);
    println!("  Knowledge base size: {}", report.knowledge_base_size);
    Ok(())
}

/// Execute the kb flush command
pub async fn execute_kb_flush_command(config: &Config, yes: bool) -> Result<()> {
    if !confirm(FLUSH_QUESTION, yes)? {
        println!("Aborted. The knowledge base was kept.");
        return Ok(());
    }

    let workflow = workflow(config)?;
    let result = workflow.flush().await;
    print_log(&workflow);
    result?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct KbSizeJson {
    count: u64,
    base_url: String,
}

/// Execute the kb size command
///
/// Unlike the size refresh after ingestion, a failed query is reported.
pub async fn execute_kb_size_command(config: &Config, json: bool) -> Result<()> {
    let backend = http_backend(config)?;
    let count = backend.knowledge_base_size().await?;

    if json {
        let output = KbSizeJson {
            count,
            base_url: config.base_url().to_string(),
        };
        let rendered =
            serde_json::to_string_pretty(&output).context("Failed to emit kb size JSON")?;
        println!("{rendered}");
    } else {
        println!("Knowledge base: {count} units");
    }
    Ok(())
}
