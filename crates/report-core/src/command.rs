//! JSON command surface for front ends
//!
//! Callers hand over plain data (header plus unvalidated record drafts) and
//! get back a serializable result with the PDF as base64.

use std::time::Instant;

use base64::Engine;
use inspection_types::{InspectionRecord, RecordDraft, ReportHeader};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::compositor::{Compositor, RenderedReport, TocEntry};
use crate::config::ReportConfig;
use crate::error::RenderError;

fn default_include_toc() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ReportCommand {
    /// Produce the PDF
    Render {
        #[serde(default)]
        header: ReportHeader,
        records: Vec<RecordDraft>,
        #[serde(default = "default_include_toc")]
        include_toc: bool,
    },
    /// Lay out the report but only return the table of contents
    Preview {
        #[serde(default)]
        header: ReportHeader,
        records: Vec<RecordDraft>,
        #[serde(default = "default_include_toc")]
        include_toc: bool,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessResult {
    pub success: bool,
    /// Base64-encoded PDF data
    pub data: Option<String>,
    /// Suggested download name
    pub filename: Option<String>,
    pub toc: Option<Vec<TocEntry>>,
    pub error: Option<String>,
    pub metrics: Option<ProcessMetrics>,
}

impl ProcessResult {
    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessMetrics {
    pub record_count: usize,
    pub page_count: u32,
    pub skipped_photos: usize,
    pub output_size_bytes: usize,
    pub processing_time_ms: u64,
}

/// Run a JSON-encoded [`ReportCommand`] with the default layout
pub fn process_command(json: &str) -> ProcessResult {
    process_command_with(&ReportConfig::default(), json)
}

/// Run a JSON-encoded [`ReportCommand`] with the given layout
pub fn process_command_with(config: &ReportConfig, json: &str) -> ProcessResult {
    let start = Instant::now();

    let command: ReportCommand = match serde_json::from_str(json) {
        Ok(cmd) => cmd,
        Err(e) => {
            let err = RenderError::SerializationError(e.to_string());
            warn!(error = %err, "Rejected report command");
            return ProcessResult::failure(err);
        }
    };

    let (header, drafts, include_toc, preview) = match command {
        ReportCommand::Render {
            header,
            records,
            include_toc,
        } => (header, records, include_toc, false),
        ReportCommand::Preview {
            header,
            records,
            include_toc,
        } => (header, records, include_toc, true),
    };

    let records = match validate_drafts(drafts) {
        Ok(records) => records,
        Err(err) => {
            warn!(error = %err, "Rejected report command");
            return ProcessResult::failure(err);
        }
    };

    let compositor = Compositor::new(config.clone());
    let report = match compositor.compose(&header, &records, include_toc) {
        Ok(report) => report,
        Err(err) => return ProcessResult::failure(err),
    };

    let metrics = metrics(&report, records.len(), start);
    if preview {
        return ProcessResult {
            success: true,
            toc: Some(report.toc),
            metrics: Some(metrics),
            ..ProcessResult::default()
        };
    }

    ProcessResult {
        success: true,
        data: Some(base64::engine::general_purpose::STANDARD.encode(&report.bytes)),
        filename: Some(header.suggested_filename()),
        toc: Some(report.toc),
        error: None,
        metrics: Some(metrics),
    }
}

fn validate_drafts(drafts: Vec<RecordDraft>) -> Result<Vec<InspectionRecord>, RenderError> {
    drafts
        .into_iter()
        .map(|draft| InspectionRecord::try_from(draft).map_err(RenderError::from))
        .collect()
}

fn metrics(report: &RenderedReport, record_count: usize, start: Instant) -> ProcessMetrics {
    ProcessMetrics {
        record_count,
        page_count: report.page_count,
        skipped_photos: report.skipped_photos.len(),
        output_size_bytes: report.bytes.len(),
        processing_time_ms: start.elapsed().as_millis() as u64,
    }
}
