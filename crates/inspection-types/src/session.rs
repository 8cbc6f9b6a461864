//! Working list of an inspection session
//!
//! The session is explicit state: handlers take it by value and hand back the
//! next state. Rendering only ever sees a [`Report`] snapshot.

use serde::{Deserialize, Serialize};

use crate::error::InvalidRecord;
use crate::header::{Report, ReportHeader};
use crate::record::{InspectionRecord, RecordDraft};

/// User actions that change the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionAction {
    SetHeader { header: ReportHeader },
    AddRecord { draft: RecordDraft },
    RemoveRecord { index: usize },
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionSession {
    pub header: ReportHeader,
    pub records: Vec<InspectionRecord>,
    /// Bumped whenever a record is accepted so the entry form starts blank
    pub form_iteration: u64,
}

impl InspectionSession {
    pub fn new(header: ReportHeader) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    /// Apply one action and return the next state
    ///
    /// A rejected draft leaves the session unchanged; the error is returned
    /// instead so the form can show it.
    pub fn apply(mut self, action: SessionAction) -> Result<Self, InvalidRecord> {
        match action {
            SessionAction::SetHeader { header } => {
                self.header = header;
            }
            SessionAction::AddRecord { draft } => {
                let record = InspectionRecord::try_from(draft)?;
                self.records.push(record);
                self.form_iteration += 1;
            }
            SessionAction::RemoveRecord { index } => {
                if index < self.records.len() {
                    self.records.remove(index);
                }
            }
            SessionAction::Clear => {
                self.records.clear();
            }
        }
        Ok(self)
    }

    /// Immutable copy of the current header and records for rendering
    pub fn snapshot(&self) -> Report {
        Report::new(self.header.clone(), self.records.clone())
    }

    /// One preview line per record, e.g. `#1 Rack R-22 (CRITICAL) - upright bay 3`
    pub fn summary_lines(&self) -> Vec<String> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "#{} Rack {} ({}) - {} {}",
                    i + 1,
                    r.rack_id(),
                    r.severity(),
                    r.component(),
                    r.position()
                )
                .trim_end()
                .to_string()
            })
            .collect()
    }
}
