//! Rack inspection data model
//!
//! Records, report headers and the in-memory inspection session that feeds
//! the report compositor. Everything here is plain data: records are
//! validated once when they are built and are immutable afterwards.

pub mod error;
pub mod header;
pub mod record;
pub mod session;

pub use error::InvalidRecord;
pub use header::{Report, ReportHeader};
pub use record::{
    Component, DefectCategory, InspectionRecord, PhotoRef, RecordDraft, Remedy, Severity,
    MAX_PHOTOS,
};
pub use session::{InspectionSession, SessionAction};
