//! Rack inspection report rendering
//!
//! Turns a [`ReportHeader`] and an ordered list of [`InspectionRecord`]s into
//! a paginated PDF using lopdf: a cover page, an optional table of contents
//! and one detail section per record with a severity-colored banner and up
//! to three photos.
//!
//! Pages are kept in an in-memory [`arena`] until the end so the table of
//! contents, which sits before the detail pages, can be filled in once their
//! page numbers are known.
//!
//! ```no_run
//! use inspection_types::{Component, RecordDraft, ReportHeader, Severity};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let header = ReportHeader::new("Acme").with_site("Berlin");
//! let record = RecordDraft::new("R-01", Component::Upright, Severity::Critical)
//!     .with_position("bay 3")
//!     .build()?;
//! let pdf = report_core::render(&header, &[record], true)?;
//! std::fs::write(header.suggested_filename(), pdf)?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ReportHeader`]: inspection_types::ReportHeader
//! [`InspectionRecord`]: inspection_types::InspectionRecord

pub mod arena;
pub mod command;
pub mod compositor;
pub mod config;
pub mod error;
pub mod inspect;
pub mod photo;
pub mod style;
pub mod text;
pub mod writer;

pub use command::{process_command, ProcessMetrics, ProcessResult, ReportCommand};
pub use compositor::{render, Compositor, RenderedReport, SectionPlacement, TocEntry};
pub use config::ReportConfig;
pub use error::RenderError;
pub use inspect::{find_page_containing, get_page_count, page_text_runs};
pub use photo::{AssetResolver, LocalAssets};
