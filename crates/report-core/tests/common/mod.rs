//! Shared fixtures for report integration tests

#![allow(dead_code)]

use std::io::Cursor;

use chrono::NaiveDate;
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use inspection_types::{Component, InspectionRecord, RecordDraft, ReportHeader, Severity};

/// Route library logs to the test output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn acme_header() -> ReportHeader {
    ReportHeader::new("Acme")
        .with_site("Berlin")
        .with_area("Hall 4")
        .with_inspector("J. Doe")
        .with_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([90, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn short_record(rack_id: &str, severity: Severity) -> InspectionRecord {
    RecordDraft::new(rack_id, Component::Beam, severity)
        .with_position("level 2")
        .with_defect("Deformation: bent")
        .with_remedy("Monitor")
        .build()
        .unwrap()
}

/// Record whose section ends below the new-page threshold
///
/// Fifteen description lines plus the remedy and one photo put the cursor
/// at 191mm after the separator.
pub fn long_record(rack_id: &str, severity: Severity) -> InspectionRecord {
    let description = (1..=15)
        .map(|i| format!("Finding {}", i))
        .collect::<Vec<_>>()
        .join("\n");
    RecordDraft::new(rack_id, Component::Upright, severity)
        .with_position("bay 1")
        .with_defect(description)
        .with_remedy("Replace within 4 weeks")
        .with_photo(png(40, 30))
        .build()
        .unwrap()
}
