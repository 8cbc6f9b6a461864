//! Report header metadata and the report snapshot handed to the compositor

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::InspectionRecord;

/// Cover-page metadata; every field is optional free text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportHeader {
    pub customer: String,
    pub site: String,
    pub area: String,
    pub inspector: String,
    pub inspection_date: Option<NaiveDate>,
}

impl ReportHeader {
    pub fn new(customer: impl Into<String>) -> Self {
        Self {
            customer: customer.into(),
            ..Self::default()
        }
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    pub fn with_inspector(mut self, inspector: impl Into<String>) -> Self {
        self.inspector = inspector.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.inspection_date = Some(date);
        self
    }

    /// Inspection date as `dd.mm.yyyy`, empty when unset
    pub fn formatted_date(&self) -> String {
        self.inspection_date
            .map(|d| d.format("%d.%m.%Y").to_string())
            .unwrap_or_default()
    }

    /// Download name for the rendered report, e.g. `Report_Acme.pdf`
    pub fn suggested_filename(&self) -> String {
        let name: String = self
            .customer
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c if c.is_whitespace() => '_',
                c => c,
            })
            .collect();

        if name.is_empty() {
            "Report.pdf".to_string()
        } else {
            format!("Report_{}.pdf", name)
        }
    }
}

/// Header plus records in entry order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub header: ReportHeader,
    #[serde(default)]
    pub records: Vec<InspectionRecord>,
}

impl Report {
    pub fn new(header: ReportHeader, records: Vec<InspectionRecord>) -> Self {
        Self { header, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_date() {
        let header =
            ReportHeader::new("Acme").with_date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(header.formatted_date(), "07.03.2024");
        assert_eq!(ReportHeader::new("Acme").formatted_date(), "");
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(
            ReportHeader::new("Acme").suggested_filename(),
            "Report_Acme.pdf"
        );
        assert_eq!(
            ReportHeader::new("Acme GmbH / Werk 2").suggested_filename(),
            "Report_Acme_GmbH___Werk_2.pdf"
        );
        assert_eq!(ReportHeader::new("  ").suggested_filename(), "Report.pdf");
    }

    #[test]
    fn test_header_deserializes_with_missing_fields() {
        let header: ReportHeader =
            serde_json::from_str(r#"{"customer":"Acme","inspection_date":"2024-05-01"}"#)
                .unwrap();
        assert_eq!(header.customer, "Acme");
        assert_eq!(header.site, "");
        assert_eq!(header.formatted_date(), "01.05.2024");
    }
}
