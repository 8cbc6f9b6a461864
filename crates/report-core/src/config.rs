//! Report layout configuration
//!
//! All geometry is in millimetres. Defaults reproduce the established report
//! layout (A4, 10mm margins, new section page below 180mm); a TOML file can
//! override any subset of it.

use std::fs;
use std::path::Path;

use anyhow::Context;
use inspection_types::Severity;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::style::{self, parse_hex_color, SeverityPalette};

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub colors: ColorConfig,
}

impl ReportConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use report_core::config::ReportConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [layout]
    ///     overflow_threshold = 150.0
    ///
    ///     [labels]
    ///     title = "Inspektionsbericht Regalanlagen"
    /// "#;
    /// let config = ReportConfig::from_str(toml)?;
    /// assert_eq!(config.page.width, 210.0);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate().context("Invalid report configuration")?;
        Ok(config)
    }

    /// Check that the geometry can hold at least one section and one TOC line
    pub fn validate(&self) -> Result<(), RenderError> {
        let page = &self.page;
        let layout = &self.layout;

        let dimensions = [
            ("page.width", page.width),
            ("page.height", page.height),
            ("page.margin", page.margin),
            ("page.break_margin", page.break_margin),
            ("page.cell_padding", page.cell_padding),
            ("layout.overflow_threshold", layout.overflow_threshold),
            ("layout.photo_width", layout.photo_width),
            ("layout.photo_pitch", layout.photo_pitch),
            ("layout.photo_row_height", layout.photo_row_height),
            ("layout.toc_top_offset", layout.toc_top_offset),
            ("layout.toc_line_height", layout.toc_line_height),
        ];
        if let Some((name, value)) = dimensions.iter().find(|(_, v)| !v.is_finite()) {
            return Err(RenderError::InvalidLayout(format!(
                "{} must be a finite number, got {}",
                name, value
            )));
        }

        if page.width <= 2.0 * page.margin || page.height <= page.margin + page.break_margin {
            return Err(RenderError::InvalidLayout(format!(
                "page {}x{}mm leaves no printable area",
                page.width, page.height
            )));
        }
        if layout.overflow_threshold <= page.margin
            || layout.overflow_threshold >= page.break_trigger()
        {
            return Err(RenderError::InvalidLayout(format!(
                "overflow threshold {}mm must lie between the top margin and the page break at {}mm",
                layout.overflow_threshold,
                page.break_trigger()
            )));
        }
        if layout.photo_width <= 0.0 || layout.photo_pitch < layout.photo_width {
            return Err(RenderError::InvalidLayout(
                "photo pitch must be at least the photo width".to_string(),
            ));
        }
        if page.margin + 2.0 * layout.photo_pitch + layout.photo_width > page.width - page.margin {
            return Err(RenderError::InvalidLayout(
                "three photos do not fit across the page".to_string(),
            ));
        }
        if layout.photo_row_height <= 0.0 {
            return Err(RenderError::InvalidLayout(
                "photo row height must be positive".to_string(),
            ));
        }
        if layout.toc_entries_per_page(page) == 0 {
            return Err(RenderError::InvalidLayout(
                "table of contents cannot hold a single entry".to_string(),
            ));
        }
        for severity in Severity::ALL {
            if let Some(hex) = self.colors.banner_override(severity) {
                if parse_hex_color(hex).is_none() {
                    return Err(RenderError::InvalidLayout(format!(
                        "invalid {} banner color: {}",
                        severity, hex
                    )));
                }
            }
        }
        Ok(())
    }

    /// Palette for a severity, with configured banner overrides applied
    pub fn palette(&self, severity: Severity) -> SeverityPalette {
        let mut palette = style::palette(severity);
        if let Some(rgb) = self
            .colors
            .banner_override(severity)
            .and_then(parse_hex_color)
        {
            palette.banner = rgb;
        }
        palette
    }
}

/// Page geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
    /// Left, right and top margin
    pub margin: f64,
    /// Distance from the bottom edge at which text flows to a new page
    pub break_margin: f64,
    /// Horizontal padding inside text cells
    pub cell_padding: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 10.0,
            break_margin: 20.0,
            cell_padding: 1.0,
        }
    }
}

impl PageConfig {
    /// Y position (from the top) below which content triggers a page break
    pub fn break_trigger(&self) -> f64 {
        self.height - self.break_margin
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }
}

/// Section and table-of-contents layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// A section starting below this y position goes to a new page
    pub overflow_threshold: f64,
    pub photo_width: f64,
    /// Horizontal distance between the left edges of adjacent photos
    pub photo_pitch: f64,
    /// Vertical space reserved for a photo row, whatever the image heights
    pub photo_row_height: f64,
    pub toc_top_offset: f64,
    pub toc_line_height: f64,
    /// Fail the render on an unreadable photo instead of skipping it
    pub strict_assets: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            overflow_threshold: 180.0,
            photo_width: 45.0,
            photo_pitch: 50.0,
            photo_row_height: 42.0,
            toc_top_offset: 30.0,
            toc_line_height: 4.5,
            strict_assets: false,
        }
    }
}

impl LayoutConfig {
    pub fn toc_entries_per_page(&self, page: &PageConfig) -> usize {
        if self.toc_line_height <= 0.0 {
            return 0;
        }
        let available = page.break_trigger() - self.toc_top_offset;
        if available <= 0.0 {
            return 0;
        }
        (available / self.toc_line_height).floor() as usize
    }
}

/// Visible strings of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub title: String,
    pub customer: String,
    pub site: String,
    pub area: String,
    pub inspector: String,
    pub date: String,
    pub table_of_contents: String,
    pub rack: String,
    pub status: String,
    pub rack_type: String,
    pub component: String,
    pub position: String,
    pub description: String,
    pub remedy: String,
    pub page: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            title: "Rack Inspection Report".to_string(),
            customer: "Customer".to_string(),
            site: "Site".to_string(),
            area: "Area".to_string(),
            inspector: "Inspector".to_string(),
            date: "Date".to_string(),
            table_of_contents: "Table of Contents".to_string(),
            rack: "RACK".to_string(),
            status: "STATUS".to_string(),
            rack_type: "Rack type".to_string(),
            component: "Component".to_string(),
            position: "Position".to_string(),
            description: "Description & remedy".to_string(),
            remedy: "Remedy".to_string(),
            page: "Page".to_string(),
        }
    }
}

/// Optional banner color overrides as hex strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical: Option<String>,
}

impl ColorConfig {
    fn banner_override(&self, severity: Severity) -> Option<&str> {
        match severity {
            Severity::Ok => self.ok.as_deref(),
            Severity::Warning => self.warning.as_deref(),
            Severity::Critical => self.critical.as_deref(),
        }
    }
}
