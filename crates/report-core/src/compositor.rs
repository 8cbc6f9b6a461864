//! Report compositor
//!
//! Lays out the cover page, an optional table of contents and one detail
//! section per record. The table of contents is reserved up front with its
//! heading only; its lines are written back once every section knows the
//! page it starts on.

use inspection_types::{Component, InspectionRecord, ReportHeader, Severity};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::arena::DocumentInfo;
use crate::config::ReportConfig;
use crate::error::RenderError;
use crate::photo::{decode_photo, AssetResolver, LocalAssets, PdfImage};
use crate::style::Rgb;
use crate::text::{truncate_to_width, Font};
use crate::writer::{Align, CellStyle, PageWriter};

/// ZapfDingbats code for a filled circle
const TOC_MARKER: &str = "l";
const TOC_MARKER_WIDTH: f64 = 6.0;
const TOC_PAGE_COLUMN: f64 = 20.0;
const TOC_FONT_SIZE: f64 = 9.0;
const FIELD_LABEL_WIDTH: f64 = 40.0;
const BANNER_HEIGHT: f64 = 10.0;

/// One table-of-contents line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub rack_id: String,
    pub severity: Severity,
    pub component: Component,
    pub position: String,
    /// Page on which the record's section starts
    pub page: u32,
}

impl TocEntry {
    /// Text shown between the marker and the page number
    pub fn label(&self) -> String {
        format!("{}: {} ({})", self.rack_id, self.component, self.position)
    }
}

/// Where a record's detail section ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPlacement {
    pub record_index: usize,
    pub page: u32,
    pub end_page: u32,
    /// Cursor y at the top of the banner
    pub top: f64,
    /// Cursor y after the closing separator
    pub bottom: f64,
    pub photos_placed: usize,
}

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub page_count: u32,
    pub toc: Vec<TocEntry>,
    /// Reserved table-of-contents pages, empty without a TOC
    pub toc_pages: Vec<u32>,
    pub sections: Vec<SectionPlacement>,
    /// Photos left out of the report, as [`RenderError::MissingAsset`]
    pub skipped_photos: Vec<RenderError>,
}

/// Render with the default layout and photos read from the local filesystem
pub fn render(
    header: &ReportHeader,
    records: &[InspectionRecord],
    include_toc: bool,
) -> Result<Vec<u8>, RenderError> {
    Compositor::new(ReportConfig::default()).render(header, records, include_toc)
}

pub struct Compositor<R: AssetResolver = LocalAssets> {
    config: ReportConfig,
    assets: R,
}

impl Compositor<LocalAssets> {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            assets: LocalAssets::new(),
        }
    }
}

impl<R: AssetResolver> Compositor<R> {
    /// Use a different photo source
    pub fn with_assets<A: AssetResolver>(self, assets: A) -> Compositor<A> {
        Compositor {
            config: self.config,
            assets,
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn render(
        &self,
        header: &ReportHeader,
        records: &[InspectionRecord],
        include_toc: bool,
    ) -> Result<Vec<u8>, RenderError> {
        self.compose(header, records, include_toc).map(|report| report.bytes)
    }

    /// Lay out and serialize the whole report
    #[instrument(skip_all, fields(records = records.len(), include_toc = include_toc))]
    pub fn compose(
        &self,
        header: &ReportHeader,
        records: &[InspectionRecord],
        include_toc: bool,
    ) -> Result<RenderedReport, RenderError> {
        self.config.validate()?;
        info!("Composing inspection report");

        let mut layout = Layout {
            writer: PageWriter::new(&self.config.page),
            toc: Vec::with_capacity(records.len()),
            sections: Vec::with_capacity(records.len()),
            skipped: Vec::new(),
        };

        self.draw_cover(&mut layout.writer, header)?;

        let toc_pages = if include_toc && !records.is_empty() {
            self.reserve_toc(&mut layout.writer, records.len())?
        } else {
            Vec::new()
        };

        for (index, record) in records.iter().enumerate() {
            self.draw_section(&mut layout, index, record)?;
        }

        if !toc_pages.is_empty() {
            self.write_toc(&mut layout.writer, &toc_pages, &layout.toc)?;
        }

        let page_count = layout.writer.page_count();
        let bytes = layout.writer.finish().linearize(
            self.config.page.width,
            self.config.page.height,
            &self.document_info(header),
        )?;

        info!(
            pages = page_count,
            bytes = bytes.len(),
            skipped_photos = layout.skipped.len(),
            "Report composed"
        );

        Ok(RenderedReport {
            bytes,
            page_count,
            toc: layout.toc,
            toc_pages,
            sections: layout.sections,
            skipped_photos: layout.skipped,
        })
    }

    fn draw_cover(&self, writer: &mut PageWriter, header: &ReportHeader) -> Result<(), RenderError> {
        let labels = &self.config.labels;
        writer.add_page();

        writer.set_font(Font::HelveticaBold, 24.0);
        writer.cell(
            0.0,
            30.0,
            &labels.title,
            CellStyle::line().aligned(Align::Center),
        )?;

        writer.set_font(Font::Helvetica, 12.0);
        let rows = [
            format!("{}: {}", labels.customer, header.customer),
            format!(
                "{}: {} | {}: {}",
                labels.site, header.site, labels.area, header.area
            ),
            format!(
                "{}: {} | {}: {}",
                labels.inspector,
                header.inspector,
                labels.date,
                header.formatted_date()
            ),
        ];
        for row in &rows {
            writer.cell(0.0, 8.0, row, CellStyle::line())?;
        }
        writer.ln(10.0);
        Ok(())
    }

    /// Add the table-of-contents pages with their heading and return their numbers
    fn reserve_toc(&self, writer: &mut PageWriter, entries: usize) -> Result<Vec<u32>, RenderError> {
        let per_page = self.config.layout.toc_entries_per_page(&self.config.page);
        let page_total = entries.div_ceil(per_page);

        let mut pages = Vec::with_capacity(page_total);
        for _ in 0..page_total {
            pages.push(writer.add_page());
            writer.set_font(Font::HelveticaBold, 16.0);
            writer.cell(
                0.0,
                10.0,
                &self.config.labels.table_of_contents,
                CellStyle::line().aligned(Align::Center),
            )?;
        }
        debug!(?pages, per_page, "Reserved table of contents");
        Ok(pages)
    }

    /// Draw one record's detail section
    ///
    /// Only the first section is forced onto a fresh page. Later sections
    /// share the current page while the cursor is above the overflow
    /// threshold, so several short sections can sit on one page. A section
    /// whose banner would cross the page break also starts a new page; the
    /// recorded start page is always the banner's page.
    fn draw_section(
        &self,
        layout: &mut Layout,
        index: usize,
        record: &InspectionRecord,
    ) -> Result<(), RenderError> {
        let page_cfg = &self.config.page;
        let cfg = &self.config.layout;
        let labels = &self.config.labels;
        let writer = &mut layout.writer;

        if index == 0
            || writer.y() > cfg.overflow_threshold
            || writer.y() + BANNER_HEIGHT > writer.break_trigger()
        {
            writer.add_page();
            debug!(record = index, page = writer.page_number(), "Section starts new page");
        }
        let entry_page = writer.page_number();
        let top = writer.y();
        layout.toc.push(TocEntry {
            rack_id: record.rack_id().to_string(),
            severity: record.severity(),
            component: record.component(),
            position: record.position().to_string(),
            page: entry_page,
        });

        let palette = self.config.palette(record.severity());
        writer.set_fill_color(palette.banner);
        writer.set_font(Font::HelveticaBold, 13.0);
        writer.cell(
            0.0,
            BANNER_HEIGHT,
            &format!(
                "{}: {} - {}: {}",
                labels.rack,
                record.rack_id(),
                labels.status,
                record.severity()
            ),
            CellStyle::line().filled(),
        )?;

        if let Some(rack_type) = record.rack_type() {
            field_row(writer, &labels.rack_type, rack_type)?;
        }
        field_row(writer, &labels.component, record.component().as_str())?;
        field_row(writer, &labels.position, record.position())?;

        writer.set_font(Font::HelveticaBold, 11.0);
        writer.cell(0.0, 7.0, &format!("{}:", labels.description), CellStyle::line())?;
        writer.set_font(Font::Helvetica, 11.0);
        writer.multi_cell(
            0.0,
            6.0,
            &format!(
                "{}\n{}: {}",
                record.defect_description(),
                labels.remedy,
                record.remedy()
            ),
        )?;

        let images = self.resolve_photos(record, &mut layout.skipped)?;
        let photos_placed = images.len();
        if !images.is_empty() {
            writer.ln(2.0);
            if writer.y() + cfg.photo_row_height > writer.break_trigger() {
                writer.add_page();
                debug!(record = index, page = writer.page_number(), "Photo row moved to next page");
            }
            let row_top = writer.y();
            for (slot, image) in images.into_iter().enumerate() {
                let id = writer.register_image(image);
                let x = page_cfg.margin + slot as f64 * cfg.photo_pitch;
                writer.image(id, x, row_top, cfg.photo_width)?;
            }
            writer.set_y(row_top + cfg.photo_row_height);
        }

        writer.ln(5.0);
        let rule_y = writer.y();
        writer.line(page_cfg.margin, rule_y, page_cfg.width - page_cfg.margin, rule_y)?;
        writer.ln(5.0);

        layout.sections.push(SectionPlacement {
            record_index: index,
            page: entry_page,
            end_page: writer.page_number(),
            top,
            bottom: writer.y(),
            photos_placed,
        });
        Ok(())
    }

    /// Load and decode a record's photos, skipping the ones that fail
    fn resolve_photos(
        &self,
        record: &InspectionRecord,
        skipped: &mut Vec<RenderError>,
    ) -> Result<Vec<PdfImage>, RenderError> {
        let mut images = Vec::with_capacity(record.photos().len());
        for (index, photo) in record.photos().iter().enumerate() {
            let decoded = self
                .assets
                .load(photo)
                .map_err(|e| e.to_string())
                .and_then(|bytes| decode_photo(&bytes));
            match decoded {
                Ok(image) => images.push(image),
                Err(reason) => {
                    let err = RenderError::MissingAsset {
                        rack_id: record.rack_id().to_string(),
                        photo_index: index + 1,
                        reason,
                    };
                    if self.config.layout.strict_assets {
                        return Err(err);
                    }
                    warn!(photo = %photo.label(), error = %err, "Skipping photo");
                    skipped.push(err);
                }
            }
        }
        Ok(images)
    }

    fn write_toc(
        &self,
        writer: &mut PageWriter,
        pages: &[u32],
        entries: &[TocEntry],
    ) -> Result<(), RenderError> {
        let cfg = &self.config.layout;
        let per_page = cfg.toc_entries_per_page(&self.config.page);
        let label_width =
            self.config.page.content_width() - TOC_MARKER_WIDTH - TOC_PAGE_COLUMN;

        writer.set_auto_page_break(false);
        for (page, chunk) in pages.iter().zip(entries.chunks(per_page)) {
            writer.select_page(*page)?;
            writer.set_y(cfg.toc_top_offset);
            for entry in chunk {
                let h = cfg.toc_line_height;

                writer.set_text_color(self.config.palette(entry.severity).marker);
                writer.set_font(Font::ZapfDingbats, TOC_FONT_SIZE);
                writer.cell(TOC_MARKER_WIDTH, h, TOC_MARKER, CellStyle::default())?;

                writer.set_text_color(Rgb::BLACK);
                writer.set_font(Font::Helvetica, TOC_FONT_SIZE);
                let label = truncate_to_width(
                    Font::Helvetica,
                    TOC_FONT_SIZE,
                    label_width - 2.0 * self.config.page.cell_padding,
                    &entry.label(),
                );
                writer.cell(label_width, h, &label, CellStyle::default())?;
                writer.cell(
                    0.0,
                    h,
                    &format!("{} {}", self.config.labels.page, entry.page),
                    CellStyle::line().aligned(Align::Right),
                )?;
            }
        }
        writer.set_auto_page_break(true);
        debug!(entries = entries.len(), "Table of contents written");
        Ok(())
    }

    fn document_info(&self, header: &ReportHeader) -> DocumentInfo {
        let subject = [header.customer.trim(), header.site.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" - ");
        DocumentInfo {
            title: self.config.labels.title.clone(),
            author: header.inspector.clone(),
            subject,
            creation_date: header.inspection_date,
        }
    }
}

struct Layout {
    writer: PageWriter,
    toc: Vec<TocEntry>,
    sections: Vec<SectionPlacement>,
    skipped: Vec<RenderError>,
}

/// Bold label column followed by the value
fn field_row(writer: &mut PageWriter, label: &str, value: &str) -> Result<(), RenderError> {
    writer.set_font(Font::HelveticaBold, 11.0);
    writer.cell(FIELD_LABEL_WIDTH, 7.0, &format!("{}:", label), CellStyle::default())?;
    writer.set_font(Font::Helvetica, 11.0);
    writer.cell(0.0, 7.0, value, CellStyle::line())
}
