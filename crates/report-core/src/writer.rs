//! Cursor-based page writer
//!
//! Coordinates are millimetres from the top-left corner of the page. The
//! writer keeps a current page, a cursor and the active font and colors, and
//! appends self-contained operation groups to the selected page in the arena.
//! Any existing page can be selected again, which is how the table of
//! contents gets its page numbers after the detail pages exist.

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use crate::arena::{ImageId, PageArena, PageContent};
use crate::config::PageConfig;
use crate::error::RenderError;
use crate::photo::PdfImage;
use crate::style::Rgb;
use crate::text::{encode_win_ansi, string_width, wrap_text, Font, PT_PER_MM};

/// Stroke width for rules, matching the usual 0.2mm default
const LINE_WIDTH: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Options for [`PageWriter::cell`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    /// Paint the cell background with the fill color
    pub fill: bool,
    pub align: Align,
    /// Move to the start of the next line afterwards instead of to the right
    pub ln: bool,
}

impl CellStyle {
    pub fn line() -> Self {
        Self {
            ln: true,
            ..Self::default()
        }
    }

    pub fn filled(mut self) -> Self {
        self.fill = true;
        self
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

pub struct PageWriter {
    arena: PageArena,
    page: PageConfig,
    current: u32,
    x: f64,
    y: f64,
    font: Font,
    font_size: f64,
    fill_color: Rgb,
    text_color: Rgb,
    auto_page_break: bool,
}

impl PageWriter {
    pub fn new(page: &PageConfig) -> Self {
        Self {
            arena: PageArena::new(),
            page: page.clone(),
            current: 0,
            x: page.margin,
            y: page.margin,
            font: Font::Helvetica,
            font_size: 12.0,
            fill_color: Rgb::WHITE,
            text_color: Rgb::BLACK,
            auto_page_break: true,
        }
    }

    /// Append a page, make it current and return its number
    pub fn add_page(&mut self) -> u32 {
        self.current = self.arena.add_page();
        self.x = self.page.margin;
        self.y = self.page.margin;
        self.current
    }

    /// Make an existing page current, with the cursor at its top-left margin
    pub fn select_page(&mut self, number: u32) -> Result<(), RenderError> {
        if self.arena.page(number).is_none() {
            return Err(RenderError::PageOutOfRange(number));
        }
        self.current = number;
        self.x = self.page.margin;
        self.y = self.page.margin;
        Ok(())
    }

    /// Current page number, 0 before the first page
    pub fn page_number(&self) -> u32 {
        self.current
    }

    pub fn page_count(&self) -> u32 {
        self.arena.len() as u32
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Move the cursor to `y`, back at the left margin
    pub fn set_y(&mut self, y: f64) {
        self.x = self.page.margin;
        self.y = y;
    }

    pub fn set_font(&mut self, font: Font, size: f64) {
        self.font = font;
        self.font_size = size;
    }

    pub fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    pub fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    pub fn set_auto_page_break(&mut self, enabled: bool) {
        self.auto_page_break = enabled;
    }

    /// Y position at which automatic page breaks happen
    pub fn break_trigger(&self) -> f64 {
        self.page.break_trigger()
    }

    /// Width of `text` in the current font
    pub fn string_width(&self, text: &str) -> f64 {
        string_width(self.font, self.font_size, text)
    }

    /// Draw a single-line cell at the cursor
    ///
    /// A width of 0 extends the cell to the right margin.
    pub fn cell(&mut self, w: f64, h: f64, text: &str, style: CellStyle) -> Result<(), RenderError> {
        if self.auto_page_break && self.current > 0 && self.y + h > self.break_trigger() {
            let x = self.x;
            self.add_page();
            self.x = x;
        }
        let w = if w == 0.0 {
            self.page.width - self.page.margin - self.x
        } else {
            w
        };

        let mut ops = Vec::new();
        if style.fill {
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new("rg", self.fill_color.operands()));
            ops.push(Operation::new(
                "re",
                vec![
                    self.pt(self.x),
                    self.pt(self.page.height - self.y),
                    self.pt(w),
                    self.pt(-h),
                ],
            ));
            ops.push(Operation::new("f", vec![]));
            ops.push(Operation::new("Q", vec![]));
        }
        if !text.is_empty() {
            let padding = self.page.cell_padding;
            let dx = match style.align {
                Align::Left => padding,
                Align::Center => (w - self.string_width(text)) / 2.0,
                Align::Right => w - padding - self.string_width(text),
            };
            let font_size_mm = self.font_size / PT_PER_MM;
            let baseline = self.y + 0.5 * h + 0.3 * font_size_mm;
            ops.extend(self.text_ops(self.x + dx, baseline, text));
        }
        self.current_page()?.extend(ops);

        if style.ln {
            self.x = self.page.margin;
            self.y += h;
        } else {
            self.x += w;
        }
        Ok(())
    }

    /// Draw word-wrapped text as a stack of `h`-high lines
    ///
    /// Embedded newlines are hard breaks. The cursor ends at the left margin
    /// below the last line.
    pub fn multi_cell(&mut self, w: f64, h: f64, text: &str) -> Result<(), RenderError> {
        let left = self.x;
        let w = if w == 0.0 {
            self.page.width - self.page.margin - left
        } else {
            w
        };
        let lines = wrap_text(
            self.font,
            self.font_size,
            w - 2.0 * self.page.cell_padding,
            text,
        );
        for line in lines {
            self.x = left;
            self.cell(w, h, &line, CellStyle::line())?;
        }
        self.x = self.page.margin;
        Ok(())
    }

    /// Line break of height `h`
    pub fn ln(&mut self, h: f64) {
        self.x = self.page.margin;
        self.y += h;
    }

    /// Stroke a black rule between two points
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), RenderError> {
        let ops = vec![
            Operation::new("q", vec![]),
            Operation::new("w", vec![self.pt(LINE_WIDTH)]),
            Operation::new("RG", Rgb::BLACK.operands()),
            Operation::new("m", vec![self.pt(x1), self.pt(self.page.height - y1)]),
            Operation::new("l", vec![self.pt(x2), self.pt(self.page.height - y2)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ];
        self.current_page()?.extend(ops);
        Ok(())
    }

    pub fn register_image(&mut self, image: PdfImage) -> ImageId {
        self.arena.add_image(image)
    }

    /// Place an image with its top-left corner at (`x`, `y`), scaled to width
    /// `w`; returns the drawn height. The cursor does not move.
    pub fn image(&mut self, id: ImageId, x: f64, y: f64, w: f64) -> Result<f64, RenderError> {
        let h = self
            .arena
            .image(id)
            .map(|image| image.scaled_height(w))
            .ok_or_else(|| RenderError::DocumentError(format!("unregistered image {}", id.resource_name())))?;
        let ops = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    self.pt(w),
                    Object::Integer(0),
                    Object::Integer(0),
                    self.pt(h),
                    self.pt(x),
                    self.pt(self.page.height - y - h),
                ],
            ),
            Operation::new("Do", vec![Object::Name(id.resource_name().into_bytes())]),
            Operation::new("Q", vec![]),
        ];
        let page = self.current_page()?;
        page.extend(ops);
        page.use_image(id);
        Ok(h)
    }

    /// Hand over the finished pages
    pub fn finish(self) -> PageArena {
        self.arena
    }

    fn current_page(&mut self) -> Result<&mut PageContent, RenderError> {
        self.arena.page_mut(self.current)
    }

    fn text_ops(&self, x: f64, baseline: f64, text: &str) -> Vec<Operation> {
        vec![
            Operation::new("q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(self.font.resource_name().as_bytes().to_vec()),
                    Object::Real(self.font_size as f32),
                ],
            ),
            Operation::new("rg", self.text_color.operands()),
            Operation::new("Td", vec![self.pt(x), self.pt(self.page.height - baseline)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]
    }

    fn pt(&self, mm: f64) -> Object {
        Object::Real((mm * PT_PER_MM) as f32)
    }
}
