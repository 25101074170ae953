//! `lopdf`-backed report engine.
//!
//! Pages are kept as operation lists until `save`, so text can still be
//! added to any page after the table has been laid out.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use crate::export::{ExportError, PageSize, PdfEngine, TextAlign};

/// A4 portrait, in points.
pub const A4: PageSize = PageSize {
    width: 595.0,
    height: 842.0,
};

const MARGIN: f32 = 40.0;
const BOTTOM_RESERVE: f32 = 60.0;
const ROW_HEIGHT: f32 = 14.0;
const CELL_PADDING: f32 = 2.0;
const TABLE_FONT_SIZE: f32 = 8.0;
const TEXT_FONT_SIZE: f32 = 9.0;
const TITLE_FONT_SIZE: f32 = 16.0;
// Helvetica averages roughly half an em per glyph.
const AVG_GLYPH_WIDTH: f32 = 0.5;
const ELLIPSIS: &str = "...";

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

#[derive(Debug, Clone)]
pub struct LopdfEngine {
    size: PageSize,
    pages: Vec<Vec<Operation>>,
}

impl Default for LopdfEngine {
    fn default() -> Self {
        Self::new(A4)
    }
}

impl LopdfEngine {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: vec![Vec::new()],
        }
    }

    fn page_mut(&mut self, page: usize) -> Option<&mut Vec<Operation>> {
        page.checked_sub(1).and_then(|idx| self.pages.get_mut(idx))
    }

    fn push_text(&mut self, page: usize, font: &str, size: f32, x: f32, y: f32, text: &str) {
        let pdf_y = self.size.height - y;
        match self.page_mut(page) {
            Some(ops) => ops.extend(text_ops(font, size, x, pdf_y, text)),
            None => tracing::warn!(page, "text placed on a page that does not exist"),
        }
    }

    fn draw_row(&mut self, cells: &[String], top: f32, col_width: f32, header: bool) {
        let page = self.pages.len();
        let baseline = top + ROW_HEIGHT - 4.0;

        if header {
            let pdf_top = self.size.height - top - ROW_HEIGHT;
            let width = col_width * cells.len() as f32;
            if let Some(ops) = self.page_mut(page) {
                ops.extend([
                    Operation::new("q", vec![]),
                    Operation::new("rg", vec![0.85f32.into(), 0.85f32.into(), 0.85f32.into()]),
                    Operation::new(
                        "re",
                        vec![MARGIN.into(), pdf_top.into(), width.into(), ROW_HEIGHT.into()],
                    ),
                    Operation::new("f", vec![]),
                    Operation::new("Q", vec![]),
                ]);
            }
        }

        let font = if header { BOLD } else { REGULAR };
        for (col, cell) in cells.iter().enumerate() {
            let x = MARGIN + col as f32 * col_width + CELL_PADDING;
            let text = fit(cell, col_width - 2.0 * CELL_PADDING, TABLE_FONT_SIZE);
            self.push_text(page, font, TABLE_FONT_SIZE, x, baseline, &text);
        }
    }

    fn build_document(&self) -> Result<Document, ExportError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR => regular_id,
                BOLD => bold_id,
            },
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in &self.pages {
            let content = Content {
                operations: operations.clone(),
            };
            let bytes = content
                .encode()
                .map_err(|e| ExportError::Pdf(format!("failed to encode page content: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, bytes));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), self.size.width.into(), self.size.height.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        Ok(doc)
    }
}

impl PdfEngine for LopdfEngine {
    fn page_size(&self) -> PageSize {
        self.size
    }

    fn place_title(&mut self, text: &str, x: f32, y: f32) {
        self.push_text(1, BOLD, TITLE_FONT_SIZE, x, y + TITLE_FONT_SIZE, text);
    }

    fn draw_table(&mut self, header: &[String], rows: &[Vec<String>], top: f32) {
        let columns = header.len().max(1);
        let col_width = (self.size.width - 2.0 * MARGIN) / columns as f32;
        let bottom = self.size.height - BOTTOM_RESERVE;

        let mut y = top;
        self.draw_row(header, y, col_width, true);
        y += ROW_HEIGHT;

        for row in rows {
            if y + ROW_HEIGHT > bottom {
                self.pages.push(Vec::new());
                y = MARGIN;
                self.draw_row(header, y, col_width, true);
                y += ROW_HEIGHT;
            }
            self.draw_row(row, y, col_width, false);
            y += ROW_HEIGHT;
        }

        tracing::debug!(rows = rows.len(), pages = self.pages.len(), "table laid out");
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn place_text(&mut self, page: usize, text: &str, x: f32, y: f32, align: TextAlign) {
        let x = match align {
            TextAlign::Left => x,
            TextAlign::Right => x - text_width(text, TEXT_FONT_SIZE),
        };
        self.push_text(page, REGULAR, TEXT_FONT_SIZE, x, y, text);
    }

    fn save(&mut self, path: &Path) -> Result<(), ExportError> {
        let mut doc = self.build_document()?;
        doc.save(path)?;
        Ok(())
    }
}

fn text_ops(font: &str, size: f32, x: f32, y: f32, text: &str) -> [Operation; 5] {
    [
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH
}

/// Shorten `text` with a trailing ellipsis until it fits `width`. Cells too
/// narrow for the ellipsis are cut without one.
fn fit(text: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * AVG_GLYPH_WIDTH)).floor() as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Encode for the standard fonts' WinAnsi table. Unmappable characters
/// become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}
