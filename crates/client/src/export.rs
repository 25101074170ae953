//! Report export.
//!
//! Rendering is split in two passes: the engine lays out the table first,
//! and only then, with the page count known, every page gets its footer.
//! Engines work in points with the origin at the top-left of the page.

use std::path::{Path, PathBuf};

use stockview_inventory::InventoryReport;

const MARGIN: f32 = 40.0;
const TITLE_GAP: f32 = 22.0;
const SUMMARY_GAP: f32 = 16.0;
const FOOTER_OFFSET: f32 = 20.0;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render report: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// Minimal page-layout backend.
pub trait PdfEngine {
    fn page_size(&self) -> PageSize;

    /// Heading line drawn at the top of the first page.
    fn place_title(&mut self, text: &str, x: f32, y: f32);

    /// Lay out the table starting at `top` on page one, adding pages as
    /// needed. The header row repeats on every page.
    fn draw_table(&mut self, header: &[String], rows: &[Vec<String>], top: f32);

    fn page_count(&self) -> usize;

    /// Place one line of body text on a 1-based page.
    fn place_text(&mut self, page: usize, text: &str, x: f32, y: f32, align: TextAlign);

    fn save(&mut self, path: &Path) -> Result<(), ExportError>;
}

/// Render `report` through `engine` into `dir`, returning the written path.
pub fn export_report(
    engine: &mut dyn PdfEngine,
    report: &InventoryReport,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let size = engine.page_size();

    let title_y = MARGIN;
    let summary_y = title_y + TITLE_GAP;
    let table_top = summary_y + SUMMARY_GAP;

    engine.place_title(&report.title, MARGIN, title_y);
    engine.draw_table(&report.header, &report.rows, table_top);
    engine.place_text(1, &report.summary_line(), MARGIN, summary_y, TextAlign::Left);

    let pages = engine.page_count();
    let footer_y = size.height - FOOTER_OFFSET;
    for stamp in report.footers(pages) {
        engine.place_text(stamp.page, &stamp.left, MARGIN, footer_y, TextAlign::Left);
        engine.place_text(
            stamp.page,
            &stamp.right,
            size.width - MARGIN,
            footer_y,
            TextAlign::Right,
        );
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(report.file_name());
    engine.save(&path)?;

    tracing::info!(path = %path.display(), pages, rows = report.rows.len(), "report exported");
    Ok(path)
}
