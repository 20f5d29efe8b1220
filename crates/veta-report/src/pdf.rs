//! # PDF Renderer
//!
//! Typesets a [`Report`] on A4 pages with printpdf.
//!
//! ## Page Layout
//! ```text
//! ┌──────────────────────────────────────────────┐  ▲
//! │ Reporte de Salidas - 2024-02-05      ┌─────┐ │  │ margin
//! │ Registros: 42                        │ QR  │ │
//! │                                      └─────┘ │
//! │ Código  Material  Producto  Nivel  ...       │ ◄── blue headers
//! │ ──────────────────────────────────────────── │ ◄── rule
//! │ COB-0003 Cobre    Cable     900    ...       │
//! │ COB-0001 Cobre    Cable     900    ...       │
//! │ ............................................ │ ◄── level changes
//! │ ZIN-0002 Zinc     Lámina    1200   ...       │
//! │                                  Página 1/2  │
//! └──────────────────────────────────────────────┘
//! ```
//! Following pages repeat the column headers but not the title or QR.
//!
//! Layout is computed first ([`plan_pages`]) and drawn afterwards, so
//! pagination can be checked without parsing PDF output.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect, Rgb,
};
use tracing::debug;

use veta_core::{Column, Report, TableRow};

use crate::error::{RenderError, RenderResult};
use crate::qr::QrMatrix;
use crate::summary::{qr_payload, QR_MAX_BYTES};

// =============================================================================
// Layout
// =============================================================================

/// Page geometry and typography, in millimetres and points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub title_size: f32,
    pub header_size: f32,
    pub row_size: f32,
    pub row_height: f32,
    pub qr_size: f32,
    /// Byte budget of the QR summary.
    pub qr_max_bytes: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        PageLayout {
            page_width: 210.0,
            page_height: 297.0,
            margin: 14.0,
            title_size: 16.0,
            header_size: 10.0,
            row_size: 8.5,
            row_height: 6.0,
            qr_size: 38.0,
            qr_max_bytes: QR_MAX_BYTES,
        }
    }
}

impl PageLayout {
    fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Baseline of the header row on the first page, below title and QR.
    fn first_header_y(&self) -> f32 {
        self.top() - self.qr_size - 8.0
    }

    /// Baseline of the header row on continuation pages.
    fn next_header_y(&self) -> f32 {
        self.top() - 6.0
    }

    /// Rows that fit below a header placed at `header_y`.
    fn rows_below(&self, header_y: f32) -> usize {
        let first_row_y = header_y - self.row_height - 1.0;
        let usable = first_row_y - (self.margin + self.row_height);
        ((usable / self.row_height).floor() as usize) + 1
    }
}

/// Rows printed on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    /// Index of the first row on this page.
    pub first_row: usize,
    /// Number of rows on this page.
    pub row_count: usize,
    /// Page-local indices of rows that start a new level.
    pub level_breaks: Vec<usize>,
}

/// Splits `rows` into pages, preserving order and marking level changes.
///
/// The first row of a page is never marked; the header rule already
/// separates it.
pub fn plan_pages(rows: &[&dyn TableRow], layout: &PageLayout) -> Vec<PagePlan> {
    let first_capacity = layout.rows_below(layout.first_header_y()).max(1);
    let next_capacity = layout.rows_below(layout.next_header_y()).max(1);

    let mut pages = Vec::new();
    let mut start = 0;
    while start < rows.len() {
        let capacity = if pages.is_empty() {
            first_capacity
        } else {
            next_capacity
        };
        let count = capacity.min(rows.len() - start);

        let level_breaks = (1..count)
            .filter(|&i| rows[start + i].level() != rows[start + i - 1].level())
            .collect();

        pages.push(PagePlan {
            first_row: start,
            row_count: count,
            level_breaks,
        });
        start += count;
    }

    pages
}

/// Relative width of each column.
fn column_weight(column: Column) -> f32 {
    match column {
        Column::Code => 20.0,
        Column::Material => 26.0,
        Column::Product => 34.0,
        Column::Level => 14.0,
        Column::Quantity => 24.0,
        Column::Unit => 18.0,
        Column::Responsible => 34.0,
        Column::WithdrawnAt => 28.0,
        Column::Total => 24.0,
    }
}

/// Column widths in millimetres, scaled to fill `total`.
fn column_widths(columns: &[Column], total: f32) -> Vec<f32> {
    let sum: f32 = columns.iter().map(|c| column_weight(*c)).sum();
    columns
        .iter()
        .map(|c| column_weight(*c) / sum * total)
        .collect()
}

/// Clips `text` to what fits in `width` mm at `size` pt (Helvetica average).
fn fit(text: &str, width: f32, size: f32) -> String {
    const AVG_CHAR_EM: f32 = 0.52;
    const MM_PER_PT: f32 = 0.3528;

    let max_chars = ((width - 1.5) / (size * AVG_CHAR_EM * MM_PER_PT)).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut clipped: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

// =============================================================================
// Renderer
// =============================================================================

fn blue() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.4, 0.8, None))
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn grey() -> Color {
    Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None))
}

fn pdf_err(e: impl std::fmt::Debug) -> RenderError {
    RenderError::Pdf(format!("{e:?}"))
}

/// Renders reports as PDF documents.
///
/// ## Usage
/// ```rust,ignore
/// let bytes = PdfRenderer::default().render(&report)?;
/// assert!(bytes.starts_with(b"%PDF"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    layout: PageLayout,
}

impl PdfRenderer {
    pub fn new(layout: PageLayout) -> Self {
        PdfRenderer { layout }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Produces the PDF bytes of `report`. Every row is printed, in order.
    pub fn render(&self, report: &Report) -> RenderResult<Vec<u8>> {
        let layout = &self.layout;
        let title = report.title();
        let rows = report.rows().table_rows();
        let columns = report.columns();
        let widths = column_widths(columns, layout.content_width());
        let pages = plan_pages(&rows, layout);

        let qr = QrMatrix::encode(&qr_payload(report, layout.qr_max_bytes))?;

        let (doc, first_page, first_layer) = PdfDocument::new(
            title.as_str(),
            Mm(layout.page_width),
            Mm(layout.page_height),
            "Tabla",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;

        let page_total = pages.len();
        for (index, plan) in pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) =
                    doc.add_page(Mm(layout.page_width), Mm(layout.page_height), "Tabla");
                doc.get_page(page).get_layer(layer)
            };

            let header_y = if index == 0 {
                self.draw_title(&layer, &bold, &regular, &title, rows.len());
                self.draw_qr(&layer, &qr);
                layout.first_header_y()
            } else {
                layout.next_header_y()
            };

            self.draw_header(&layer, &bold, columns, &widths, header_y);

            let mut y = header_y - layout.row_height - 1.0;
            for local in 0..plan.row_count {
                if plan.level_breaks.contains(&local) {
                    self.draw_rule(&layer, y + layout.row_height - 1.5, 0.3, grey());
                }
                let row = rows[plan.first_row + local];
                self.draw_row(&layer, &regular, row, columns, &widths, y);
                y -= layout.row_height;
            }

            layer.set_fill_color(grey());
            layer.use_text(
                format!("Página {}/{}", index + 1, page_total),
                7.0,
                Mm(layout.page_width - layout.margin - 20.0),
                Mm(layout.margin - 6.0),
                &regular,
            );
        }

        let bytes = doc.save_to_bytes().map_err(pdf_err)?;

        debug!(
            title = %title,
            rows = rows.len(),
            pages = page_total,
            bytes = bytes.len(),
            "Rendered PDF report"
        );
        Ok(bytes)
    }

    fn draw_title(
        &self,
        layer: &PdfLayerReference,
        bold: &IndirectFontRef,
        regular: &IndirectFontRef,
        title: &str,
        row_count: usize,
    ) {
        let layout = &self.layout;
        let text_width = layout.content_width() - layout.qr_size - 4.0;

        layer.set_fill_color(black());
        layer.use_text(
            fit(title, text_width, layout.title_size),
            layout.title_size,
            Mm(layout.margin),
            Mm(layout.top() - 8.0),
            bold,
        );
        layer.use_text(
            format!("Registros: {}", row_count),
            layout.header_size,
            Mm(layout.margin),
            Mm(layout.top() - 16.0),
            regular,
        );
    }

    fn draw_qr(&self, layer: &PdfLayerReference, qr: &QrMatrix) {
        let layout = &self.layout;
        let module = layout.qr_size / qr.width() as f32;
        let left = layout.page_width - layout.margin - layout.qr_size;
        let top = layout.top();

        layer.set_fill_color(black());
        for (x, y) in qr.dark_modules() {
            let llx = left + x as f32 * module;
            let ury = top - y as f32 * module;
            layer.add_rect(Rect::new(
                Mm(llx),
                Mm(ury - module),
                Mm(llx + module),
                Mm(ury),
            ));
        }
    }

    fn draw_header(
        &self,
        layer: &PdfLayerReference,
        bold: &IndirectFontRef,
        columns: &[Column],
        widths: &[f32],
        y: f32,
    ) {
        let layout = &self.layout;

        layer.set_fill_color(blue());
        let mut x = layout.margin;
        for (column, width) in columns.iter().zip(widths) {
            layer.use_text(
                fit(column.label(), *width, layout.header_size),
                layout.header_size,
                Mm(x),
                Mm(y),
                bold,
            );
            x += width;
        }

        self.draw_rule(layer, y - 2.0, 0.6, blue());
    }

    fn draw_row(
        &self,
        layer: &PdfLayerReference,
        regular: &IndirectFontRef,
        row: &dyn TableRow,
        columns: &[Column],
        widths: &[f32],
        y: f32,
    ) {
        let layout = &self.layout;

        layer.set_fill_color(black());
        let mut x = layout.margin;
        for (column, width) in columns.iter().zip(widths) {
            layer.use_text(
                fit(&row.cell(*column), *width, layout.row_size),
                layout.row_size,
                Mm(x),
                Mm(y),
                regular,
            );
            x += width;
        }
    }

    fn draw_rule(&self, layer: &PdfLayerReference, y: f32, thickness: f32, color: Color) {
        let layout = &self.layout;

        layer.set_outline_color(color);
        layer.set_outline_thickness(thickness);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(layout.margin), Mm(y)), false),
                (Point::new(Mm(layout.page_width - layout.margin), Mm(y)), false),
            ],
            is_closed: false,
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
