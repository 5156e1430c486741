//! Tabular back-end: plain A4 PDF via `printpdf` built-in fonts.
//!
//! Metric table, suggestions and both summaries as text. No charts.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::{RenderError, RenderedDocument, ReportRenderer, ReportView};
use crate::models::GuidanceBundle;

const RENDERER_NAME: &str = "tabular-pdf";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM_MARGIN: f32 = 20.0;
const LEFT: f32 = 20.0;
const INDENT: f32 = 25.0;
const WRAP_CHARS: usize = 90;

/// Column widths (characters) of the Courier metric table.
const COLUMNS: [usize; 4] = [18, 20, 26, 8];

#[derive(Debug, Default, Clone, Copy)]
pub struct TabularPdfRenderer;

impl TabularPdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for TabularPdfRenderer {
    fn name(&self) -> &'static str {
        RENDERER_NAME
    }

    fn render(&self, view: &ReportView) -> Result<RenderedDocument, RenderError> {
        Ok(RenderedDocument {
            bytes: generate_report_pdf(view)?,
            content_type: PDF_CONTENT_TYPE,
            extension: "pdf",
            renderer: RENDERER_NAME,
        })
    }
}

// ---------------------------------------------------------------------------
// Page cursor
// ---------------------------------------------------------------------------

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
}

/// Writes lines top to bottom, starting a new page at the bottom margin.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
}

impl<'a> Cursor<'a> {
    fn new(doc: &'a PdfDocumentReference, layer: PdfLayerReference) -> Self {
        Self {
            doc,
            layer,
            y: Mm(TOP),
        }
    }

    fn line(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef, advance: f32) {
        if self.y.0 < BOTTOM_MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = Mm(TOP);
        }
        self.layer.use_text(pdf_text(text), size, Mm(x), self.y, font);
        self.y -= Mm(advance);
    }

    fn wrapped(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef, advance: f32) {
        for line in wrap_text(text, WRAP_CHARS) {
            self.line(&line, size, x, font, advance);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= Mm(mm);
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

pub fn generate_report_pdf(view: &ReportView) -> Result<Vec<u8>, RenderError> {
    let (doc, page1, layer1) =
        PdfDocument::new("Health Report Summary", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: builtin_font(&doc, BuiltinFont::Helvetica)?,
        bold: builtin_font(&doc, BuiltinFont::HelveticaBold)?,
        mono: builtin_font(&doc, BuiltinFont::Courier)?,
    };
    let layer = doc.get_page(page1).get_layer(layer1);
    let mut cursor = Cursor::new(&doc, layer);

    cursor.line("Health Report Summary", 16.0, LEFT, &fonts.bold, 10.0);

    // Metrics
    cursor.line("HEALTH METRICS", 11.0, LEFT, &fonts.bold, 6.0);
    cursor.line(
        &table_row(["Metric", "Value", "Normal Range", "Status"]),
        8.0,
        LEFT,
        &fonts.mono,
        4.5,
    );
    for card in &view.cards {
        let row = table_row([
            card.name.as_str(),
            &value_with_unit(card.value, &card.band.unit),
            &card.band.display_range(),
            card.status.label(),
        ]);
        cursor.line(&row, 8.0, LEFT, &fonts.mono, 4.0);
    }
    cursor.gap(6.0);

    // Suggestions
    cursor.line("SUGGESTIONS", 11.0, LEFT, &fonts.bold, 6.0);
    if view.guidance.is_empty() {
        cursor.line("No specific suggestions. Everything in range.", 9.0, INDENT, &fonts.regular, 4.5);
    }
    for (metric, bundle) in &view.guidance {
        suggestion_block(&mut cursor, &fonts, metric, bundle);
    }
    cursor.gap(4.0);

    // Summaries
    for (heading, text) in [
        ("DOCTOR SUMMARY", &view.doctor_summary),
        ("PATIENT SUMMARY", &view.patient_summary),
    ] {
        cursor.line(heading, 11.0, LEFT, &fonts.bold, 6.0);
        for paragraph in text.lines() {
            cursor.wrapped(paragraph, 9.0, INDENT, &fonts.regular, 4.5);
        }
        cursor.gap(4.0);
    }

    drop(cursor);
    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| RenderError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| RenderError::Pdf(format!("buffer error: {e}")))
}

fn builtin_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, RenderError> {
    doc.add_builtin_font(font)
        .map_err(|e| RenderError::Pdf(format!("font error: {e}")))
}

fn suggestion_block(cursor: &mut Cursor<'_>, fonts: &Fonts, metric: &str, bundle: &GuidanceBundle) {
    cursor.line(
        &format!("{metric} ({})", bundle.status.label()),
        10.0,
        LEFT,
        &fonts.bold,
        5.0,
    );
    cursor.line("At home", 9.0, INDENT, &fonts.bold, 4.5);
    for item in &bundle.home {
        cursor.wrapped(&format!("- {item}"), 9.0, INDENT, &fonts.regular, 4.5);
    }
    cursor.line("Medication / clinical", 9.0, INDENT, &fonts.bold, 4.5);
    for item in &bundle.meds {
        cursor.wrapped(&format!("- {item}"), 9.0, INDENT, &fonts.regular, 4.5);
    }
    cursor.wrapped(&bundle.note, 8.0, INDENT, &fonts.regular, 4.0);
    cursor.gap(3.0);
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

fn value_with_unit(value: f64, unit: &str) -> String {
    format!("{value} {unit}").trim().to_string()
}

/// Fixed-width row; overlong cells are cut so columns stay aligned.
fn table_row(cells: [&str; 4]) -> String {
    cells
        .iter()
        .zip(COLUMNS)
        .map(|(cell, width)| {
            let cut: String = cell.chars().take(width - 1).collect();
            format!("{cut:<width$}")
        })
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Built-in PDF fonts cover Latin-1 only; map common symbols and replace
/// the rest.
fn pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '–' | '—' => out.push('-'),
            '≥' => out.push_str(">="),
            '≤' => out.push_str("<="),
            '•' => out.push('-'),
            c if (c as u32) < 0x100 => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
