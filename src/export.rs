//! Summary to single-page PDF export.
//!
//! A summary is first laid out onto a fixed-width canvas measured in device
//! pixels at [`RENDER_SCALE`], then the whole canvas becomes one PDF page whose
//! size is the canvas scaled back down. Long summaries make a taller page;
//! nothing is ever split across pages.

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use ttf_parser::{Face, GlyphId};
use unicode_bidi::BidiInfo;

use crate::fonts::{FontFace, FontSet};
use crate::summary::{EMPTY_VALUE, SummaryDocument};

pub const CANVAS_WIDTH: f32 = 800.0;
pub const RENDER_SCALE: f32 = 2.0;

const MARGIN: f32 = 48.0;
const TITLE_SIZE: f32 = 22.0;
const SUBTITLE_SIZE: f32 = 11.0;
const SECTION_SIZE: f32 = 15.0;
const LABEL_SIZE: f32 = 9.0;
const VALUE_SIZE: f32 = 11.0;
const LINE_GAP: f32 = 1.4;
// Helvetica averages a little over half an em per glyph.
const GLYPH_WIDTH_EM: f32 = 0.55;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: the summary has no sections")]
    EmptyDocument,
    #[error("PDF encoding failed: {0}")]
    Encode(String),
    #[error("export task failed: {0}")]
    Task(String),
    #[error("font unavailable: {0}")]
    Font(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextStyle {
    Regular,
    Bold,
    Accent,
}

/// One positioned line of text. `y` is the baseline measured from the top of
/// the canvas, in canvas units (device pixels divided by the scale).
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasLine {
    pub text: String,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub style: TextStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    pub width_px: u32,
    pub height_px: u32,
    pub scale: f32,
    pub lines: Vec<CanvasLine>,
}

impl Canvas {
    pub fn page_size(&self) -> (f32, f32) {
        (
            self.width_px as f32 / self.scale,
            self.height_px as f32 / self.scale,
        )
    }
}

fn wrap(text: &str, size: f32, width: f32) -> Vec<String> {
    let max_chars = ((width / (size * GLYPH_WIDTH_EM)) as usize).max(8);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            while current.chars().count() > max_chars {
                let head: String = current.chars().take(max_chars).collect();
                current = current.chars().skip(max_chars).collect();
                lines.push(head);
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn push(lines: &mut Vec<CanvasLine>, y: &mut f32, text: String, size: f32, x: f32, style: TextStyle) {
    *y += size * LINE_GAP;
    lines.push(CanvasLine { text, size, x, y: *y, style });
}

/// Lay a summary out on the fixed-width canvas and size the canvas to fit.
pub fn layout(document: &SummaryDocument) -> Result<Canvas, ExportError> {
    if document.sections.is_empty() {
        return Err(ExportError::EmptyDocument);
    }

    let text_width = CANVAS_WIDTH - 2.0 * MARGIN;
    let mut lines = Vec::new();
    let mut y = MARGIN;

    for line in wrap(&document.title, TITLE_SIZE, text_width) {
        push(&mut lines, &mut y, line, TITLE_SIZE, MARGIN, TextStyle::Bold);
    }
    if let Some(subtitle) = &document.subtitle {
        for line in wrap(subtitle, SUBTITLE_SIZE, text_width) {
            push(&mut lines, &mut y, line, SUBTITLE_SIZE, MARGIN, TextStyle::Regular);
        }
    }

    for section in &document.sections {
        y += SECTION_SIZE;
        push(&mut lines, &mut y, section.title.to_string(), SECTION_SIZE, MARGIN, TextStyle::Accent);
        for entry in &section.items {
            y += 4.0;
            push(
                &mut lines,
                &mut y,
                entry.label.to_uppercase(),
                LABEL_SIZE,
                MARGIN + 12.0,
                TextStyle::Accent,
            );
            let value = if entry.value.is_empty() { EMPTY_VALUE } else { &entry.value };
            for line in wrap(value, VALUE_SIZE, text_width - 12.0) {
                push(&mut lines, &mut y, line, VALUE_SIZE, MARGIN + 12.0, TextStyle::Regular);
            }
        }
    }
    y += MARGIN;

    Ok(Canvas {
        width_px: (CANVAS_WIDTH * RENDER_SCALE).round() as u32,
        height_px: (y * RENDER_SCALE).ceil() as u32,
        scale: RENDER_SCALE,
        lines,
    })
}

/// Turns a laid-out canvas into file bytes.
pub trait DocumentEncoder: Send + Sync {
    fn encode(&self, canvas: &Canvas) -> Result<Vec<u8>, ExportError>;
}

/// Single-page PDF. Text is drawn with embedded TrueType faces when a
/// [`FontSet`] is present and with WinAnsi-encoded Helvetica otherwise.
#[derive(Clone, Debug, Default)]
pub struct PdfEncoder {
    fonts: Option<Arc<FontSet>>,
}

impl PdfEncoder {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn embedding(fonts: FontSet) -> Self {
        Self {
            fonts: Some(Arc::new(fonts)),
        }
    }
}

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");
const INK: (f32, f32, f32) = (0.06, 0.09, 0.16);
const ACCENT: (f32, f32, f32) = (0.02, 0.71, 0.83);
const IDENTITY: SystemInfo<'static> = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

/// Windows-1252 code for `c`, the byte `WinAnsiEncoding` maps back to it.
fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    if (0x20..=0x7e).contains(&code) || (0xa0..=0xff).contains(&code) {
        return Some(code as u8);
    }
    let byte = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    };
    Some(byte)
}

// Helvetica has nothing outside Windows-1252; those characters become '?'.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect()
}

/// Display order of one laid-out line: right-to-left runs are reversed.
fn visual_order(text: &str) -> String {
    let bidi = BidiInfo::new(text, None);
    bidi.paragraphs
        .iter()
        .map(|para| bidi.reorder_line(para, para.range.clone()))
        .collect()
}

/// Two-byte glyph ids for an `Identity-H` font, recording which character
/// each glyph stands for.
fn glyph_run(face: &Face<'_>, text: &str, used: &mut BTreeMap<u16, char>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for c in visual_order(text).chars() {
        let gid = face.glyph_index(c).map(|g| g.0).unwrap_or(0);
        used.entry(gid).or_insert(c);
        out.extend_from_slice(&gid.to_be_bytes());
    }
    out
}

fn draw(
    canvas: &Canvas,
    page_height: f32,
    mut encode_line: impl FnMut(&CanvasLine) -> (Name<'static>, Vec<u8>),
) -> Content {
    let mut content = Content::new();
    for line in &canvas.lines {
        let rgb = if line.style == TextStyle::Accent { ACCENT } else { INK };
        let (font, text) = encode_line(line);
        content.set_fill_rgb(rgb.0, rgb.1, rgb.2);
        content.begin_text();
        content.set_font(font, line.size);
        content.next_line(line.x, page_height - line.y);
        content.show(Str(&text));
        content.end_text();
    }
    content
}

/// Type0 font with an embedded TrueType program and a ToUnicode map, so the
/// text stays searchable and copyable.
fn write_embedded_font(
    pdf: &mut Pdf,
    font_id: Ref,
    next_id: &mut i32,
    font: &FontFace,
    face: &Face<'_>,
    used: &BTreeMap<u16, char>,
) {
    let mut alloc = || {
        let id = Ref::new(*next_id);
        *next_id += 1;
        id
    };
    let cid_id = alloc();
    let descriptor_id = alloc();
    let cmap_id = alloc();
    let file_id = alloc();

    let base_font = Name(font.name().as_bytes());
    let units = f32::from(face.units_per_em());
    let scale = |value: i16| f32::from(value) * 1000.0 / units;

    pdf.type0_font(font_id)
        .base_font(base_font)
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_id)
        .to_unicode(cmap_id);

    let mut cid = pdf.cid_font(cid_id);
    cid.subtype(CidFontType::Type2);
    cid.base_font(base_font);
    cid.system_info(IDENTITY);
    cid.font_descriptor(descriptor_id);
    cid.default_width(0.0);
    cid.cid_to_gid_map_predefined(Name(b"Identity"));
    {
        let mut widths = cid.widths();
        for gid in used.keys() {
            let advance = face.glyph_hor_advance(GlyphId(*gid)).unwrap_or(0);
            widths.consecutive(*gid, [f32::from(advance) * 1000.0 / units]);
        }
    }
    cid.finish();

    let bbox = face.global_bounding_box();
    pdf.font_descriptor(descriptor_id)
        .name(base_font)
        .flags(FontFlags::SYMBOLIC)
        .bbox(Rect::new(
            scale(bbox.x_min),
            scale(bbox.y_min),
            scale(bbox.x_max),
            scale(bbox.y_max),
        ))
        .italic_angle(0.0)
        .ascent(scale(face.ascender()))
        .descent(scale(face.descender()))
        .cap_height(scale(face.capital_height().unwrap_or(face.ascender())))
        .stem_v(80.0)
        .font_file2(file_id);

    let mut cmap = UnicodeCmap::new(Name(b"Custom"), IDENTITY);
    for (gid, c) in used {
        cmap.pair(*gid, *c);
    }
    pdf.cmap(cmap_id, &cmap.finish());

    pdf.stream(file_id, font.data())
        .pair(Name(b"Length1"), font.data().len() as i32);
}

impl DocumentEncoder for PdfEncoder {
    fn encode(&self, canvas: &Canvas) -> Result<Vec<u8>, ExportError> {
        let (page_width, page_height) = canvas.page_size();
        if !(page_width > 0.0 && page_height > 0.0) {
            return Err(ExportError::Encode(format!(
                "invalid page size {page_width}x{page_height}"
            )));
        }

        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let content_id = Ref::new(4);
        let regular_id = Ref::new(5);
        let bold_id = Ref::new(6);
        let mut next_id = 7;

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids([page_id]).count(1);

        let has_bold = match &self.fonts {
            None => {
                let content = draw(canvas, page_height, |line| match line.style {
                    TextStyle::Regular => (REGULAR_FONT, win_ansi(&line.text)),
                    TextStyle::Bold | TextStyle::Accent => (BOLD_FONT, win_ansi(&line.text)),
                });
                pdf.stream(content_id, &content.finish());
                pdf.type1_font(regular_id)
                    .base_font(Name(b"Helvetica"))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                pdf.type1_font(bold_id)
                    .base_font(Name(b"Helvetica-Bold"))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                true
            }
            Some(fonts) => {
                let regular_face = fonts.regular.face()?;
                let bold_face = match &fonts.bold {
                    Some(bold) => Some(bold.face()?),
                    None => None,
                };
                let mut regular_used = BTreeMap::new();
                let mut bold_used = BTreeMap::new();
                let content = draw(canvas, page_height, |line| match (line.style, &bold_face) {
                    (TextStyle::Bold | TextStyle::Accent, Some(face)) => {
                        (BOLD_FONT, glyph_run(face, &line.text, &mut bold_used))
                    }
                    _ => (REGULAR_FONT, glyph_run(&regular_face, &line.text, &mut regular_used)),
                });
                pdf.stream(content_id, &content.finish());

                write_embedded_font(
                    &mut pdf,
                    regular_id,
                    &mut next_id,
                    &fonts.regular,
                    &regular_face,
                    &regular_used,
                );
                if let (Some(bold), Some(face)) = (&fonts.bold, &bold_face) {
                    write_embedded_font(&mut pdf, bold_id, &mut next_id, bold, face, &bold_used);
                }
                bold_face.is_some()
            }
        };

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, page_width, page_height));
        page.parent(page_tree_id);
        page.contents(content_id);
        {
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(REGULAR_FONT, regular_id);
            if has_bold {
                fonts.pair(BOLD_FONT, bold_id);
            }
        }
        page.finish();

        Ok(pdf.finish())
    }
}

/// Set while an export is running. Only one export may run at a time.
#[derive(Clone, Debug, Default)]
pub struct GeneratingFlag(Arc<AtomicBool>);

impl GeneratingFlag {
    #[cfg(test)]
    pub fn is_generating(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Claim the flag. The returned guard clears it when dropped, whatever
    /// path the export takes.
    pub fn try_begin(&self) -> Option<GeneratingGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| GeneratingGuard(Arc::clone(&self.0)))
    }
}

pub struct GeneratingGuard(Arc<AtomicBool>);

impl Drop for GeneratingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct Exporter {
    encoder: Arc<dyn DocumentEncoder>,
    generating: GeneratingFlag,
}

impl Exporter {
    pub fn new(encoder: Arc<dyn DocumentEncoder>) -> Self {
        Self {
            encoder,
            generating: GeneratingFlag::default(),
        }
    }

    /// PDF export with the standard Helvetica faces.
    pub fn pdf() -> Self {
        Self::new(Arc::new(PdfEncoder::standard()))
    }

    /// PDF export embedding `fonts`, or the standard faces without them.
    pub fn pdf_with_fonts(fonts: Option<FontSet>) -> Self {
        match fonts {
            Some(fonts) => Self::new(Arc::new(PdfEncoder::embedding(fonts))),
            None => Self::pdf(),
        }
    }

    #[cfg(test)]
    pub fn is_generating(&self) -> bool {
        self.generating.is_generating()
    }

    #[cfg(test)]
    pub fn generating_flag(&self) -> GeneratingFlag {
        self.generating.clone()
    }

    /// Render `document` into a file. Failures are logged and yield `None`;
    /// a call made while another export is in flight is ignored.
    pub async fn export(&self, document: &SummaryDocument, file_name: String) -> Option<ExportedFile> {
        let Some(_generating) = self.generating.try_begin() else {
            tracing::warn!("export already in progress, ignoring trigger");
            return None;
        };

        match self.render(document).await {
            Ok(bytes) => {
                tracing::debug!(file = %file_name, bytes = bytes.len(), "generated PDF");
                Some(ExportedFile { file_name, bytes })
            }
            Err(err) => {
                tracing::error!(error = %err, "error generating PDF");
                None
            }
        }
    }

    async fn render(&self, document: &SummaryDocument) -> Result<Vec<u8>, ExportError> {
        let canvas = layout(document)?;
        let encoder = Arc::clone(&self.encoder);
        tokio::task::spawn_blocking(move || encoder.encode(&canvas))
            .await
            .map_err(|e| ExportError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuestionnaireRecord;

    struct FailingEncoder;

    impl DocumentEncoder for FailingEncoder {
        fn encode(&self, _canvas: &Canvas) -> Result<Vec<u8>, ExportError> {
            Err(ExportError::Encode("forced failure".into()))
        }
    }

    struct PanickingEncoder;

    impl DocumentEncoder for PanickingEncoder {
        fn encode(&self, _canvas: &Canvas) -> Result<Vec<u8>, ExportError> {
            panic!("rasterizer crashed");
        }
    }

    fn acme_summary() -> SummaryDocument {
        SummaryDocument::from_record(&QuestionnaireRecord {
            business_name: "Acme".into(),
            one_line_description: "Widgets".into(),
            ..Default::default()
        })
    }

    #[test]
    fn page_is_canvas_scaled_down() {
        let canvas = layout(&acme_summary()).unwrap();
        assert_eq!(canvas.width_px, 1600);
        let (width, height) = canvas.page_size();
        assert_eq!(width, CANVAS_WIDTH);
        assert!(canvas.lines.iter().all(|l| l.y < height));
    }

    #[test]
    fn longer_answers_make_a_taller_page() {
        let short = layout(&acme_summary()).unwrap();
        let long = layout(&SummaryDocument::from_record(&QuestionnaireRecord {
            vision: "grow ".repeat(400),
            ..Default::default()
        }))
        .unwrap();
        assert!(long.height_px > short.height_px);
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap(&"word ".repeat(100), VALUE_SIZE, 200.0);
        let max = (200.0 / (VALUE_SIZE * GLYPH_WIDTH_EM)) as usize;
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= max));
        assert_eq!(wrap("", VALUE_SIZE, 200.0), vec![String::new()]);
    }

    #[test]
    fn pdf_output_is_a_single_page() {
        let canvas = layout(&acme_summary()).unwrap();
        let bytes = PdfEncoder::standard().encode(&canvas).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Acme)"));
        assert!(text.contains("(Widgets)"));
    }

    fn named(name: &str) -> Canvas {
        layout(&SummaryDocument::from_record(&QuestionnaireRecord {
            business_name: name.into(),
            ..Default::default()
        }))
        .unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn win_ansi_covers_cp1252_marks() {
        assert_eq!(win_ansi("Café"), b"Caf\xe9".to_vec());
        assert_eq!(win_ansi("€ – “ok”"), b"\x80 \x96 \x93ok\x94".to_vec());
        assert_eq!(win_ansi("שלום"), b"????".to_vec());
    }

    #[test]
    fn accented_text_is_declared_win_ansi() {
        let bytes = PdfEncoder::standard().encode(&named("Café")).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/WinAnsiEncoding"));
        let hex = text.to_ascii_lowercase();
        assert!(contains(&bytes, b"(Caf\xe9)") || hex.contains("<436166e9>"));
    }

    #[test]
    fn hebrew_is_reordered_for_display() {
        assert_eq!(visual_order("סטודיו"), "וידוטס");
        assert_eq!(visual_order("Acme"), "Acme");
        assert_eq!(visual_order(""), "");
    }

    #[test]
    fn hebrew_name_is_drawn_with_embedded_glyphs() {
        let Some(fonts) = FontSet::discover() else {
            eprintln!("no system font found, skipping");
            return;
        };
        let face = fonts.regular.face().unwrap();
        let mut used = BTreeMap::new();
        let run = glyph_run(&face, "סטודיו", &mut used);
        assert_eq!(run.len(), 12);
        assert!(!used.contains_key(&0));
        assert_eq!(used.values().filter(|c| **c == 'ו').count(), 1);

        let bytes = PdfEncoder::embedding(fonts).encode(&named("סטודיו")).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Identity-H"));
        assert!(text.contains("/ToUnicode"));
        assert!(text.contains("/FontFile2"));
        assert!(!text.contains("(??????)"));
        assert!(!text.contains("/Helvetica"));
    }

    #[test]
    fn long_subtitle_is_wrapped() {
        let doc = acme_summary().with_subtitle("Submitted 2024-05-01 | Status: In progress | ".repeat(6));
        let canvas = layout(&doc).unwrap();
        let max = ((CANVAS_WIDTH - 2.0 * MARGIN) / (SUBTITLE_SIZE * GLYPH_WIDTH_EM)) as usize;
        let subtitle: Vec<_> = canvas
            .lines
            .iter()
            .filter(|l| l.text.contains("Submitted"))
            .collect();
        assert!(subtitle.len() > 1);
        assert!(subtitle.iter().all(|l| l.text.chars().count() <= max));
    }

    #[tokio::test]
    async fn successful_export_names_the_file() {
        let exporter = Exporter::pdf();
        let file = exporter
            .export(&acme_summary(), "brand-brief-Acme.pdf".into())
            .await
            .unwrap();
        assert_eq!(file.file_name, "brand-brief-Acme.pdf");
        assert!(!file.bytes.is_empty());
        assert!(!exporter.is_generating());
    }

    #[tokio::test]
    async fn failed_export_clears_indicator_and_yields_nothing() {
        let exporter = Exporter::new(Arc::new(FailingEncoder));
        let file = exporter.export(&acme_summary(), "x.pdf".into()).await;
        assert!(file.is_none());
        assert!(!exporter.is_generating());

        let exporter = Exporter::new(Arc::new(PanickingEncoder));
        assert!(exporter.export(&acme_summary(), "x.pdf".into()).await.is_none());
        assert!(!exporter.is_generating());
    }

    #[tokio::test]
    async fn duplicate_trigger_is_ignored() {
        let exporter = Exporter::pdf();
        let held = exporter.generating_flag().try_begin().unwrap();
        assert!(exporter.is_generating());
        assert!(exporter.export(&acme_summary(), "x.pdf".into()).await.is_none());
        drop(held);
        assert!(!exporter.is_generating());
        assert!(exporter.export(&acme_summary(), "x.pdf".into()).await.is_some());
    }

    #[test]
    fn empty_document_is_rejected() {
        let doc = SummaryDocument {
            title: "Nothing".into(),
            subtitle: None,
            sections: Vec::new(),
        };
        assert!(matches!(layout(&doc), Err(ExportError::EmptyDocument)));
    }
}
