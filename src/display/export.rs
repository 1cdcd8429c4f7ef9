use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use super::linkify::{linkify, to_markdown};
use crate::material::{GenerationOutcome, MaterialKind};

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[^a-z0-9_]+").expect("sanitize pattern is valid"));

fn sanitize(raw: &str) -> String {
    UNSAFE_CHARS.replace_all(raw, "_").to_lowercase()
}

/// `<kind label>_<topic>` with every run of unsafe characters replaced by `_`.
pub fn export_file_stem(kind: MaterialKind, topic: &str) -> String {
    let topic = match sanitize(topic.trim()) {
        t if t.is_empty() => "document".to_string(),
        t => t,
    };
    format!("{}_{}", sanitize(kind.label()), topic)
}

pub fn pdf_file_name(kind: MaterialKind, topic: &str) -> String {
    format!("{}.pdf", export_file_stem(kind, topic))
}

pub fn markdown_file_name(kind: MaterialKind, topic: &str) -> String {
    format!("{}.md", export_file_stem(kind, topic))
}

// A4 portrait, Helvetica.
const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 5.5;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;
const WRAP_COLUMNS: usize = 95;

/// Greedy word wrap on character count. Words longer than `width` are split.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            wrapped.push(word.into_iter().collect());
            word = rest;
        }

        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.len();
        if needed > width && !current.is_empty() {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || wrapped.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

struct PdfWriter {
    doc: printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    cursor_mm: f32,
    pages: usize,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "page 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .context("Failed to load PDF font")?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .context("Failed to load PDF font")?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            cursor_mm: PAGE_HEIGHT.0 - MARGIN_MM,
            pages: 1,
        })
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        if self.cursor_mm < MARGIN_MM {
            self.pages += 1;
            let (page, layer) =
                self.doc
                    .add_page(PAGE_WIDTH, PAGE_HEIGHT, format!("page {}", self.pages));
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.cursor_mm = PAGE_HEIGHT.0 - MARGIN_MM;
        }

        let font = if bold { &self.bold } else { &self.regular };
        if !text.is_empty() {
            self.layer
                .use_text(text, size, Mm(MARGIN_MM), Mm(self.cursor_mm), font);
        }
        self.cursor_mm -= LINE_HEIGHT_MM * (size / BODY_SIZE).max(1.0);
    }

    fn paragraph(&mut self, text: &str) {
        for raw in text.lines() {
            for wrapped in wrap_line(raw, WRAP_COLUMNS) {
                self.line(&wrapped, BODY_SIZE, false);
            }
        }
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .context("Failed to serialize PDF document")
    }
}

pub struct ExportDocument<'a> {
    kind: MaterialKind,
    topic: &'a str,
    outcome: &'a GenerationOutcome,
}

impl<'a> ExportDocument<'a> {
    pub fn new(kind: MaterialKind, topic: &'a str, outcome: &'a GenerationOutcome) -> Self {
        Self {
            kind,
            topic,
            outcome,
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut doc = format!(
            "# {}\n\n{}\n",
            GenerationOutcome::display_title(self.kind, self.topic),
            to_markdown(&linkify(&self.outcome.text))
        );

        if let Some(sources) = self.outcome.sources.as_ref().filter(|s| !s.is_empty()) {
            doc.push_str("\n## Sources:\n\n");
            for source in sources {
                doc.push_str(&format!("- [{}]({})\n", source.title, source.uri));
            }
        }

        doc
    }

    pub fn render_pdf(&self) -> Result<Vec<u8>> {
        let title = GenerationOutcome::display_title(self.kind, self.topic);
        let mut pdf = PdfWriter::new(&title)?;

        pdf.line(&title, TITLE_SIZE, true);
        pdf.line("", BODY_SIZE, false);
        pdf.paragraph(&self.outcome.text);

        if let Some(sources) = self.outcome.sources.as_ref().filter(|s| !s.is_empty()) {
            pdf.line("", BODY_SIZE, false);
            pdf.line("Sources:", BODY_SIZE, true);
            for source in sources {
                pdf.paragraph(&format!("- {} <{}>", source.title, source.uri));
            }
        }

        pdf.finish()
    }

    /// Writes `<stem>.pdf` into `dir`, returning the file path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(pdf_file_name(self.kind, self.topic));
        write_export(&path, &self.render_pdf()?)
    }

    /// Writes `<stem>.md` into `dir`, returning the file path.
    pub fn save_markdown(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(markdown_file_name(self.kind, self.topic));
        write_export(&path, self.render_markdown().as_bytes())
    }
}

fn write_export(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("Failed to create export directory")?;
    }
    fs::write(path, bytes)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    Ok(path.to_path_buf())
}
