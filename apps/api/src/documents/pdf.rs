//! PDF rendering via `printpdf` with the built-in Helvetica family.
//!
//! Each content line goes through [`to_markup`], the markup is decoded back
//! into styled runs, word-wrapped against the Helvetica width tables and laid
//! out top-down on US-letter pages. Layout is pure (see [`layout`]); drawing
//! only replays the positioned text ops.

use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, Rgb};

use super::font_metrics::{metrics, FontStyle};
use super::markdown::{classify_line, to_markup, LineKind};
use super::{DocumentError, DocumentKind};

const PAGE_WIDTH_PT: f32 = 612.0;
const PAGE_HEIGHT_PT: f32 = 792.0;
const INCH_PT: f32 = 72.0;
const LEADING: f32 = 1.2;
/// Blank lines become a 0.1" spacer.
const BLANK_SPACER_PT: f32 = 0.1 * INCH_PT;
const BULLET_MARKER: &str = "-";
const BULLET_INDENT_PT: f32 = 12.0;

#[derive(Debug, Clone, Copy)]
struct PageStyle {
    margin_top: f32,
    margin_bottom: f32,
    margin_left: f32,
    margin_right: f32,
    body_size: f32,
    body_space_after: f32,
    heading_size: f32,
    heading_space: f32,
    /// Cover letters ignore heading and bullet markers.
    structured: bool,
}

const RESUME_STYLE: PageStyle = PageStyle {
    margin_top: 0.5 * INCH_PT,
    margin_bottom: 0.5 * INCH_PT,
    margin_left: 0.75 * INCH_PT,
    margin_right: 0.75 * INCH_PT,
    body_size: 10.0,
    body_space_after: 6.0,
    heading_size: 14.0,
    heading_space: 12.0,
    structured: true,
};

const COVER_LETTER_STYLE: PageStyle = PageStyle {
    margin_top: INCH_PT,
    margin_bottom: INCH_PT,
    margin_left: INCH_PT,
    margin_right: INCH_PT,
    body_size: 11.0,
    body_space_after: 12.0,
    heading_size: 11.0,
    heading_space: 0.0,
    structured: false,
};

impl PageStyle {
    fn for_kind(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Resume => RESUME_STYLE,
            DocumentKind::CoverLetter => COVER_LETTER_STYLE,
        }
    }

    fn text_width(&self) -> f32 {
        PAGE_WIDTH_PT - self.margin_left - self.margin_right
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Markup decoding
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: FontStyle,
}

const TAGS: [(&str, Tag); 4] = [
    ("<b>", Tag::Bold(true)),
    ("</b>", Tag::Bold(false)),
    ("<i>", Tag::Italic(true)),
    ("</i>", Tag::Italic(false)),
];

#[derive(Debug, Clone, Copy)]
enum Tag {
    Bold(bool),
    Italic(bool),
}

/// Decodes `<b>`/`<i>` markup with `&amp;` escapes into styled runs.
///
/// Anything else that looks like a tag is kept as literal text.
pub fn decode_markup(markup: &str) -> Vec<StyledRun> {
    let mut runs: Vec<StyledRun> = Vec::new();
    let mut current = String::new();
    let (mut bold, mut italic) = (false, false);
    let mut rest = markup;

    let flush = |runs: &mut Vec<StyledRun>, current: &mut String, bold: bool, italic: bool| {
        if !current.is_empty() {
            runs.push(StyledRun {
                text: std::mem::take(current),
                style: FontStyle::from_flags(bold, italic),
            });
        }
    };

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some((tag, tag_kind)) = TAGS.iter().find(|(t, _)| rest.starts_with(*t)) {
                flush(&mut runs, &mut current, bold, italic);
                match tag_kind {
                    Tag::Bold(on) => bold = *on,
                    Tag::Italic(on) => italic = *on,
                }
                rest = &rest[tag.len()..];
                continue;
            }
        } else if c == '&' && rest.starts_with("&amp;") {
            current.push('&');
            rest = &rest["&amp;".len()..];
            continue;
        }
        current.push(c);
        rest = &rest[c.len_utf8()..];
    }
    flush(&mut runs, &mut current, bold, italic);
    runs
}

// ────────────────────────────────────────────────────────────────────────────
// Word wrapping
// ────────────────────────────────────────────────────────────────────────────

/// Splits runs into alternating whitespace / non-whitespace atoms.
fn atoms(runs: &[StyledRun]) -> Vec<StyledRun> {
    let mut out = Vec::new();
    for run in runs {
        let mut start = 0;
        let mut in_space: Option<bool> = None;
        for (i, c) in run.text.char_indices() {
            let space = c.is_whitespace();
            if in_space.is_some_and(|s| s != space) {
                out.push(StyledRun {
                    text: run.text[start..i].to_string(),
                    style: run.style,
                });
                start = i;
            }
            in_space = Some(space);
        }
        if start < run.text.len() {
            out.push(StyledRun {
                text: run.text[start..].to_string(),
                style: run.style,
            });
        }
    }
    out
}

fn is_space(run: &StyledRun) -> bool {
    run.text.chars().all(char::is_whitespace)
}

fn width(run: &StyledRun, size: f32) -> f32 {
    metrics(run.style).measure_pt(&run.text, size)
}

/// Greedy word wrap. A single word wider than `max_width` gets its own line.
pub fn wrap(runs: &[StyledRun], size: f32, max_width: f32) -> Vec<Vec<StyledRun>> {
    let mut lines: Vec<Vec<StyledRun>> = Vec::new();
    let mut line: Vec<StyledRun> = Vec::new();
    let mut line_width = 0.0;

    for atom in atoms(runs) {
        let atom_width = width(&atom, size);
        if is_space(&atom) {
            if !line.is_empty() {
                line_width += atom_width;
                line.push(atom);
            }
            continue;
        }
        if !line.is_empty() && line_width + atom_width > max_width {
            while line.last().is_some_and(is_space) {
                line.pop();
            }
            lines.push(merge(std::mem::take(&mut line)));
            line_width = 0.0;
        }
        line_width += atom_width;
        line.push(atom);
    }
    while line.last().is_some_and(is_space) {
        line.pop();
    }
    if !line.is_empty() {
        lines.push(merge(line));
    }
    lines
}

/// Joins adjacent atoms that share a style.
fn merge(atoms: Vec<StyledRun>) -> Vec<StyledRun> {
    let mut merged: Vec<StyledRun> = Vec::with_capacity(atoms.len());
    for atom in atoms {
        match merged.last_mut() {
            Some(last) if last.style == atom.style => last.text.push_str(&atom.text),
            _ => merged.push(atom),
        }
    }
    merged
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// One positioned piece of text. Coordinates are PDF points from the
/// bottom-left corner; `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
    pub text: String,
    pub heading: bool,
}

struct Cursor {
    style: PageStyle,
    pages: Vec<Vec<TextOp>>,
    y: f32,
}

impl Cursor {
    fn new(style: PageStyle) -> Self {
        Self {
            style,
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT_PT - style.margin_top,
        }
    }

    fn top(&self) -> f32 {
        PAGE_HEIGHT_PT - self.style.margin_top
    }

    /// Vertical space; never carries over to a fresh page.
    fn skip(&mut self, amount: f32) {
        if self.y < self.top() {
            self.y = (self.y - amount).max(self.style.margin_bottom);
        }
    }

    fn ensure(&mut self, height: f32) {
        if self.y - height < self.style.margin_bottom && self.y < self.top() {
            self.pages.push(Vec::new());
            self.y = self.top();
        }
    }

    fn paragraph(&mut self, markup: &str, size: f32, indent: f32, heading: bool, marker: bool) {
        let runs = decode_markup(markup);
        let x0 = self.style.margin_left + indent;
        let line_height = size * LEADING;
        let lines = wrap(&runs, size, self.style.text_width() - indent);

        for (i, line) in lines.into_iter().enumerate() {
            self.ensure(line_height);
            let baseline = self.y - size;
            let Some(page) = self.pages.last_mut() else {
                return;
            };
            if marker && i == 0 {
                page.push(TextOp {
                    x: self.style.margin_left,
                    y: baseline,
                    size,
                    style: FontStyle::Regular,
                    text: BULLET_MARKER.to_string(),
                    heading,
                });
            }
            let mut x = x0;
            for mut run in line {
                if heading {
                    run.style = emboldened(run.style);
                }
                let advance = width(&run, size);
                page.push(TextOp {
                    x,
                    y: baseline,
                    size,
                    style: run.style,
                    text: run.text,
                    heading,
                });
                x += advance;
            }
            self.y -= line_height;
        }
    }
}

fn emboldened(style: FontStyle) -> FontStyle {
    match style {
        FontStyle::Italic | FontStyle::BoldItalic => FontStyle::BoldItalic,
        FontStyle::Regular | FontStyle::Bold => FontStyle::Bold,
    }
}

/// Lays out `content` into pages of positioned text.
pub fn layout(content: &str, kind: DocumentKind) -> Vec<Vec<TextOp>> {
    let style = PageStyle::for_kind(kind);
    let mut cursor = Cursor::new(style);

    for raw in content.lines() {
        let kind = if style.structured {
            classify_line(raw)
        } else if raw.trim().is_empty() {
            LineKind::Blank
        } else {
            LineKind::Paragraph(raw.trim())
        };

        match kind {
            LineKind::Blank => cursor.skip(BLANK_SPACER_PT),
            LineKind::Heading(text) => {
                cursor.skip(style.heading_space);
                cursor.paragraph(&to_markup(text), style.heading_size, 0.0, true, false);
                cursor.skip(style.heading_space);
            }
            LineKind::Bullet(text) => {
                cursor.paragraph(&to_markup(text), style.body_size, BULLET_INDENT_PT, false, true);
                cursor.skip(style.body_space_after);
            }
            LineKind::Paragraph(text) => {
                cursor.paragraph(&to_markup(text), style.body_size, 0.0, false, false);
                cursor.skip(style.body_space_after);
            }
        }
    }
    cursor.pages
}

// ────────────────────────────────────────────────────────────────────────────
// Drawing
// ────────────────────────────────────────────────────────────────────────────

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    bold_italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, DocumentError> {
        let add = |font| doc.add_builtin_font(font).map_err(|e| DocumentError::Pdf(e.to_string()));
        Ok(Self {
            regular: add(BuiltinFont::Helvetica)?,
            bold: add(BuiltinFont::HelveticaBold)?,
            italic: add(BuiltinFont::HelveticaOblique)?,
            bold_italic: add(BuiltinFont::HelveticaBoldOblique)?,
        })
    }

    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
            FontStyle::BoldItalic => &self.bold_italic,
        }
    }
}

fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / INCH_PT)
}

fn heading_color() -> Color {
    Color::Rgb(Rgb::new(0.0, 51.0 / 255.0, 102.0 / 255.0, None))
}

fn body_color() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn draw(title: &str, pages: &[Vec<TextOp>]) -> Result<Vec<u8>, DocumentError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        mm(PAGE_WIDTH_PT),
        mm(PAGE_HEIGHT_PT),
        "Layer 1",
    );
    let fonts = Fonts::load(&doc)?;

    for (i, ops) in pages.iter().enumerate() {
        let (page, layer) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(mm(PAGE_WIDTH_PT), mm(PAGE_HEIGHT_PT), "Layer 1")
        };
        let layer = doc.get_page(page).get_layer(layer);
        for op in ops {
            layer.set_fill_color(if op.heading { heading_color() } else { body_color() });
            layer.use_text(op.text.clone(), op.size, mm(op.x), mm(op.y), fonts.get(op.style));
        }
    }

    doc.save_to_bytes().map_err(|e| DocumentError::Pdf(e.to_string()))
}

pub fn render_resume(content: &str) -> Result<Vec<u8>, DocumentError> {
    draw("Resume", &layout(content, DocumentKind::Resume))
}

pub fn render_cover_letter(content: &str) -> Result<Vec<u8>, DocumentError> {
    draw("Cover Letter", &layout(content, DocumentKind::CoverLetter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, style: FontStyle) -> StyledRun {
        StyledRun {
            text: text.to_string(),
            style,
        }
    }

    #[test]
    fn test_decode_markup_tags_and_entities() {
        let runs = decode_markup("R&amp;D with <b>Rust</b> and <i>care</i>");
        assert_eq!(
            runs,
            vec![
                run("R&D with ", FontStyle::Regular),
                run("Rust", FontStyle::Bold),
                run(" and ", FontStyle::Regular),
                run("care", FontStyle::Italic),
            ]
        );
    }

    #[test]
    fn test_decode_markup_nested_tags_combine() {
        let runs = decode_markup("<b>Lead <i>engineer</i></b>");
        assert_eq!(
            runs,
            vec![
                run("Lead ", FontStyle::Bold),
                run("engineer", FontStyle::BoldItalic),
            ]
        );
    }

    #[test]
    fn test_decode_markup_keeps_unknown_angle_brackets() {
        let runs = decode_markup("a < b <u>x</u>");
        assert_eq!(runs, vec![run("a < b <u>x</u>", FontStyle::Regular)]);
    }

    #[test]
    fn test_decode_round_trips_to_markup() {
        let runs = decode_markup(&to_markup("Shipped **10x** faster & *safer*"));
        let text: String = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(text, "Shipped 10x faster & safer");
        assert_eq!(runs[1].style, FontStyle::Bold);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "word ".repeat(60);
        let runs = vec![run(&text, FontStyle::Regular)];
        let lines = wrap(&runs, 10.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            let w: f32 = line.iter().map(|r| width(r, 10.0)).sum();
            assert!(w <= 200.0 + 1e-3, "line too wide: {w}");
            assert!(!line.last().unwrap().text.ends_with(' '));
        }
    }

    #[test]
    fn test_wrap_keeps_styles_and_merges_neighbours() {
        let runs = vec![
            run("plain ", FontStyle::Regular),
            run("bold words", FontStyle::Bold),
        ];
        let lines = wrap(&runs, 10.0, 1000.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            vec![run("plain ", FontStyle::Regular), run("bold words", FontStyle::Bold)]
        );
    }

    #[test]
    fn test_wrap_overlong_word_gets_own_line() {
        let runs = vec![run("a supercalifragilistic b", FontStyle::Regular)];
        let lines = wrap(&runs, 10.0, 30.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1][0].text, "supercalifragilistic");
    }

    #[test]
    fn test_layout_resume_heading_is_bold_and_marked() {
        let pages = layout("## Skills\n- Rust", DocumentKind::Resume);
        assert_eq!(pages.len(), 1);
        let heading = &pages[0][0];
        assert!(heading.heading);
        assert_eq!(heading.style, FontStyle::Bold);
        assert_eq!(heading.size, 14.0);
        assert_eq!(heading.text, "Skills");

        let marker = &pages[0][1];
        assert_eq!(marker.text, BULLET_MARKER);
        let bullet = &pages[0][2];
        assert_eq!(bullet.text, "Rust");
        assert!(bullet.x > marker.x);
        assert!(bullet.y < heading.y);
    }

    #[test]
    fn test_layout_cover_letter_ignores_structure_markers() {
        let pages = layout("## Dear team\n\n- thanks", DocumentKind::CoverLetter);
        let texts: Vec<&str> = pages[0].iter().map(|op| op.text.as_str()).collect();
        assert_eq!(texts, vec!["## Dear team", "- thanks"]);
        assert!(pages[0].iter().all(|op| op.size == 11.0 && !op.heading));
    }

    #[test]
    fn test_layout_breaks_pages_and_stays_inside_margins() {
        let content = "A line of resume text\n".repeat(200);
        let pages = layout(&content, DocumentKind::Resume);
        assert!(pages.len() > 1);
        for op in pages.iter().flatten() {
            assert!(op.y >= RESUME_STYLE.margin_bottom - 1e-3);
            assert!(op.y <= PAGE_HEIGHT_PT - RESUME_STYLE.margin_top);
        }
    }

    #[test]
    fn test_blank_lines_add_spacing() {
        let tight = layout("one\ntwo", DocumentKind::Resume);
        let loose = layout("one\n\ntwo", DocumentKind::Resume);
        let gap = |pages: &Vec<Vec<TextOp>>| pages[0][0].y - pages[0][1].y;
        assert!((gap(&loose) - gap(&tight) - BLANK_SPACER_PT).abs() < 1e-3);
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = render_resume("# Jane Doe\n**Rust** engineer").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let bytes = render_cover_letter("").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
