//! Inline markdown emphasis for generated documents.
//!
//! LLM output uses `**bold**`, `*italic*` and `_italic_`. Two renderings exist:
//! - [`parse_spans`] → styled runs for DOCX
//! - [`to_markup`]   → `&`-escaped `<b>`/`<i>` markup for PDF
//!
//! Both are single-pass and non-recursive: the text inside an emphasis pair is
//! never re-scanned, so nested emphasis is not supported. `to_markup` does not
//! treat `_` as an italic marker.

use serde::Serialize;

/// A run of text sharing one formatting state within a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Span {
    fn plain(text: &str) -> Self {
        Self { text: text.to_string(), bold: false, italic: false }
    }

    fn bold(text: &str) -> Self {
        Self { text: text.to_string(), bold: true, italic: false }
    }

    fn italic(text: &str) -> Self {
        Self { text: text.to_string(), bold: false, italic: true }
    }
}

/// How a caller should lay out one line of generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `#`-prefixed line; markers stripped.
    Heading(&'a str),
    /// `- `, `• ` or `* ` prefixed line; marker and one space stripped.
    Bullet(&'a str),
    Blank,
    Paragraph(&'a str),
}

const BULLET_MARKERS: [&str; 3] = ["- ", "• ", "* "];

/// Classifies a raw content line. Surrounding whitespace is ignored.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with('#') {
        return LineKind::Heading(line.trim_start_matches('#').trim_start());
    }
    for marker in BULLET_MARKERS {
        if let Some(rest) = line.strip_prefix(marker) {
            return LineKind::Bullet(rest);
        }
    }
    LineKind::Paragraph(line)
}

// ────────────────────────────────────────────────────────────────────────────
// Emphasis scanner
// ────────────────────────────────────────────────────────────────────────────

/// One emphasis pair found at a scan position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Bold { end: usize },
    Italic { end: usize },
}

/// Marker recognition shared by both renderings. Markers are ASCII, so byte
/// offsets around them are always char boundaries.
struct Scanner<'a> {
    text: &'a str,
    italic_markers: &'static [u8],
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, italic_markers: &'static [u8]) -> Self {
        Self { text, italic_markers }
    }

    /// Emphasis that would fire at byte offset `i`: a `**` with a later
    /// closing `**`, else an italic marker whose next occurrence leaves at
    /// least one character between them.
    fn emphasis_at(&self, i: usize) -> Option<Emphasis> {
        let bytes = self.text.as_bytes();
        let marker = *bytes.get(i)?;

        if marker == b'*' && bytes.get(i + 1) == Some(&b'*') {
            if let Some(offset) = self.text[i + 2..].find("**") {
                return Some(Emphasis::Bold { end: i + 2 + offset });
            }
        }

        if self.italic_markers.contains(&marker) {
            let end = i + 1 + self.text[i + 1..].find(marker as char)?;
            if end - i > 1 {
                return Some(Emphasis::Italic { end });
            }
        }

        None
    }

    /// End of the plain run starting at `i`: the next offset where emphasis
    /// fires, or the end of the text. Always consumes at least one byte.
    fn plain_run_end(&self, i: usize) -> usize {
        let bytes = self.text.as_bytes();
        (i + 1..bytes.len())
            .find(|&j| {
                (bytes[j] == b'*' || self.italic_markers.contains(&bytes[j]))
                    && self.emphasis_at(j).is_some()
            })
            .unwrap_or(bytes.len())
    }

    /// Walks the whole line once, handing each segment to `emit`.
    fn scan(&self, mut emit: impl FnMut(Segment<'a>)) {
        let len = self.text.len();
        let mut i = 0;

        while i < len {
            match self.emphasis_at(i) {
                Some(Emphasis::Bold { end }) => {
                    emit(Segment::Bold(&self.text[i + 2..end]));
                    i = end + 2;
                }
                Some(Emphasis::Italic { end }) => {
                    emit(Segment::Italic(&self.text[i + 1..end]));
                    i = end + 1;
                }
                None => {
                    let end = self.plain_run_end(i);
                    emit(Segment::Plain(&self.text[i..end]));
                    i = end;
                }
            }
        }
    }
}

enum Segment<'a> {
    Plain(&'a str),
    Bold(&'a str),
    Italic(&'a str),
}

// ────────────────────────────────────────────────────────────────────────────
// Renderings
// ────────────────────────────────────────────────────────────────────────────

/// Parses a line into styled spans.
///
/// Concatenating the span texts gives back the line with matched markers
/// removed and unmatched markers kept. Empty emphasis (`****`) emits nothing,
/// and the plain text around it stays one span.
pub fn parse_spans(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    Scanner::new(line, b"*_").scan(|segment| {
        let span = match segment {
            Segment::Plain(text) => Span::plain(text),
            Segment::Bold(text) => Span::bold(text),
            Segment::Italic(text) => Span::italic(text),
        };
        if span.text.is_empty() {
            return;
        }
        // Empty emphasis can split a plain run; keep plain runs maximal.
        match spans.last_mut() {
            Some(last) if is_plain(last) && is_plain(&span) => last.text.push_str(&span.text),
            _ => spans.push(span),
        }
    });
    spans
}

fn is_plain(span: &Span) -> bool {
    !span.bold && !span.italic
}

/// Renders a line as escaped markup with `<b>` and `<i>` tags.
///
/// Only `&` is escaped. `_` is left as literal text.
pub fn to_markup(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 16);
    Scanner::new(line, b"*").scan(|segment| match segment {
        Segment::Plain(text) => out.push_str(&escape(text)),
        Segment::Bold(text) => {
            out.push_str("<b>");
            out.push_str(&escape(text));
            out.push_str("</b>");
        }
        Segment::Italic(text) => {
            out.push_str("<i>");
            out.push_str(&escape(text));
            out.push_str("</i>");
        }
    });
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn triples(spans: &[Span]) -> Vec<(&str, bool, bool)> {
        spans
            .iter()
            .map(|s| (s.text.as_str(), s.bold, s.italic))
            .collect()
    }

    fn joined(spans: &[Span]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_mixed_emphasis() {
        let spans = parse_spans("**Bold** and *italic* and _also italic_");
        assert_eq!(
            triples(&spans),
            vec![
                ("Bold", true, false),
                (" and ", false, false),
                ("italic", false, true),
                (" and ", false, false),
                ("also italic", false, true),
            ]
        );
    }

    #[test]
    fn test_plain_line_is_single_span() {
        let line = "Led a team of 5 engineers (2019 - 2023).";
        assert_eq!(parse_spans(line), vec![Span::plain(line)]);
    }

    #[test]
    fn test_empty_line_has_no_spans() {
        assert!(parse_spans("").is_empty());
    }

    #[test]
    fn test_unterminated_star_kept_as_text() {
        let spans = parse_spans("unterminated *star");
        assert!(spans.iter().all(|s| !s.bold && !s.italic));
        assert_eq!(joined(&spans), "unterminated *star");
    }

    #[test]
    fn test_unterminated_marker_does_not_swallow_later_emphasis() {
        let spans = parse_spans("C_sharp and **Rust**");
        assert_eq!(
            triples(&spans),
            vec![("C_sharp and ", false, false), ("Rust", true, false)]
        );
    }

    #[test]
    fn test_unterminated_bold_falls_back_to_italic() {
        // No closing "**": the first '*' is adjacent to the second, so it is
        // literal; the second pairs with the lone closing '*'.
        let spans = parse_spans("**x*");
        assert_eq!(triples(&spans), vec![("*", false, false), ("x", false, true)]);
    }

    #[test]
    fn test_adjacent_markers_are_not_italic() {
        let spans = parse_spans("a __ b");
        assert_eq!(joined(&spans), "a __ b");
        assert!(spans.iter().all(|s| !s.italic));
    }

    #[test]
    fn test_bold_content_is_not_rescanned() {
        let spans = parse_spans("**bold _inner_ text**");
        assert_eq!(triples(&spans), vec![("bold _inner_ text", true, false)]);
    }

    #[test]
    fn test_empty_bold_emits_nothing() {
        let spans = parse_spans("a****b");
        assert_eq!(joined(&spans), "ab");
    }

    #[test]
    fn test_empty_emphasis_keeps_plain_run_maximal() {
        assert_eq!(parse_spans("a****a"), vec![Span::plain("aa")]);
        assert_eq!(
            parse_spans("a **** b **c**"),
            vec![Span::plain("a  b "), Span::bold("c")]
        );
    }

    #[test]
    fn test_concatenation_drops_only_matched_markers() {
        let line = "Built **Rust** services with _care_ and 5* ratings";
        let spans = parse_spans(line);
        assert_eq!(joined(&spans), "Built Rust services with care and 5* ratings");
        assert_eq!(spans.iter().filter(|s| s.italic).count(), 1);
    }

    #[test]
    fn test_non_ascii_text_survives() {
        let spans = parse_spans("Café **naïve** – résumé");
        assert_eq!(joined(&spans), "Café naïve – résumé");
        assert!(spans[1].bold);
    }

    #[test]
    fn test_markup_bold_and_italic() {
        assert_eq!(
            to_markup("**Senior** engineer, *remote*"),
            "<b>Senior</b> engineer, <i>remote</i>"
        );
    }

    #[test]
    fn test_markup_escapes_ampersand() {
        assert_eq!(to_markup("R&D **P&L**"), "R&amp;D <b>P&amp;L</b>");
    }

    #[test]
    fn test_markup_ignores_underscore_italics() {
        assert_eq!(to_markup("snake_case and _this_"), "snake_case and _this_");
    }

    #[test]
    fn test_markup_unterminated_star_is_literal() {
        assert_eq!(to_markup("5* rating"), "5* rating");
    }

    #[test]
    fn test_classify_heading() {
        assert_eq!(classify_line("## Experience"), LineKind::Heading("Experience"));
        assert_eq!(classify_line("  ### **Skills**  "), LineKind::Heading("**Skills**"));
    }

    #[test]
    fn test_classify_bullets() {
        assert_eq!(classify_line("- Shipped v2"), LineKind::Bullet("Shipped v2"));
        assert_eq!(classify_line("• Shipped v2"), LineKind::Bullet("Shipped v2"));
        assert_eq!(classify_line("* Shipped v2"), LineKind::Bullet("Shipped v2"));
    }

    #[test]
    fn test_classify_blank_and_paragraph() {
        assert_eq!(classify_line("   "), LineKind::Blank);
        assert_eq!(classify_line("-5% churn"), LineKind::Paragraph("-5% churn"));
        assert_eq!(classify_line("*Remote* role"), LineKind::Paragraph("*Remote* role"));
    }
}
