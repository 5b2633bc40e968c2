//! DOCX rendering via `docx-rs`.
//!
//! Content is first planned into [`Block`]s (pure, testable), then each block
//! becomes a Word paragraph whose runs come from [`parse_spans`].

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText, LineSpacing,
    NumberFormat, Numbering, NumberingId, PageMargin, Paragraph, Run, SpecialIndentType, Start,
};

use super::markdown::{classify_line, parse_spans, LineKind, Span};
use super::DocumentError;

/// Twentieths of a point per inch.
const TWIPS_PER_INCH: i32 = 1440;
const HEADING_COLOR: &str = "003366";
/// Run sizes are in half-points.
const HEADING_SIZE_HALF_PT: usize = 28;
/// 6pt in twentieths of a point.
const PARAGRAPH_SPACE_AFTER: u32 = 120;
const BULLET_NUMBERING_ID: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Bullet,
    Body,
    /// Cover letters keep blank lines as empty paragraphs.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub spans: Vec<Span>,
}

// ────────────────────────────────────────────────────────────────────────────
// Planning
// ────────────────────────────────────────────────────────────────────────────

/// Resume layout: blank lines are dropped, headings and bullets are styled.
pub fn plan_resume(content: &str) -> Vec<Block> {
    content
        .lines()
        .filter_map(|line| match classify_line(line) {
            LineKind::Blank => None,
            LineKind::Heading(text) => Some(Block {
                kind: BlockKind::Heading,
                spans: parse_spans(text),
            }),
            LineKind::Bullet(text) => Some(Block {
                kind: BlockKind::Bullet,
                spans: parse_spans(text),
            }),
            LineKind::Paragraph(text) => Some(Block {
                kind: BlockKind::Body,
                spans: parse_spans(text),
            }),
        })
        .collect()
}

/// Cover-letter layout: every non-blank line is a plain left-aligned paragraph.
pub fn plan_cover_letter(content: &str) -> Vec<Block> {
    content
        .lines()
        .map(|line| {
            let line = line.trim();
            if line.is_empty() {
                Block {
                    kind: BlockKind::Empty,
                    spans: Vec::new(),
                }
            } else {
                Block {
                    kind: BlockKind::Body,
                    spans: parse_spans(line),
                }
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

pub fn render_resume(content: &str) -> Result<Vec<u8>, DocumentError> {
    let margins = PageMargin::new()
        .top(TWIPS_PER_INCH / 2)
        .bottom(TWIPS_PER_INCH / 2)
        .left(TWIPS_PER_INCH * 3 / 4)
        .right(TWIPS_PER_INCH * 3 / 4);

    let docx = plan_resume(content)
        .iter()
        .fold(with_bullet_numbering(Docx::new().page_margin(margins)), |docx, block| {
            docx.add_paragraph(paragraph(block))
        });
    pack(docx)
}

pub fn render_cover_letter(content: &str) -> Result<Vec<u8>, DocumentError> {
    let margins = PageMargin::new()
        .top(TWIPS_PER_INCH)
        .bottom(TWIPS_PER_INCH)
        .left(TWIPS_PER_INCH)
        .right(TWIPS_PER_INCH);

    let docx = plan_cover_letter(content)
        .iter()
        .fold(Docx::new().page_margin(margins), |docx, block| {
            docx.add_paragraph(paragraph(block))
        });
    pack(docx)
}

fn with_bullet_numbering(docx: Docx) -> Docx {
    let level = Level::new(
        0,
        Start::new(1),
        NumberFormat::new("bullet"),
        LevelText::new("•"),
        LevelJc::new("left"),
    )
    .indent(
        Some(TWIPS_PER_INCH / 2),
        Some(SpecialIndentType::Hanging(TWIPS_PER_INCH / 4)),
        None,
        None,
    );
    docx.add_abstract_numbering(AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(level))
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID))
}

fn paragraph(block: &Block) -> Paragraph {
    let base = Paragraph::new().align(AlignmentType::Left);
    match block.kind {
        BlockKind::Empty => base,
        BlockKind::Heading => block.spans.iter().fold(
            base.line_spacing(LineSpacing::new().before(240).after(PARAGRAPH_SPACE_AFTER)),
            |p, span| {
                p.add_run(
                    run(span)
                        .bold()
                        .size(HEADING_SIZE_HALF_PT)
                        .color(HEADING_COLOR),
                )
            },
        ),
        BlockKind::Bullet => block.spans.iter().fold(
            base.numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0)),
            |p, span| p.add_run(run(span)),
        ),
        BlockKind::Body => block.spans.iter().fold(
            base.line_spacing(LineSpacing::new().after(PARAGRAPH_SPACE_AFTER)),
            |p, span| p.add_run(run(span)),
        ),
    }
}

fn run(span: &Span) -> Run {
    let mut run = Run::new().add_text(&span.text);
    if span.bold {
        run = run.bold();
    }
    if span.italic {
        run = run.italic();
    }
    run
}

fn pack(docx: Docx) -> Result<Vec<u8>, DocumentError> {
    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| DocumentError::Docx(e.to_string()))?;
    Ok(buf.into_inner())
}
