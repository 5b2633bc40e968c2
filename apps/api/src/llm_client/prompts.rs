// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Instruction shared by every document-writing prompt.
pub const NO_PLACEHOLDERS_INSTRUCTION: &str = "\
    Use ACTUAL information from the resume (real name, email, phone). \
    NEVER emit placeholders like [Your Name], [Your Email] or [Date]. \
    Keep content truthful: reorganize and emphasize, never invent.";

/// Markdown subset understood by the document generator.
pub const MARKDOWN_FORMAT_INSTRUCTION: &str = "\
    Formatting: use **bold** for keywords that match the job description, \
    *italic* sparingly, `## ` for section headers and `- ` for bullet points. \
    No tables, no links, no nested emphasis.";
