// Resume / job description analysis.
// Pure skill matching lives in skill_gap; everything touching the LLM goes
// through llm_client and is orchestrated by pipeline.

pub mod handlers;
pub mod job_analyzer;
pub mod pdf_text;
pub mod pipeline;
pub mod prompts;
pub mod skill_gap;
pub mod tailoring;
