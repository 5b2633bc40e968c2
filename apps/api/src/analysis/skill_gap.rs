//! Skill gap: lexical comparison of job-side skills against candidate-side skills.
//!
//! Pure functions, no I/O. Skills are compared on their normalized form
//! (trimmed + lower-cased); output always uses the first original spelling
//! seen for each normalized key.
//!
//! Classification:
//! - exact normalized match            → `matching`
//! - substring either way, both > 3ch  → `partial` (worth half a match)
//! - otherwise                         → `missing`

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Skills this short never qualify for partial matching.
const MIN_PARTIAL_LEN: usize = 3;

/// Weight of a partial match relative to an exact match.
const PARTIAL_WEIGHT: f64 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// A required skill that has no exact match but overlaps a held skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialMatch {
    /// Required skill, job-list casing.
    pub skill: String,
    /// Held skill that triggered the match, resume-list casing.
    pub similar_to: String,
}

impl fmt::Display for PartialMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (similar to {})", self.skill, self.similar_to)
    }
}

/// Classification of every required skill against the held skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGapResult {
    pub matching: Vec<String>,
    pub missing: Vec<String>,
    pub partial: Vec<PartialMatch>,
}

/// Display-oriented form embedded in API payloads and agent observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub partial_skills: Vec<String>,
}

impl From<SkillGapResult> for SkillGap {
    fn from(result: SkillGapResult) -> Self {
        SkillGap {
            matching_skills: result.matching,
            missing_skills: result.missing,
            partial_skills: result.partial.iter().map(ToString::to_string).collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// A normalized skill paired with the first original spelling seen for it.
struct SkillEntry<'a> {
    key: String,
    original: &'a str,
}

fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Deduplicates on the normalized key, keeping the first spelling in list order.
fn dedup_skills<S: AsRef<str>>(skills: &[S]) -> Vec<SkillEntry<'_>> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .filter_map(|skill| {
            let original = skill.as_ref();
            let key = normalize(original);
            seen.insert(key.clone())
                .then_some(SkillEntry { key, original })
        })
        .collect()
}

fn qualifies_for_partial(key: &str) -> bool {
    key.chars().count() > MIN_PARTIAL_LEN
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Compares required (job) skills against held (resume) skills.
///
/// Held skills are scanned in first-seen list order, so when several held
/// skills could partially match a required one, the earliest in the resume
/// list is cited.
pub fn analyze_skill_gap<R, H>(required: &[R], held: &[H]) -> SkillGapResult
where
    R: AsRef<str>,
    H: AsRef<str>,
{
    let required = dedup_skills(required);
    let held = dedup_skills(held);
    let held_keys: HashSet<&str> = held.iter().map(|h| h.key.as_str()).collect();

    let mut result = SkillGapResult::default();

    for req in &required {
        if held_keys.contains(req.key.as_str()) {
            result.matching.push(req.original.to_string());
            continue;
        }

        let similar = qualifies_for_partial(&req.key)
            .then(|| {
                held.iter().find(|h| {
                    qualifies_for_partial(&h.key)
                        && (h.key.contains(req.key.as_str()) || req.key.contains(h.key.as_str()))
                })
            })
            .flatten();

        match similar {
            Some(h) => result.partial.push(PartialMatch {
                skill: req.original.to_string(),
                similar_to: h.original.to_string(),
            }),
            None => result.missing.push(req.original.to_string()),
        }
    }

    result
}

/// Weighted match percentage: exact matches count 1, partial matches 0.5.
///
/// Returns 0.0 when nothing is required. Rounded to two decimals and clamped
/// at 100 even if the counts passed in exceed `total_required`.
pub fn match_percentage(matching_count: usize, partial_count: usize, total_required: usize) -> f64 {
    if total_required == 0 {
        return 0.0;
    }

    let weighted = matching_count as f64 + partial_count as f64 * PARTIAL_WEIGHT;
    let percentage = weighted / total_required as f64 * 100.0;

    ((percentage * 100.0).round() / 100.0).min(100.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
