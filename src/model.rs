use std::fmt;

use serde::{Deserialize, Serialize};

/// The regeneratable sections of a conversion child page. `ALL` fixes the
/// order in which failing sections are repaired within one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SectionName {
    WhyConvert,
    FromUnit,
    ToUnit,
    Examples,
    Technical,
    FaqBlock,
}

impl SectionName {
    pub const ALL: [SectionName; 6] = [
        SectionName::WhyConvert,
        SectionName::FromUnit,
        SectionName::ToUnit,
        SectionName::Examples,
        SectionName::Technical,
        SectionName::FaqBlock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WhyConvert => "why_convert",
            Self::FromUnit => "from_unit",
            Self::ToUnit => "to_unit",
            Self::Examples => "examples",
            Self::Technical => "technical",
            Self::FaqBlock => "faq_block",
        }
    }

    /// JSON key this section occupies in both the full-page schema and a
    /// single-section regeneration response.
    pub fn response_key(self) -> &'static str {
        match self {
            Self::WhyConvert => "why_convert_section_html",
            Self::FromUnit => "from_unit_section_html",
            Self::ToUnit => "to_unit_section_html",
            Self::Examples => "examples_section_html",
            Self::Technical => "technical_details_html",
            Self::FaqBlock => "faqs",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SectionName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Inclusive word-count range for a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordRange {
    pub min: usize,
    pub max: usize,
}

impl WordRange {
    pub fn contains(self, words: usize) -> bool {
        words >= self.min && words <= self.max
    }
}

impl fmt::Display for WordRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// One out-of-range section reported by the length validator. Carries the
/// section tag directly so the repair loop never parses message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub section: SectionName,
    pub faq_index: Option<usize>,
    pub word_count: usize,
    pub expected: WordRange,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.faq_index {
            Some(idx) => write!(
                f,
                "faqs[{idx}].answer_html: {} words (expected {})",
                self.word_count, self.expected
            ),
            None => write!(
                f,
                "{}: {} words (expected {})",
                self.section.response_key(),
                self.word_count,
                self.expected
            ),
        }
    }
}

pub const DEFAULT_REGION: &str = "Pan-India";
pub const DEFAULT_CITY_CONTEXT: &str = "a major Indian city";

/// Structured request for one child page. Optional fields stay optional here;
/// `resolved` substitutes the documented defaults right before any prompt is
/// rendered so the collaborator never sees an unresolved placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct PageRequest {
    pub from_unit_code: String,
    pub to_unit_code: String,
    pub from_unit_label: String,
    pub to_unit_label: String,
    pub factor_to_unit: Option<f64>,
    pub from_unit_region: Option<String>,
    pub to_unit_region: Option<String>,
    pub city_name: Option<String>,
    pub direction_note: Option<String>,
}

/// `PageRequest` with every optional field replaced by its default.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub from_unit_code: String,
    pub to_unit_code: String,
    pub from_unit_label: String,
    pub to_unit_label: String,
    pub factor_text: String,
    pub from_unit_region: String,
    pub to_unit_region: String,
    pub city_name: String,
    pub direction_note: String,
}

impl PageRequest {
    pub fn resolved(&self) -> ResolvedRequest {
        ResolvedRequest {
            from_unit_code: self.from_unit_code.clone(),
            to_unit_code: self.to_unit_code.clone(),
            from_unit_label: self.from_unit_label.clone(),
            to_unit_label: self.to_unit_label.clone(),
            factor_text: self
                .factor_to_unit
                .map_or_else(|| "N/A".to_string(), |factor| factor.to_string()),
            from_unit_region: self
                .from_unit_region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            to_unit_region: self
                .to_unit_region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            city_name: self
                .city_name
                .clone()
                .unwrap_or_else(|| DEFAULT_CITY_CONTEXT.to_string()),
            direction_note: self.direction_note.clone().unwrap_or_default(),
        }
    }

    /// The directional note shared by full generation and every section
    /// regeneration for the same pair.
    pub fn direction_note_for(from_label: &str, to_label: &str) -> String {
        format!(
            "This page is specifically about converting FROM {from_label} TO {to_label}. \
             Make the content clearly directional and do not write generic text that would \
             equally fit the reverse ({to_label} to {from_label})."
        )
    }
}

/// One FAQ entry. List order is display-significant; the mapper assigns
/// 1-indexed sort order from position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer_html: String,
}

/// Full generated page content, matching the collaborator's JSON schema
/// exactly. Unknown fields are rejected: a response that does not fit this
/// shape is fatal for the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageContent {
    pub seo_meta_title: String,
    pub seo_meta_description: String,
    pub h1_heading: String,
    pub why_convert_section_html: String,
    pub from_unit_section_html: String,
    pub to_unit_section_html: String,
    pub examples_section_html: String,
    pub technical_details_html: String,
    pub faqs: Vec<FaqEntry>,
}

/// Aggregate counters reported at the end of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchCounts {
    pub pairs_processed: usize,
    pub clean: usize,
    pub with_issues: usize,
    pub skipped_errors: usize,
}

/// A pair that finished with unresolved length issues.
#[derive(Debug, Clone, Serialize)]
pub struct FlaggedPair {
    pub slug: String,
    pub issues: Vec<String>,
}

/// Batch run manifest written when `--report-path` is set.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRunManifest {
    pub manifest_version: u32,
    pub started_at: String,
    pub completed_at: String,
    pub csv_path: String,
    pub parent_slug: String,
    pub locale: String,
    pub site_code: String,
    pub auto_fix_lengths: bool,
    pub max_fix_passes: usize,
    pub preview_only: bool,
    pub counts: BatchCounts,
    pub flagged_pairs: Vec<FlaggedPair>,
}
