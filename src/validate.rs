use anyhow::{Context, Result};
use regex::Regex;

use crate::limits::word_range;
use crate::model::{PageContent, SectionName, ValidationIssue};

/// Word-count validator for generated page content. Compiles its
/// tag-stripping pattern once; construct it up front and reuse it across a
/// batch run.
pub struct LengthValidator {
    tag_pattern: Regex,
}

impl LengthValidator {
    pub fn new() -> Result<Self> {
        let tag_pattern =
            Regex::new(r"<[^>]+>").context("failed to compile HTML tag pattern")?;
        Ok(Self { tag_pattern })
    }

    /// Rough word count: replace tags with a space, collapse whitespace,
    /// split. Empty or tag-only input counts as zero words.
    pub fn word_count(&self, html: &str) -> usize {
        let text = self.tag_pattern.replace_all(html, " ");
        text.split_whitespace().count()
    }

    /// One issue per out-of-range section; each FAQ answer is checked
    /// individually against the shared FAQ range. An empty result means the
    /// content is fully within range. Purely structural: this never inspects
    /// meaning, directionality or factual accuracy.
    pub fn validate(&self, content: &PageContent) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let html_sections = [
            (SectionName::WhyConvert, &content.why_convert_section_html),
            (SectionName::FromUnit, &content.from_unit_section_html),
            (SectionName::ToUnit, &content.to_unit_section_html),
            (SectionName::Examples, &content.examples_section_html),
            (SectionName::Technical, &content.technical_details_html),
        ];

        for (section, html) in html_sections {
            let expected = word_range(section);
            let words = self.word_count(html);
            if !expected.contains(words) {
                issues.push(ValidationIssue {
                    section,
                    faq_index: None,
                    word_count: words,
                    expected,
                });
            }
        }

        let faq_expected = word_range(SectionName::FaqBlock);
        for (idx, faq) in content.faqs.iter().enumerate() {
            let words = self.word_count(&faq.answer_html);
            if !faq_expected.contains(words) {
                issues.push(ValidationIssue {
                    section: SectionName::FaqBlock,
                    faq_index: Some(idx),
                    word_count: words,
                    expected: faq_expected,
                });
            }
        }

        issues
    }
}
