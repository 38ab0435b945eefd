use anyhow::Result;
use tracing::{debug, info};

use crate::generate::TextGenerator;
use crate::model::{PageContent, PageRequest, SectionName, ValidationIssue};
use crate::regen::regenerate_section;
use crate::validate::LengthValidator;

/// Outcome of one repair run over a page's content.
#[derive(Debug, Clone)]
pub struct RepairReport {
    pub passes_used: usize,
    pub sections_regenerated: usize,
    /// Issues still present when the loop ended. Empty means fully in range.
    pub issues: Vec<ValidationIssue>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// The distinct failing sections, in canonical `SectionName::ALL` order.
/// Several FAQ-answer issues collapse to a single `faq_block` entry: the FAQ
/// list is regenerated as one block, never per question.
fn failing_sections(issues: &[ValidationIssue]) -> Vec<SectionName> {
    SectionName::ALL
        .into_iter()
        .filter(|section| issues.iter().any(|issue| issue.section == *section))
        .collect()
}

/// Validate-and-regenerate loop, bounded by `max_passes`.
///
/// Already-valid content returns immediately without a single collaborator
/// call. Each pass regenerates every distinct failing section once, splices
/// the replacements in place and re-validates. The loop ends on clean content
/// or an exhausted budget; leftover issues are returned to the caller, not
/// treated as fatal. A transport or schema error from a regeneration attempt
/// aborts the loop as an error for this pair.
pub fn repair_lengths(
    generator: &dyn TextGenerator,
    validator: &LengthValidator,
    request: &PageRequest,
    content: &mut PageContent,
    max_passes: usize,
) -> Result<RepairReport> {
    let mut issues = validator.validate(content);
    let mut passes_used = 0;
    let mut sections_regenerated = 0;

    while !issues.is_empty() && passes_used < max_passes {
        let sections = failing_sections(&issues);
        debug!(
            pass = passes_used + 1,
            sections = %sections
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(","),
            "regenerating out-of-range sections"
        );

        for section in sections {
            let patch = regenerate_section(generator, section, request)?;
            patch.apply(content);
            sections_regenerated += 1;
        }

        passes_used += 1;
        issues = validator.validate(content);
    }

    let report = RepairReport {
        passes_used,
        sections_regenerated,
        issues,
    };

    if !report.is_clean() {
        info!(
            passes_used = report.passes_used,
            remaining_issues = report.issues.len(),
            "repair budget exhausted with issues remaining"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::tests::{FakeGenerator, request_for};
    use crate::model::{FaqEntry, WordRange};
    use crate::validate::tests::content_within_range;

    fn words(count: usize) -> String {
        vec!["word"; count].join(" ")
    }

    fn html_patch(section: SectionName, word_count: usize) -> String {
        format!(
            r#"{{"{}": "<p>{}</p>"}}"#,
            section.response_key(),
            words(word_count)
        )
    }

    fn faq_patch(answer_words: usize) -> String {
        let entry = FaqEntry {
            question: "How exact is the factor?".to_string(),
            answer_html: format!("<p>{}</p>", words(answer_words)),
        };
        format!(
            r#"{{"faqs": [{}, {}]}}"#,
            serde_json::to_string(&entry).unwrap(),
            serde_json::to_string(&entry).unwrap()
        )
    }

    #[test]
    fn valid_content_triggers_zero_generator_calls() {
        let generator = FakeGenerator::new(vec![]);
        let validator = LengthValidator::new().expect("validator");
        let request = request_for("Bigha - Assam", "Acre", 0.1652);
        let mut content = content_within_range();
        let before = serde_json::to_string(&content).unwrap();

        let report =
            repair_lengths(&generator, &validator, &request, &mut content, 2).expect("repair");

        assert!(report.is_clean());
        assert_eq!(report.passes_used, 0);
        assert_eq!(report.sections_regenerated, 0);
        assert_eq!(generator.call_count(), 0);
        assert_eq!(serde_json::to_string(&content).unwrap(), before);
    }

    #[test]
    fn one_failing_section_is_fixed_in_one_pass() {
        let generator = FakeGenerator::new(vec![html_patch(SectionName::Technical, 170)]);
        let validator = LengthValidator::new().expect("validator");
        let request = request_for("Bigha - Assam", "Acre", 0.1652);
        let mut content = content_within_range();
        content.technical_details_html = format!("<p>{}</p>", words(30));

        let report =
            repair_lengths(&generator, &validator, &request, &mut content, 2).expect("repair");

        assert!(report.is_clean());
        assert_eq!(report.passes_used, 1);
        assert_eq!(report.sections_regenerated, 1);
        assert_eq!(generator.call_count(), 1);
        assert_eq!(validator.word_count(&content.technical_details_html), 170);
    }

    #[test]
    fn never_fixed_section_stops_at_the_pass_budget() {
        // Scripted replacements stay out of range, so every pass fails again.
        let generator = FakeGenerator::new(vec![
            html_patch(SectionName::Examples, 10),
            html_patch(SectionName::Examples, 10),
        ]);
        let validator = LengthValidator::new().expect("validator");
        let request = request_for("Bigha - Assam", "Acre", 0.1652);
        let mut content = content_within_range();
        content.examples_section_html = format!("<p>{}</p>", words(10));

        let report =
            repair_lengths(&generator, &validator, &request, &mut content, 2).expect("repair");

        assert!(!report.is_clean());
        assert_eq!(report.passes_used, 2);
        assert_eq!(generator.call_count(), 2);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].section, SectionName::Examples);
        assert_eq!(
            report.issues[0].expected,
            WordRange { min: 90, max: 200 }
        );
    }

    #[test]
    fn multiple_failing_faq_answers_regenerate_the_block_once() {
        let generator = FakeGenerator::new(vec![faq_patch(100)]);
        let validator = LengthValidator::new().expect("validator");
        let request = request_for("Bigha - Assam", "Acre", 0.1652);
        let mut content = content_within_range();
        content.faqs[0].answer_html = String::new();
        content.faqs[1].answer_html = String::new();

        let report =
            repair_lengths(&generator, &validator, &request, &mut content, 2).expect("repair");

        assert!(report.is_clean());
        assert_eq!(generator.call_count(), 1);
        assert_eq!(report.sections_regenerated, 1);
    }

    #[test]
    fn failing_sections_follow_canonical_order_within_a_pass() {
        // Break technical and why_convert; the regeneration prompts must
        // arrive why_convert first regardless of issue discovery order.
        let generator = FakeGenerator::new(vec![
            html_patch(SectionName::WhyConvert, 240),
            html_patch(SectionName::Technical, 170),
        ]);
        let validator = LengthValidator::new().expect("validator");
        let request = request_for("Bigha - Assam", "Acre", 0.1652);
        let mut content = content_within_range();
        content.technical_details_html = format!("<p>{}</p>", words(5));
        content.why_convert_section_html = format!("<p>{}</p>", words(5));

        let report =
            repair_lengths(&generator, &validator, &request, &mut content, 2).expect("repair");

        assert!(report.is_clean());
        let prompts = generator.prompts.borrow();
        assert!(prompts[0].contains("'why_convert'"));
        assert!(prompts[1].contains("'technical'"));
    }

    #[test]
    fn malformed_regeneration_response_is_an_error() {
        let generator = FakeGenerator::new(vec![r#"{"wrong_key": "x"}"#.to_string()]);
        let validator = LengthValidator::new().expect("validator");
        let request = request_for("Bigha - Assam", "Acre", 0.1652);
        let mut content = content_within_range();
        content.examples_section_html = String::new();

        let result = repair_lengths(&generator, &validator, &request, &mut content, 2);
        assert!(result.is_err());
    }
}
