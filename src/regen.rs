use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::generate::{TextGenerator, render_prompt};
use crate::limits::word_range;
use crate::model::{FaqEntry, PageContent, PageRequest, SectionName};

/// Replacement produced by a single-section regeneration. Applying a patch
/// splices one section into the page content without touching its siblings.
#[derive(Debug, Clone)]
pub enum SectionPatch {
    Html { section: SectionName, html: String },
    Faqs(Vec<FaqEntry>),
}

impl SectionPatch {
    pub fn apply(self, content: &mut PageContent) {
        match self {
            Self::Html { section, html } => match section {
                SectionName::WhyConvert => content.why_convert_section_html = html,
                SectionName::FromUnit => content.from_unit_section_html = html,
                SectionName::ToUnit => content.to_unit_section_html = html,
                SectionName::Examples => content.examples_section_html = html,
                SectionName::Technical => content.technical_details_html = html,
                // parse_section_patch always maps faq_block to Self::Faqs.
                SectionName::FaqBlock => {
                    unreachable!("faq_block replacements are carried as SectionPatch::Faqs")
                }
            },
            Self::Faqs(faqs) => content.faqs = faqs,
        }
    }
}

/// Per-section regeneration instruction. The word ranges are rendered from
/// the same `limits` table the validator reads, never written out by hand.
fn section_instruction(section: SectionName) -> String {
    let range = word_range(section);
    match section {
        SectionName::WhyConvert => format!(
            "Regenerate the WHY CONVERT section html, respecting the {range} word constraint."
        ),
        SectionName::FromUnit => format!(
            "Regenerate the FROM UNIT section html ('What is FROM'), {range} words, \
             with history and usage domains."
        ),
        SectionName::ToUnit => format!(
            "Regenerate the TO UNIT section html ('What is TO'), {range} words, \
             with history and usage domains."
        ),
        SectionName::Examples => format!(
            "Regenerate the EXAMPLES section html, {range} words, with 3-5 practical conversions."
        ),
        SectionName::Technical => format!(
            "Regenerate the TECHNICAL DETAILS section html, {range} words, \
             with a clear explanation."
        ),
        SectionName::FaqBlock => format!(
            "Regenerate the entire FAQ block as an array of 4-5 FAQs \
             (question + answer_html), each answer {range} words."
        ),
    }
}

/// Build the prompt for regenerating exactly one section. The base page
/// prompt is restated for stylistic consistency, then overridden with a
/// single-section directive that forbids emitting the full document.
pub fn build_section_prompt(section: SectionName, request: &PageRequest) -> String {
    let base_context = render_prompt(request);
    let resolved = request.resolved();

    let directive = format!(
        "This is a SECTION REGENERATION request. You must ONLY regenerate the section \
         '{section}' for a page that converts FROM {from} TO {to}. Do not change the \
         direction and do not generate the full JSON. Return ONLY a JSON object with a \
         single key matching the section.",
        from = resolved.from_unit_label,
        to = resolved.to_unit_label,
    );

    format!(
        "{base_context}\n\n{directive}\n\n\
         Use the following context:\n\
         - FROM unit code: {from_code}\n\
         - FROM unit label: {from_label}\n\
         - FROM unit region: {from_region}\n\
         - TO unit code: {to_code}\n\
         - TO unit label: {to_label}\n\
         - TO unit region: {to_region}\n\
         - Approximate factor (1 FROM \u{2248} X TO): {factor}\n\
         - Primary city context: {city}\n\n\
         {instruction}\n\n\
         Output format:\n\
         Return a single JSON object whose only key is \"{key}\".\n\
         Do NOT wrap the JSON in backticks.",
        from_code = resolved.from_unit_code,
        from_label = resolved.from_unit_label,
        from_region = resolved.from_unit_region,
        to_code = resolved.to_unit_code,
        to_label = resolved.to_unit_label,
        to_region = resolved.to_unit_region,
        factor = resolved.factor_text,
        city = resolved.city_name,
        instruction = section_instruction(section),
        key = section.response_key(),
    )
}

/// Parse a regeneration response: a JSON object holding exactly the expected
/// key. Any other shape is an error for this attempt, never silently applied.
fn parse_section_patch(section: SectionName, raw: &str) -> Result<SectionPatch> {
    let value: Value = serde_json::from_str(raw)
        .with_context(|| format!("regeneration response for '{section}' is not valid JSON"))?;

    let Value::Object(object) = value else {
        bail!("regeneration response for '{section}' is not a JSON object");
    };

    let expected_key = section.response_key();
    if object.len() != 1 || !object.contains_key(expected_key) {
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        bail!(
            "regeneration response for '{section}' must contain exactly the key \
             '{expected_key}', got: [{}]",
            keys.join(", ")
        );
    }

    let inner = object
        .get(expected_key)
        .cloned()
        .unwrap_or(Value::Null);

    if section == SectionName::FaqBlock {
        let faqs: Vec<FaqEntry> = serde_json::from_value(inner)
            .with_context(|| format!("'{expected_key}' is not a valid FAQ array"))?;
        Ok(SectionPatch::Faqs(faqs))
    } else {
        let html: String = serde_json::from_value(inner)
            .with_context(|| format!("'{expected_key}' is not a string"))?;
        Ok(SectionPatch::Html { section, html })
    }
}

/// Ask the collaborator to regenerate one section with the same directional
/// context used for full generation.
pub fn regenerate_section(
    generator: &dyn TextGenerator,
    section: SectionName,
    request: &PageRequest,
) -> Result<SectionPatch> {
    let prompt = build_section_prompt(section, request);
    let raw = generator.complete(&prompt)?;
    parse_section_patch(section, &raw)
}
