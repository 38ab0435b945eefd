use crate::model::{SectionName, WordRange};

/// Desired word-count range per section. This is the single source of truth:
/// the length validator compares against it and the prompt builders embed it
/// in their instructions, so the two can never drift apart.
pub fn word_range(section: SectionName) -> WordRange {
    match section {
        SectionName::WhyConvert => WordRange { min: 220, max: 260 },
        SectionName::FromUnit | SectionName::ToUnit => WordRange { min: 230, max: 290 },
        SectionName::Examples => WordRange { min: 90, max: 200 },
        SectionName::Technical => WordRange { min: 150, max: 200 },
        // Applies to each FAQ answer individually, not the block as a whole.
        SectionName::FaqBlock => WordRange { min: 90, max: 140 },
    }
}
