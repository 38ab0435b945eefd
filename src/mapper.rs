use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::model::PageContent;

/// Base for canonical URLs embedded in SEO metadata.
pub const CANONICAL_BASE_URL: &str = "https://www.squareyards.com";

/// Identifying fields for one persisted child page. The first four fields
/// form the store's upsert key.
#[derive(Debug, Clone)]
pub struct DocumentIdentity {
    pub parent_slug: String,
    pub slug: String,
    pub locale: String,
    pub site_code: String,
    pub url_path: String,
    pub from_unit_code: String,
    pub to_unit_code: String,
    pub from_unit_label: String,
    pub to_unit_label: String,
}

impl DocumentIdentity {
    pub fn new(
        parent_slug: &str,
        slug: &str,
        locale: &str,
        site_code: &str,
        from_unit_code: &str,
        to_unit_code: &str,
        from_unit_label: &str,
        to_unit_label: &str,
    ) -> Self {
        Self {
            parent_slug: parent_slug.to_string(),
            slug: slug.to_string(),
            locale: locale.to_string(),
            site_code: site_code.to_string(),
            url_path: format!("/{parent_slug}/{slug}"),
            from_unit_code: from_unit_code.to_string(),
            to_unit_code: to_unit_code.to_string(),
            from_unit_label: from_unit_label.to_string(),
            to_unit_label: to_unit_label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoBlock {
    pub meta_title: String,
    pub meta_description: String,
    pub h1_heading: String,
    pub canonical_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhyConvertSection {
    pub section_heading: String,
    pub explanation_html: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandaloneSection {
    pub unit_code: String,
    pub section_heading: String,
    pub description_html: String,
    pub section_key: String,
    pub sort_order: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqDocEntry {
    pub question: String,
    pub answer_html: String,
    pub is_active: bool,
    pub sort_order: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamplesSection {
    pub content_html: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalDetailsSection {
    pub technical_explanation_html: String,
    pub conversion_table_rows: Vec<Value>,
    pub precision_notes_html: String,
}

/// Display and workflow toggles. Fixed product constants, not derived from
/// content.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    pub no_index: bool,
    pub include_in_sitemap: bool,
    pub enable_schema_markup: bool,
    pub show_breadcrumbs: bool,
    pub page_priority: f64,
    pub change_frequency: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            no_index: false,
            include_in_sitemap: true,
            enable_schema_markup: true,
            show_breadcrumbs: true,
            page_priority: 0.7,
            change_frequency: "monthly".to_string(),
        }
    }
}

/// Storage document for one conversion child page, shaped for the content
/// store's camelCase schema.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub parent_slug: String,
    pub slug: String,
    pub url_path: String,
    pub from_unit_code: String,
    pub to_unit_code: String,
    pub locale: String,
    pub site_code: String,
    pub status: String,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_updated_display_date: DateTime<Utc>,
    pub seo: SeoBlock,
    pub popular_conversions: Vec<Value>,
    pub why_convert_section: WhyConvertSection,
    pub standalone_sections: Vec<StandaloneSection>,
    pub faqs: Vec<FaqDocEntry>,
    pub examples_section: ExamplesSection,
    pub technical_details_section: TechnicalDetailsSection,
    pub page_settings: PageSettings,
}

/// Reshape validated page content into the storage document. Pure function:
/// same content, identity and `now` always produce the same document.
pub fn build_page_document(
    content: &PageContent,
    identity: &DocumentIdentity,
    now: DateTime<Utc>,
) -> PageDocument {
    PageDocument {
        parent_slug: identity.parent_slug.clone(),
        slug: identity.slug.clone(),
        url_path: identity.url_path.clone(),
        from_unit_code: identity.from_unit_code.clone(),
        to_unit_code: identity.to_unit_code.clone(),
        locale: identity.locale.clone(),
        site_code: identity.site_code.clone(),
        status: "draft".to_string(),
        version: 1,
        created_at: now,
        updated_at: now,
        last_updated_display_date: now,
        seo: SeoBlock {
            meta_title: content.seo_meta_title.clone(),
            meta_description: content.seo_meta_description.clone(),
            h1_heading: content.h1_heading.clone(),
            canonical_url: format!("{CANONICAL_BASE_URL}{}", identity.url_path),
        },
        // Managed manually via the CMS, left empty here.
        popular_conversions: Vec::new(),
        why_convert_section: WhyConvertSection {
            section_heading: format!(
                "Why convert {} to {}?",
                identity.from_unit_label, identity.to_unit_label
            ),
            explanation_html: content.why_convert_section_html.clone(),
        },
        standalone_sections: vec![
            StandaloneSection {
                unit_code: identity.from_unit_code.clone(),
                section_heading: format!("What is {}?", identity.from_unit_label),
                description_html: content.from_unit_section_html.clone(),
                section_key: "fromUnit".to_string(),
                sort_order: 1,
            },
            StandaloneSection {
                unit_code: identity.to_unit_code.clone(),
                section_heading: format!("What is {}?", identity.to_unit_label),
                description_html: content.to_unit_section_html.clone(),
                section_key: "toUnit".to_string(),
                sort_order: 2,
            },
        ],
        faqs: content
            .faqs
            .iter()
            .enumerate()
            .map(|(idx, faq)| FaqDocEntry {
                question: faq.question.clone(),
                answer_html: faq.answer_html.clone(),
                is_active: true,
                sort_order: idx + 1,
            })
            .collect(),
        examples_section: ExamplesSection {
            content_html: content.examples_section_html.clone(),
        },
        technical_details_section: TechnicalDetailsSection {
            technical_explanation_html: content.technical_details_html.clone(),
            conversion_table_rows: Vec::new(),
            precision_notes_html: String::new(),
        },
        page_settings: PageSettings::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::tests::content_within_range;
    use chrono::TimeZone;

    fn identity() -> DocumentIdentity {
        DocumentIdentity::new(
            "area-convertor",
            "bigha-assam-to-acre",
            "en-IN",
            "sqy-india-web",
            "BIGHA_ASSAM",
            "ACRE",
            "Bigha - Assam",
            "Acre",
        )
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn mapper_is_deterministic_for_fixed_timestamp() {
        let content = content_within_range();
        let first = build_page_document(&content, &identity(), fixed_now());
        let second = build_page_document(&content, &identity(), fixed_now());

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn faq_sort_order_is_one_indexed_by_position() {
        let content = content_within_range();
        let doc = build_page_document(&content, &identity(), fixed_now());

        let orders: Vec<usize> = doc.faqs.iter().map(|faq| faq.sort_order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert!(doc.faqs.iter().all(|faq| faq.is_active));
    }

    #[test]
    fn standalone_sections_keep_from_before_to() {
        let content = content_within_range();
        let doc = build_page_document(&content, &identity(), fixed_now());

        assert_eq!(doc.standalone_sections.len(), 2);
        assert_eq!(doc.standalone_sections[0].section_key, "fromUnit");
        assert_eq!(doc.standalone_sections[0].sort_order, 1);
        assert_eq!(doc.standalone_sections[0].unit_code, "BIGHA_ASSAM");
        assert_eq!(doc.standalone_sections[1].section_key, "toUnit");
        assert_eq!(
            doc.standalone_sections[1].section_heading,
            "What is Acre?"
        );
    }

    #[test]
    fn document_serializes_with_camel_case_schema() {
        let content = content_within_range();
        let doc = build_page_document(&content, &identity(), fixed_now());
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["parentSlug"], "area-convertor");
        assert_eq!(value["slug"], "bigha-assam-to-acre");
        assert_eq!(value["urlPath"], "/area-convertor/bigha-assam-to-acre");
        assert_eq!(
            value["seo"]["canonicalUrl"],
            "https://www.squareyards.com/area-convertor/bigha-assam-to-acre"
        );
        assert_eq!(value["status"], "draft");
        assert_eq!(value["pageSettings"]["includeInSitemap"], true);
        assert_eq!(value["pageSettings"]["changeFrequency"], "monthly");
        assert_eq!(value["pageSettings"]["noIndex"], false);
    }
}
