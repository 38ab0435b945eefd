use crate::mapper::{CANONICAL_BASE_URL, DocumentIdentity};
use crate::model::PageContent;

/// Render a standalone HTML page for previewing one child page without a
/// CMS. Used in preview mode only; the persisted document never embeds this
/// markup.
pub fn render_preview_page(
    content: &PageContent,
    identity: &DocumentIdentity,
    factor: f64,
) -> String {
    let canonical = format!("{CANONICAL_BASE_URL}{}", identity.url_path);

    let faqs_html: String = content
        .faqs
        .iter()
        .map(|faq| {
            format!(
                "<div class='faq-item'><h3>{}</h3>{}</div>",
                faq.question, faq.answer_html
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <meta name="description" content="{description}" />
  <link rel="canonical" href="{canonical}" />
  <style>
    body {{
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
      max-width: 960px;
      margin: 2rem auto;
      padding: 0 1.5rem 3rem;
      line-height: 1.6;
      color: #222;
      background: #fafafa;
    }}
    header {{
      border-bottom: 1px solid #ddd;
      margin-bottom: 1.5rem;
      padding-bottom: 0.5rem;
    }}
    h1 {{ font-size: 1.9rem; margin-bottom: 0.5rem; }}
    h2 {{
      margin-top: 2rem;
      font-size: 1.4rem;
      border-bottom: 1px solid #eee;
      padding-bottom: 0.25rem;
    }}
    h3 {{ margin-top: 1.25rem; font-size: 1.1rem; }}
    .meta {{ font-size: 0.9rem; color: #555; }}
    .meta span {{ display: inline-block; margin-right: 1rem; }}
    .section {{
      margin-top: 1.5rem;
      background: #fff;
      padding: 1.25rem 1rem;
      border-radius: 6px;
      box-shadow: 0 1px 2px rgba(0,0,0,0.04);
    }}
    .section p {{ margin: 0.35rem 0; }}
    .faq-item {{
      margin-bottom: 1rem;
      padding-bottom: 0.75rem;
      border-bottom: 1px dashed #e0e0e0;
    }}
  </style>
</head>
<body>
  <header>
    <h1>{h1}</h1>
    <div class="meta">
      <span><strong>Slug:</strong> {slug}</span>
      <span><strong>URL path:</strong> {url_path}</span>
      <span><strong>From:</strong> {from_label}</span>
      <span><strong>To:</strong> {to_label}</span>
      <span><strong>Factor:</strong> 1 {from_label} &asymp; {factor} {to_label}</span>
      <span><strong>Locale:</strong> {locale}</span>
      <span><strong>Site:</strong> {site_code}</span>
    </div>
  </header>

  <section class="section">
    <h2>Why convert {from_label} to {to_label}?</h2>
    {why_html}
  </section>

  <section class="section">
    <h2>What is {from_label}?</h2>
    {from_html}
  </section>

  <section class="section">
    <h2>What is {to_label}?</h2>
    {to_html}
  </section>

  <section class="section">
    <h2>Examples: {from_label} to {to_label}</h2>
    {examples_html}
  </section>

  <section class="section">
    <h2>Technical details</h2>
    {tech_html}
  </section>

  <section class="section">
    <h2>FAQs</h2>
    {faqs_html}
  </section>
</body>
</html>
"#,
        title = content.seo_meta_title,
        description = content.seo_meta_description,
        canonical = canonical,
        h1 = content.h1_heading,
        slug = identity.slug,
        url_path = identity.url_path,
        from_label = identity.from_unit_label,
        to_label = identity.to_unit_label,
        factor = factor,
        locale = identity.locale,
        site_code = identity.site_code,
        why_html = content.why_convert_section_html,
        from_html = content.from_unit_section_html,
        to_html = content.to_unit_section_html,
        examples_html = content.examples_section_html,
        tech_html = content.technical_details_html,
        faqs_html = faqs_html,
    )
}
