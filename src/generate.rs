use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::limits::word_range;
use crate::model::{PageContent, PageRequest, SectionName};

/// Base prompt template for a full child page. Placeholders are substituted
/// textually; the word-count placeholders are filled from `limits` so the
/// instructions always match what the validator enforces.
pub const CHILD_PAGE_TEMPLATE: &str = include_str!("prompts/child_page.txt");

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// The text-generation collaborator boundary. Constructed explicitly and
/// passed into generation, regeneration and the repair loop, so tests can
/// substitute a scripted double.
pub trait TextGenerator {
    /// Send one prompt, return the model's raw text output.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// HTTP client for an OpenAI-style `/responses` endpoint.
pub struct OpenAiGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ResponsesReply {
    output: Vec<ResponseOutput>,
}

#[derive(Deserialize)]
struct ResponseOutput {
    content: Vec<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    text: String,
}

impl OpenAiGenerator {
    pub fn new(base_url: &str, model: &str, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        })
    }

    /// Reads the API key from `OPENAI_API_KEY`. A missing key is a startup
    /// error, reported before any pair is processed.
    pub fn from_env(base_url: &str, model: &str) -> Result<Self> {
        let api_key =
            std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
        Self::new(base_url, model, api_key)
    }
}

impl TextGenerator for OpenAiGenerator {
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/responses", self.base_url);
        debug!(url = %url, model = %self.model, "calling text generator");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "input": prompt,
            }))
            .send()
            .with_context(|| format!("text generator request failed: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("text generator returned {status}: {body}");
        }

        let reply: ResponsesReply = response
            .json()
            .context("failed to parse text generator response envelope")?;

        let text = reply
            .output
            .first()
            .and_then(|output| output.content.first())
            .map(|content| content.text.clone())
            .context("text generator response contained no text output")?;

        Ok(text)
    }
}

/// Render the full-page prompt. All optional request fields are resolved to
/// their documented defaults first, so no placeholder is left unsubstituted.
pub fn render_prompt(request: &PageRequest) -> String {
    let resolved = request.resolved();

    let mut text = CHILD_PAGE_TEMPLATE.to_string();
    let substitutions: [(&str, &str); 9] = [
        ("{{from_unit_code}}", &resolved.from_unit_code),
        ("{{from_unit_label}}", &resolved.from_unit_label),
        ("{{from_unit_region}}", &resolved.from_unit_region),
        ("{{to_unit_code}}", &resolved.to_unit_code),
        ("{{to_unit_label}}", &resolved.to_unit_label),
        ("{{to_unit_region}}", &resolved.to_unit_region),
        ("{{factor_to_unit}}", &resolved.factor_text),
        ("{{city_name}}", &resolved.city_name),
        ("{{direction_note}}", &resolved.direction_note),
    ];
    for (placeholder, value) in substitutions {
        text = text.replace(placeholder, value);
    }

    let ranges: [(&str, SectionName); 6] = [
        ("{{why_convert_words}}", SectionName::WhyConvert),
        ("{{from_unit_words}}", SectionName::FromUnit),
        ("{{to_unit_words}}", SectionName::ToUnit),
        ("{{examples_words}}", SectionName::Examples),
        ("{{technical_words}}", SectionName::Technical),
        ("{{faq_answer_words}}", SectionName::FaqBlock),
    ];
    for (placeholder, section) in ranges {
        text = text.replace(placeholder, &word_range(section).to_string());
    }

    text
}

/// Generate a full page for one conversion pair. A response that does not
/// deserialize into the exact `PageContent` schema is fatal for this pair;
/// schema mismatches are never retried here.
pub fn generate_page(
    generator: &dyn TextGenerator,
    request: &PageRequest,
) -> Result<PageContent> {
    let prompt = render_prompt(request);
    let raw = generator.complete(&prompt)?;

    let content: PageContent = serde_json::from_str(&raw).with_context(|| {
        format!(
            "generator response does not match the page content schema for {} -> {}",
            request.from_unit_label, request.to_unit_label
        )
    })?;

    Ok(content)
}
