use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::cli::RegenArgs;
use crate::commands::generate::request_from_pair_args;
use crate::generate::OpenAiGenerator;
use crate::regen::{SectionPatch, regenerate_section};

pub fn run(args: RegenArgs) -> Result<()> {
    let generator =
        OpenAiGenerator::from_env(&args.generator.api_base_url, &args.generator.model)?;
    let request = request_from_pair_args(&args.pair);

    info!(
        section = %args.section,
        from = %request.from_unit_label,
        to = %request.to_unit_label,
        "regenerating single section"
    );

    let patch = regenerate_section(&generator, args.section, &request)?;

    let value = match patch {
        SectionPatch::Html { section, html } => {
            let mut object = Map::new();
            object.insert(section.response_key().to_string(), Value::String(html));
            Value::Object(object)
        }
        SectionPatch::Faqs(faqs) => json!({ "faqs": faqs }),
    };

    let rendered =
        serde_json::to_string_pretty(&value).context("failed to render section patch")?;
    println!("{rendered}");
    Ok(())
}
