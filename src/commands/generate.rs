use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::{GenerateArgs, OutputMode, PairArgs};
use crate::generate::{OpenAiGenerator, generate_page};
use crate::mapper::{DocumentIdentity, build_page_document};
use crate::model::PageRequest;
use crate::units::{build_slug, extract_region, guess_city, normalize_code};
use crate::validate::LengthValidator;

pub fn run(args: GenerateArgs) -> Result<()> {
    let generator =
        OpenAiGenerator::from_env(&args.generator.api_base_url, &args.generator.model)?;
    let request = request_from_pair_args(&args.pair);

    info!(
        from = %request.from_unit_label,
        to = %request.to_unit_label,
        "generating single page"
    );

    let content = generate_page(&generator, &request)?;

    if args.validate_lengths || args.strict_lengths {
        let validator = LengthValidator::new()?;
        let issues = validator.validate(&content);
        if !issues.is_empty() {
            for issue in &issues {
                warn!(issue = %issue, "length issue");
            }
            if args.strict_lengths {
                bail!("{} length validation issues", issues.len());
            }
        }
    }

    let rendered = match args.mode {
        OutputMode::Raw => serde_json::to_string_pretty(&content)
            .context("failed to render page content")?,
        OutputMode::Doc => {
            let slug = build_slug(&request.from_unit_code, &request.to_unit_code);
            let identity = DocumentIdentity::new(
                &args.parent_slug,
                &slug,
                &args.locale,
                &args.site_code,
                &request.from_unit_code,
                &request.to_unit_code,
                &request.from_unit_label,
                &request.to_unit_label,
            );
            let document = build_page_document(&content, &identity, Utc::now());
            serde_json::to_string_pretty(&document).context("failed to render document")?
        }
    };

    println!("{rendered}");
    Ok(())
}

/// Shared by the one-off `generate` and `regen` commands: explicit flags win
/// over inference from the labels.
pub(crate) fn request_from_pair_args(pair: &PairArgs) -> PageRequest {
    let from_label = pair.from_label.trim().to_string();
    let to_label = pair.to_label.trim().to_string();

    PageRequest {
        from_unit_code: normalize_code(&from_label),
        to_unit_code: normalize_code(&to_label),
        from_unit_region: pair
            .from_region
            .clone()
            .or_else(|| extract_region(&from_label)),
        to_unit_region: pair.to_region.clone().or_else(|| extract_region(&to_label)),
        city_name: pair
            .city_name
            .clone()
            .or_else(|| Some(guess_city(&from_label, &to_label, "Mumbai"))),
        direction_note: Some(PageRequest::direction_note_for(&from_label, &to_label)),
        factor_to_unit: pair.factor,
        from_unit_label: from_label,
        to_unit_label: to_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_region_and_city_flags_override_inference() {
        let pair = PairArgs {
            from_label: "Bigha - Assam".to_string(),
            to_label: "Acre".to_string(),
            factor: Some(0.1652),
            from_region: Some("Lower Assam".to_string()),
            to_region: None,
            city_name: Some("Dibrugarh".to_string()),
        };

        let request = request_from_pair_args(&pair);
        assert_eq!(request.from_unit_region.as_deref(), Some("Lower Assam"));
        assert_eq!(request.to_unit_region, None);
        assert_eq!(request.city_name.as_deref(), Some("Dibrugarh"));
    }

    #[test]
    fn labels_are_trimmed_and_inferred_without_flags() {
        let pair = PairArgs {
            from_label: "  Bigha - Assam ".to_string(),
            to_label: " Acre ".to_string(),
            factor: None,
            from_region: None,
            to_region: None,
            city_name: None,
        };

        let request = request_from_pair_args(&pair);
        assert_eq!(request.from_unit_label, "Bigha - Assam");
        assert_eq!(request.from_unit_code, "BIGHA_ASSAM");
        assert_eq!(request.from_unit_region.as_deref(), Some("Assam"));
        assert_eq!(request.city_name.as_deref(), Some("Guwahati"));
        assert_eq!(request.factor_to_unit, None);
    }
}
