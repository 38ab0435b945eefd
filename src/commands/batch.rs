use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::{BatchArgs, FailurePolicy};
use crate::generate::{OpenAiGenerator, TextGenerator, generate_page};
use crate::mapper::{DocumentIdentity, build_page_document};
use crate::matrix::{ConversionMatrix, ConversionPair};
use crate::model::{
    BatchCounts, BatchRunManifest, FlaggedPair, PageRequest, ValidationIssue,
};
use crate::repair::repair_lengths;
use crate::store::PageStore;
use crate::units::{build_slug, extract_region, guess_city, normalize_code};
use crate::util::{ensure_directory, now_utc_string, write_json_pretty};
use crate::validate::LengthValidator;

/// Per-pair settings shared across one batch run.
pub(crate) struct PairOptions {
    pub parent_slug: String,
    pub locale: String,
    pub site_code: String,
    pub default_city: String,
    pub auto_fix_lengths: bool,
    pub max_fix_passes: usize,
    pub preview_only: bool,
    pub html_out_dir: Option<PathBuf>,
}

pub(crate) struct PairOutcome {
    pub identity: DocumentIdentity,
    pub issues: Vec<ValidationIssue>,
}

pub fn run(args: BatchArgs) -> Result<()> {
    let started_at = now_utc_string();

    let matrix = ConversionMatrix::load(&args.csv_path)?;

    let generator =
        OpenAiGenerator::from_env(&args.generator.api_base_url, &args.generator.model)?;
    let validator = LengthValidator::new()?;

    let store = if args.preview_only {
        None
    } else {
        if let Some(parent) = args.db_path.parent() {
            ensure_directory(parent)?;
        }
        Some(PageStore::open(&args.db_path)?)
    };

    let options = PairOptions {
        parent_slug: args.parent_slug.clone(),
        locale: args.locale.clone(),
        site_code: args.site_code.clone(),
        default_city: args.default_city.clone(),
        auto_fix_lengths: args.auto_fix_lengths,
        max_fix_passes: args.max_fix_passes,
        preview_only: args.preview_only,
        html_out_dir: args.html_out_dir.clone(),
    };

    let mut pairs = matrix.pairs();
    if args.limit_pairs > 0 {
        pairs.truncate(args.limit_pairs);
    }

    info!(
        csv = %args.csv_path.display(),
        pairs = pairs.len(),
        auto_fix = args.auto_fix_lengths,
        preview_only = args.preview_only,
        "starting batch"
    );

    let (counts, flagged_pairs) = run_pairs(
        &generator,
        &validator,
        store.as_ref(),
        &options,
        &pairs,
        args.on_generator_error,
    )?;
    info!(
        processed = counts.pairs_processed,
        clean = counts.clean,
        with_issues = counts.with_issues,
        skipped_errors = counts.skipped_errors,
        "batch summary"
    );

    if let Some(report_path) = &args.report_path {
        let manifest = BatchRunManifest {
            manifest_version: 1,
            started_at,
            completed_at: now_utc_string(),
            csv_path: args.csv_path.display().to_string(),
            parent_slug: args.parent_slug,
            locale: args.locale,
            site_code: args.site_code,
            auto_fix_lengths: args.auto_fix_lengths,
            max_fix_passes: args.max_fix_passes,
            preview_only: args.preview_only,
            counts,
            flagged_pairs,
        };
        write_json_pretty(report_path, &manifest)?;
        info!(path = %report_path.display(), "wrote batch run manifest");
    }

    Ok(())
}

/// Drive all pairs through `process_pair`, applying the failure policy:
/// `Abort` propagates the first pair error, `Skip` logs it, bumps
/// `skipped_errors` and moves on.
pub(crate) fn run_pairs(
    generator: &dyn TextGenerator,
    validator: &LengthValidator,
    store: Option<&PageStore>,
    options: &PairOptions,
    pairs: &[ConversionPair],
    on_generator_error: FailurePolicy,
) -> Result<(BatchCounts, Vec<FlaggedPair>)> {
    let mut counts = BatchCounts::default();
    let mut flagged_pairs = Vec::new();

    for (idx, pair) in pairs.iter().enumerate() {
        info!(
            pair = idx + 1,
            from = %pair.from_label,
            to = %pair.to_label,
            factor = pair.factor,
            "processing pair"
        );

        match process_pair(generator, validator, store, options, pair) {
            Ok(outcome) => {
                counts.pairs_processed += 1;
                if outcome.issues.is_empty() {
                    counts.clean += 1;
                    info!(slug = %outcome.identity.slug, "all sections within desired length ranges");
                } else {
                    counts.with_issues += 1;
                    warn!(
                        slug = %outcome.identity.slug,
                        issues = outcome.issues.len(),
                        "persisted with remaining length issues"
                    );
                    for issue in &outcome.issues {
                        warn!(issue = %issue, "length issue");
                    }
                    flagged_pairs.push(FlaggedPair {
                        slug: outcome.identity.slug.clone(),
                        issues: outcome.issues.iter().map(ToString::to_string).collect(),
                    });
                }
            }
            Err(err) => match on_generator_error {
                FailurePolicy::Abort => {
                    return Err(err.context(format!(
                        "pair {} -> {} failed",
                        pair.from_label, pair.to_label
                    )));
                }
                FailurePolicy::Skip => {
                    counts.skipped_errors += 1;
                    warn!(
                        from = %pair.from_label,
                        to = %pair.to_label,
                        error = %err,
                        "pair failed; continuing with next pair"
                    );
                }
            },
        }
    }

    Ok((counts, flagged_pairs))
}

/// Generate, validate (and optionally repair) one child page, then persist
/// or preview it. Collaborator failures propagate as errors; remaining
/// length issues do not.
pub(crate) fn process_pair(
    generator: &dyn TextGenerator,
    validator: &LengthValidator,
    store: Option<&PageStore>,
    options: &PairOptions,
    pair: &ConversionPair,
) -> Result<PairOutcome> {
    let request = build_request(pair, &options.default_city);

    let mut content = generate_page(generator, &request)?;

    let issues = if options.auto_fix_lengths {
        let report = repair_lengths(
            generator,
            validator,
            &request,
            &mut content,
            options.max_fix_passes,
        )?;
        if report.passes_used > 0 {
            info!(
                passes = report.passes_used,
                sections_regenerated = report.sections_regenerated,
                "length repair applied"
            );
        }
        report.issues
    } else {
        validator.validate(&content)
    };

    let slug = build_slug(&request.from_unit_code, &request.to_unit_code);
    let identity = DocumentIdentity::new(
        &options.parent_slug,
        &slug,
        &options.locale,
        &options.site_code,
        &request.from_unit_code,
        &request.to_unit_code,
        &request.from_unit_label,
        &request.to_unit_label,
    );

    let document = build_page_document(&content, &identity, Utc::now());

    if let Some(html_out_dir) = &options.html_out_dir {
        write_preview_html(html_out_dir, &content, &identity, pair.factor)?;
    }

    if options.preview_only {
        let rendered = serde_json::to_string_pretty(&document)
            .with_context(|| format!("failed to render document for {slug}"))?;
        println!("{rendered}");
    } else if let Some(store) = store {
        store.upsert(&document)?;
    }

    Ok(PairOutcome { identity, issues })
}

fn build_request(pair: &ConversionPair, default_city: &str) -> PageRequest {
    let from_label = pair.from_label.trim().to_string();
    let to_label = pair.to_label.trim().to_string();

    PageRequest {
        from_unit_code: normalize_code(&from_label),
        to_unit_code: normalize_code(&to_label),
        from_unit_region: extract_region(&from_label),
        to_unit_region: extract_region(&to_label),
        city_name: Some(guess_city(&from_label, &to_label, default_city)),
        direction_note: Some(PageRequest::direction_note_for(&from_label, &to_label)),
        factor_to_unit: Some(pair.factor),
        from_unit_label: from_label,
        to_unit_label: to_label,
    }
}

fn write_preview_html(
    html_out_dir: &Path,
    content: &crate::model::PageContent,
    identity: &DocumentIdentity,
    factor: f64,
) -> Result<()> {
    ensure_directory(html_out_dir)?;
    let html = crate::preview::render_preview_page(content, identity, factor);
    let html_path = html_out_dir.join(format!("{}.html", identity.slug));
    fs::write(&html_path, html)
        .with_context(|| format!("failed to write preview {}", html_path.display()))?;
    info!(path = %html_path.display(), "wrote html preview");
    Ok(())
}
