use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::generate::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::model::SectionName;

#[derive(Parser, Debug)]
#[command(
    name = "areagen",
    version,
    about = "Batch generation of area-conversion SEO child pages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate every pair of the conversion matrix and persist the pages.
    Batch(BatchArgs),
    /// Generate one page for an explicit pair and print it.
    Generate(GenerateArgs),
    /// Regenerate a single section for an explicit pair and print the patch.
    Regen(RegenArgs),
    /// Report document-store counts.
    Status(StatusArgs),
}

/// What to do when the text-generation collaborator fails mid-batch.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FailurePolicy {
    /// Stop the whole batch on the first failed pair.
    Abort,
    /// Log the failed pair and continue with the next one.
    Skip,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputMode {
    /// Print the generated page content as-is.
    Raw,
    /// Print the mapped storage document.
    Doc,
}

#[derive(Args, Debug, Clone)]
pub struct GeneratorArgs {
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[arg(long, default_value = "area_conversion_matrix.csv")]
    pub csv_path: PathBuf,

    #[arg(long, default_value = ".cache/areagen/pages.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "area-convertor")]
    pub parent_slug: String,

    #[arg(long, default_value = "en-IN")]
    pub locale: String,

    #[arg(long, default_value = "sqy-india-web")]
    pub site_code: String,

    /// Fallback city if none is inferred from unit labels.
    #[arg(long, default_value = "Mumbai")]
    pub default_city: String,

    /// Limit number of pairs to process (0 = no limit).
    #[arg(long, default_value_t = 0)]
    pub limit_pairs: usize,

    /// Automatically regenerate sections that fail length validation.
    #[arg(long, default_value_t = false)]
    pub auto_fix_lengths: bool,

    /// Max validate-regenerate passes per page.
    #[arg(long, default_value_t = 2)]
    pub max_fix_passes: usize,

    /// Print documents instead of writing to the store.
    #[arg(long, default_value_t = false)]
    pub preview_only: bool,

    /// If set, write an HTML preview file per generated page here.
    #[arg(long)]
    pub html_out_dir: Option<PathBuf>,

    /// If set, write a batch run manifest JSON here.
    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = FailurePolicy::Abort)]
    pub on_generator_error: FailurePolicy,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

#[derive(Args, Debug, Clone)]
pub struct PairArgs {
    #[arg(long)]
    pub from_label: String,

    #[arg(long)]
    pub to_label: String,

    /// 1 FROM is approximately this many TO.
    #[arg(long)]
    pub factor: Option<f64>,

    #[arg(long)]
    pub from_region: Option<String>,

    #[arg(long)]
    pub to_region: Option<String>,

    #[arg(long)]
    pub city_name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub pair: PairArgs,

    #[arg(long, value_enum, default_value_t = OutputMode::Raw)]
    pub mode: OutputMode,

    #[arg(long, default_value = "area-convertor")]
    pub parent_slug: String,

    #[arg(long, default_value = "en-IN")]
    pub locale: String,

    #[arg(long, default_value = "sqy-india-web")]
    pub site_code: String,

    /// Report length issues after generation.
    #[arg(long, default_value_t = false)]
    pub validate_lengths: bool,

    /// Exit non-zero when length issues remain.
    #[arg(long, default_value_t = false)]
    pub strict_lengths: bool,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RegenArgs {
    #[arg(long, value_enum)]
    pub section: SectionName,

    #[command(flatten)]
    pub pair: PairArgs,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/areagen/pages.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "area-convertor")]
    pub parent_slug: String,
}
