use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use pfe_sim_abstract::{SimConfig, SimConfigOverride, WorkerConfig};
use pfe_sim_loader::spec::parse_method_list;
use pfe_sim_loader::{CorpusFormat, FontLoader, LanguageFilter, MethodLoader, load_corpus};
use pfe_sim_simulator::{ReportBuilder, ReportFormat, Simulation};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputFormat {
    /// JSON data set of page view sequences.
    Structured,
    /// JSON array of {URL, Contents} records forming one sequence.
    Simplified,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Binary,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Progressive font enrichment simulator")]
struct Args {
    /// Page view corpus to simulate.
    #[arg(long)]
    input: PathBuf,

    #[arg(long, value_enum, default_value_t = InputFormat::Structured)]
    input_format: InputFormat,

    /// Directory the fonts named in the corpus are read from.
    #[arg(long)]
    font_directory: PathBuf,

    /// Font used for contents with no font id.
    #[arg(long)]
    default_font_id: Option<String>,

    /// Comma separated methods to simulate.
    #[arg(long, default_value = "WholeFont")]
    methods: String,

    /// Worker threads; overrides the config file.
    #[arg(long)]
    workers: Option<usize>,

    /// Only simulate sequences tagged with these languages.
    #[arg(long, value_delimiter = ',')]
    filter_languages: Vec<String>,

    /// One of latin, arabic_indic or cjk. Takes precedence over --filter-languages.
    #[arg(long)]
    script_category: Option<String>,

    /// TOML file overriding cost, bucket and network model settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the report. Text reports go to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output_format: OutputFormat,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    info!("pfe-sim starting…");

    let config = args.sim_config()?;
    let methods = MethodLoader::new().load_all(parse_method_list(&args.methods)?)?;
    let filter = LanguageFilter::new(&args.filter_languages, args.script_category.as_deref())?;

    let sequences = load_corpus(
        &args.input,
        args.input_format.into(),
        config.default_font_id.as_deref(),
    )
    .with_context(|| format!("Failed to load corpus {}", args.input.display()))?;
    let sequences = filter.apply(sequences);

    let worker_config = WorkerConfig {
        font_directory: args.font_directory.clone(),
        default_font_id: config.default_font_id.clone(),
    };
    let results = Simulation::new(&methods, &config.network_models).run(
        &sequences,
        config.workers,
        &worker_config,
        FontLoader::from_config,
    )?;
    if results.dropped_sequence_count() > 0 {
        warn!(
            "Dropped {} of {} sequence(s)",
            results.dropped_sequence_count(),
            sequences.len()
        );
    }

    let report = ReportBuilder::new(&config).build(&results)?;
    let format = ReportFormat::from(args.output_format);
    match &args.output {
        Some(path) => report.write(path, format)?,
        None => {
            let data = match format {
                ReportFormat::Text => report.to_text()?.into_bytes(),
                ReportFormat::Binary => anyhow::bail!("--output is required for binary reports"),
            };
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.write_all(b"\n")?;
        }
    }

    info!("Simulation complete");
    Ok(())
}

impl Args {
    /// Defaults, then the config file, then command line flags.
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = SimConfig::default();
        if let Some(path) = &self.config {
            let overrides = SimConfigOverride::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            overrides.apply_to(&mut config);
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(id) = &self.default_font_id {
            config.default_font_id = Some(id.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

impl From<InputFormat> for CorpusFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Structured => CorpusFormat::Structured,
            InputFormat::Simplified => CorpusFormat::Simplified,
        }
    }
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Binary => ReportFormat::Binary,
        }
    }
}
