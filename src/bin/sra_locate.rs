use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use sra_locator::app::Locator;
use sra_locator::config::{ClientConfig, ConfigLoader};
use sra_locator::domain::{FileNaming, LibraryLayout, SraId};
use sra_locator::error::SraError;
use sra_locator::eutils::EutilsHttpClient;
use sra_locator::fastq::FastqUrlBuilder;
use sra_locator::output::{JsonOutput, OutputMode, TextOutput};

#[derive(Parser)]
#[command(name = "sra-locate")]
#[command(about = "Resolve SRA accessions to run accessions and FASTQ download URLs")]
#[command(version, author)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    #[arg(long, global = true, help = "JSON config file (default: ./sra-locator.json if present)")]
    config: Option<String>,

    #[arg(long, global = true, help = "NCBI API key (overrides NCBI_API_KEY)")]
    api_key: Option<String>,

    #[arg(long, global = true)]
    naming: Option<FileNaming>,

    #[arg(long, global = true, help = "Read library layout from experiment metadata")]
    layout: bool,

    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Resolve a search term to its numeric SRA id")]
    Resolve { term: String },
    #[command(about = "List run accessions of a numeric SRA id")]
    Runs { id: String },
    #[command(about = "Build FASTQ URLs for a run accession")]
    Url(UrlArgs),
    #[command(about = "Resolve a search term all the way to FASTQ URLs")]
    Locate { term: String },
}

#[derive(Args)]
struct UrlArgs {
    accession: String,

    #[arg(long, help = "Run is paired-end (explicit naming only)")]
    paired: bool,

    #[arg(long, conflicts_with = "paired", help = "Run is single-end (explicit naming only)")]
    single: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<SraError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SraError) -> u8 {
    match error {
        SraError::NotFound(_)
        | SraError::AmbiguousResult { .. }
        | SraError::InvalidAccession(_)
        | SraError::InvalidSraId(_) => 2,
        SraError::Transport(_) | SraError::HttpStatus { .. } | SraError::BadResponse(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli.global)?;
    let output_mode = if cli.global.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let client = EutilsHttpClient::new(&config)?;
    let locator = Locator::new(client, FastqUrlBuilder::from_config(&config));

    match cli.command {
        Commands::Resolve { term } => match output_mode {
            OutputMode::Json => {
                let result = locator.resolve(&term, &JsonOutput)?;
                JsonOutput::print_resolve(&result).into_diagnostic()
            }
            OutputMode::Text => {
                let result = locator.resolve(&term, &TextOutput)?;
                TextOutput::print_resolve(&result).into_diagnostic()
            }
        },
        Commands::Runs { id } => {
            let id: SraId = id.parse()?;
            match output_mode {
                OutputMode::Json => {
                    let result = locator.runs(&id, &JsonOutput)?;
                    JsonOutput::print_runs(&result).into_diagnostic()
                }
                OutputMode::Text => {
                    let result = locator.runs(&id, &TextOutput)?;
                    TextOutput::print_runs(&result).into_diagnostic()
                }
            }
        }
        Commands::Url(args) => {
            let layout = if args.paired {
                Some(LibraryLayout::Paired)
            } else if args.single {
                Some(LibraryLayout::Single)
            } else {
                None
            };
            let result = locator.urls(&args.accession, layout)?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_urls(&result).into_diagnostic(),
                OutputMode::Text => TextOutput::print_urls(&result).into_diagnostic(),
            }
        }
        Commands::Locate { term } => match output_mode {
            OutputMode::Json => {
                let result = locator.locate(&term, &JsonOutput)?;
                JsonOutput::print_locate(&result).into_diagnostic()
            }
            OutputMode::Text => {
                let result = locator.locate(&term, &TextOutput)?;
                TextOutput::print_locate(&result).into_diagnostic()
            }
        },
    }
}

fn build_config(args: &GlobalArgs) -> Result<ClientConfig, SraError> {
    let mut config = ConfigLoader::resolve(args.config.as_deref())?;
    config.override_api_key(args.api_key.as_deref());
    if let Some(naming) = args.naming {
        config.naming = naming;
    }
    if args.layout {
        config.include_layout = true;
    }
    Ok(config)
}
