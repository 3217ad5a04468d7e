use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use auto_resolver::assess::Assessor;
use auto_resolver::config::ResolverConfig;
use auto_resolver::error::Result;
use auto_resolver::render;
use auto_resolver::resolver::ConsensusResolver;
use auto_resolver::source::{FileSource, QuestionFilter, QuestionRef};

#[derive(Parser)]
#[command(name = "auto-resolver", about = "Resolve and assess forecasting questions")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "resolver.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess the consensus resolver over a JSON question file and write a
    /// markdown report.
    Assess {
        /// JSON file holding an array of questions.
        #[arg(long)]
        questions: PathBuf,

        /// Restrict the run to these question ids.
        #[arg(long)]
        id: Vec<u64>,

        /// Override the configured report directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Resolve one question and print the verdict.
    Resolve {
        /// JSON file holding an array of questions.
        #[arg(long)]
        questions: PathBuf,

        /// Question id to resolve.
        #[arg(long)]
        id: u64,
    },
    /// Write the default configuration to the config path.
    InitConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("auto_resolver=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("auto_resolver=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = ResolverConfig::load(&cli.config).await?;

    match cli.command {
        Commands::Assess {
            questions,
            id,
            output_dir,
        } => cmd_assess(&config, questions, id, output_dir).await,
        Commands::Resolve { questions, id } => cmd_resolve(&config, questions, id).await,
        Commands::InitConfig => cmd_init_config(&config, &cli.config).await,
    }
}

fn consensus_assessor(
    config: &ResolverConfig,
    questions: PathBuf,
) -> Assessor<ConsensusResolver, FileSource> {
    let resolver = ConsensusResolver::new(
        config.assessment.consensus_positive_threshold,
        config.assessment.consensus_negative_threshold,
    );
    Assessor::new(resolver, FileSource::new(questions)).with_config(config.assessment.clone())
}

async fn cmd_assess(
    config: &ResolverConfig,
    questions: PathBuf,
    ids: Vec<u64>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let assessor = consensus_assessor(config, questions);

    let report = if ids.is_empty() {
        assessor.assess_matching(&QuestionFilter::default()).await?
    } else {
        let references: Vec<QuestionRef> = ids.into_iter().map(QuestionRef::Id).collect();
        assessor.assess_refs(&references).await?
    };

    println!("{}", render::render_summary(&report));
    println!(
        "Assessed {} questions, accuracy {:.1}%",
        report.total_assessed(),
        report.accuracy() * 100.0
    );

    let dir = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
    let path = render::write_report(&report, &dir).await?;
    println!("Report written to {}", path.display());
    Ok(())
}

async fn cmd_resolve(config: &ResolverConfig, questions: PathBuf, id: u64) -> Result<()> {
    let assessor = consensus_assessor(config, questions);
    let (verdict, metadata) = assessor.resolve_single(&QuestionRef::Id(id)).await?;

    match verdict.resolution() {
        Some(resolution) => println!("Question {} resolves: {}", id, resolution),
        None => println!("Question {} could not be resolved", id),
    }
    if let Some(metadata) = metadata {
        println!("Reasoning: {}", metadata.reasoning);
        for item in metadata.key_evidence {
            println!("  - {}", item);
        }
    }
    Ok(())
}

async fn cmd_init_config(config: &ResolverConfig, path: &PathBuf) -> Result<()> {
    config.save(path).await?;
    println!("Configuration written to {}", path.display());
    Ok(())
}
