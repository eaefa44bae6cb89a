mod render;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use veille_news::{Language, Pipeline, SearchParams};

#[derive(Debug, Parser)]
#[command(name = "veille-cli")]
#[command(about = "News watch with sentiment annotation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, annotate and print articles about the configured subject
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Extra keyword appended to the subject
    #[arg(long, short)]
    keyword: Option<String>,

    /// Language filter: fr, en, es or all
    #[arg(long, short, default_value = "fr")]
    language: Language,

    /// Number of articles to keep
    #[arg(
        long,
        short = 'n',
        default_value_t = SearchParams::DEFAULT_RESULTS,
        value_parser = clap::value_parser!(u32).range(
            i64::from(SearchParams::MIN_RESULTS)..=i64::from(SearchParams::MAX_RESULTS)
        )
    )]
    max_results: u32,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Markdown,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = veille_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run(&config, args).await,
    }
}

async fn run(config: &veille_core::AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let params = SearchParams::new(args.keyword, args.language, args.max_results)?;
    let pipeline = Pipeline::from_config(config)?;

    tracing::debug!(
        subject = %config.subject,
        keyword = ?params.keyword,
        language = %params.language,
        max_results = params.max_results,
        "starting run"
    );
    let output = pipeline.run(&config.subject, &params).await;

    if let Some(diagnostic) = &output.diagnostic {
        eprintln!("warning: {diagnostic}");
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Markdown => print!(
            "{}",
            render::render_markdown(&config.subject, &params, &output.articles)
        ),
        OutputFormat::Table => print!("{}", render::render_table(&output.articles)),
    }

    Ok(())
}
