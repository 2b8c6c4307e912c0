//! `meeting-rag`: ask questions about meeting records, inspect raw retrieval,
//! and run the accuracy evaluation.

mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use meeting_eval::{EvaluationHarness, HarnessConfig, QuerySpec};
use meeting_rag::mistral::{self, MistralGenerator};
use meeting_rag::openai::{self, OpenAICompatibleEmbeddingProvider};
use meeting_rag::{
    AnswerSynthesizer, Category, DEFAULT_BATCH_SIZE, FragmentFilter, FragmentStore,
    InMemoryFragmentStore, RagConfig, RagOrchestrator, Retriever, load_directory,
};
use meeting_telemetry::{LogFormat, NoopSink, TelemetrySink, TracingSink, init_logging};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "meeting-rag", version, about = "Meeting-record retrieval and answer generation")]
struct Cli {
    /// Directory of embedding files to load.
    #[arg(long, env = "EMBEDDINGS_DIR", default_value = "embeddings", global = true)]
    embeddings_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    log_format: LogFormatArg,

    /// Record pipeline telemetry events in the log.
    #[arg(long, global = true)]
    telemetry: bool,

    #[command(flatten)]
    providers: ProviderArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ProviderArgs {
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true, global = true)]
    mistral_api_key: Option<String>,

    #[arg(long, env = "MISTRAL_MODEL", default_value = mistral::DEFAULT_MODEL, global = true)]
    mistral_model: String,

    #[arg(long, env = "MISTRAL_BASE_URL", default_value = mistral::DEFAULT_BASE_URL, global = true)]
    mistral_base_url: String,

    #[arg(long, env = "EMBEDDING_BASE_URL", default_value = openai::DEFAULT_BASE_URL, global = true)]
    embedding_base_url: String,

    #[arg(long, env = "EMBEDDING_MODEL", default_value = openai::DEFAULT_MODEL, global = true)]
    embedding_model: String,

    #[arg(long, env = "EMBEDDING_DIMENSIONS", default_value_t = openai::DEFAULT_DIMENSIONS, global = true)]
    embedding_dimensions: usize,

    #[arg(long, env = "EMBEDDING_API_KEY", hide_env_values = true, global = true)]
    embedding_api_key: Option<String>,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Maximum number of fragments to retrieve. Defaults to the configured limit.
    #[arg(short, long)]
    limit: Option<usize>,

    /// Only fragments of this type (minute, action_item, key_insight).
    #[arg(long = "type")]
    category: Option<Category>,

    /// Only fragments from this meeting.
    #[arg(long)]
    meeting: Option<String>,
}

impl FilterArgs {
    fn filter(&self) -> FragmentFilter {
        FragmentFilter { category: self.category, record_id: self.meeting.clone() }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer a question from the meeting records.
    Query {
        query: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Also print the top retrieved fragments.
        #[arg(long)]
        detailed: bool,
    },
    /// Retrieve fragments without generating an answer.
    Search {
        query: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Run the accuracy evaluation and write a JSON report.
    Evaluate {
        /// JSON file of labeled queries. Defaults to the built-in set.
        #[arg(long)]
        queries: Option<PathBuf>,
        #[arg(long, default_value = "accuracy_evaluation_results.json")]
        output: PathBuf,
        /// Retrieval limit per query. Defaults to the configured limit.
        #[arg(long)]
        limit: Option<usize>,
        /// Queries evaluated at once.
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
    /// Show statistics for the loaded collection.
    Stats,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_format.into()).context("failed to initialize logging")?;

    let telemetry: Arc<dyn TelemetrySink> =
        if cli.telemetry { Arc::new(TracingSink) } else { Arc::new(NoopSink) };
    let config = RagConfig::default();

    match &cli.command {
        Command::Query { query, filter, detailed } => {
            let limit = config.limit_or_default(filter.limit);
            let orchestrator = build_orchestrator(&cli, config, telemetry).await?;
            let answer = orchestrator.answer(query, limit, &filter.filter()).await?;
            display::print_answer(&answer, *detailed);
        }
        Command::Search { query, filter } => {
            let store = load_store(&cli.embeddings_dir, cli.providers.embedding_dimensions).await?;
            let retriever =
                Retriever::new(build_embedder(&cli.providers)?, store)?.with_telemetry(telemetry);
            let results = retriever
                .retrieve(query, config.limit_or_default(filter.limit), &filter.filter())
                .await?;
            display::print_results(query, &results);
        }
        Command::Evaluate { queries, output, limit, concurrency } => {
            let specs = match queries {
                Some(path) => QuerySpec::load_file(path)
                    .await
                    .with_context(|| format!("failed to load queries from {}", path.display()))?,
                None => QuerySpec::default_set(),
            };
            let limit = config.limit_or_default(*limit);
            let orchestrator = build_orchestrator(&cli, config, telemetry).await?;
            let harness = EvaluationHarness::new(Arc::new(orchestrator))
                .with_config(HarnessConfig { limit, concurrency: *concurrency })?;

            let report = harness.run(&specs).await;
            println!("{}", report.render_markdown());
            report
                .write_json(output)
                .await
                .with_context(|| format!("failed to write report to {}", output.display()))?;
            println!("Detailed results saved to: {}", output.display());
        }
        Command::Stats => {
            let store = load_store(&cli.embeddings_dir, cli.providers.embedding_dimensions).await?;
            display::print_stats(&store.stats().await?);
        }
    }

    Ok(())
}

async fn load_store(dir: &Path, dimensions: usize) -> Result<Arc<InMemoryFragmentStore>> {
    let store = Arc::new(InMemoryFragmentStore::new(dimensions));
    let summary = load_directory(dir, store.as_ref(), DEFAULT_BATCH_SIZE)
        .await
        .with_context(|| format!("failed to load embeddings from {}", dir.display()))?;
    info!(files = summary.files, points = summary.points, "embeddings loaded");
    Ok(store)
}

fn build_embedder(args: &ProviderArgs) -> Result<Arc<OpenAICompatibleEmbeddingProvider>> {
    let mut embedder = OpenAICompatibleEmbeddingProvider::new(&args.embedding_base_url)?
        .with_model(&args.embedding_model)
        .with_dimensions(args.embedding_dimensions);
    if let Some(key) = &args.embedding_api_key {
        embedder = embedder.with_api_key(key);
    }
    Ok(Arc::new(embedder))
}

fn build_generator(args: &ProviderArgs) -> Result<Arc<MistralGenerator>> {
    let key = args
        .mistral_api_key
        .as_deref()
        .context("MISTRAL_API_KEY is required to generate answers")?;
    let generator = MistralGenerator::new(key)?
        .with_model(&args.mistral_model)
        .with_base_url(&args.mistral_base_url);
    Ok(Arc::new(generator))
}

/// Providers are checked before any embeddings are loaded so a missing key fails fast.
async fn build_orchestrator(
    cli: &Cli,
    config: RagConfig,
    telemetry: Arc<dyn TelemetrySink>,
) -> Result<RagOrchestrator> {
    let generator = build_generator(&cli.providers)?;
    let embedder = build_embedder(&cli.providers)?;

    let store = load_store(&cli.embeddings_dir, cli.providers.embedding_dimensions).await?;
    let retriever = Retriever::new(embedder, store)?.with_telemetry(telemetry.clone());
    let synthesizer = AnswerSynthesizer::new(generator, config).with_telemetry(telemetry.clone());

    let orchestrator = RagOrchestrator::builder()
        .retriever(Arc::new(retriever))
        .synthesizer(Arc::new(synthesizer))
        .telemetry(telemetry)
        .build()?;
    Ok(orchestrator)
}
