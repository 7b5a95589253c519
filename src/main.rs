use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use trendscope::config::{self, Config};
use trendscope::output::chart::SvgBarChart;
use trendscope::pipeline::daily::{self, RunOutcome, RunSettings};
use trendscope::sentiment::lexicon::LexiconScorer;
use trendscope::sources::reddit::{RedditClient, TimeWindow};
use trendscope::topics::download;
use trendscope::topics::embeddings::SentenceEmbedder;
use trendscope::topics::engine::EmbeddingClusterEngine;
use trendscope::topics::ranker::OutlierPolicy;

/// Trendscope: daily topic trend reports.
///
/// Pulls the day's top posts, groups them into topics, scores the mood of
/// each topic and writes a markdown report with a chart.
#[derive(Parser)]
#[command(name = "trendscope", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch posts and write today's trend report
    Run(RunArgs),

    /// Download the sentence embedding model (~90 MB)
    DownloadModel,

    /// Show configuration, model status and the last report
    Status,
}

/// Overrides for a single run. Anything not given comes from the environment.
#[derive(Args)]
struct RunArgs {
    /// Subreddit to include (repeatable; replaces TRENDSCOPE_SUBREDDITS)
    #[arg(long = "subreddit")]
    subreddits: Vec<String>,

    /// Top posts to request per subreddit
    #[arg(long)]
    limit: Option<usize>,

    /// Listing window: hour, day, week, month, year, all
    #[arg(long)]
    window: Option<TimeWindow>,

    /// Keep pinned posts
    #[arg(long)]
    include_pinned: bool,

    /// Smallest cluster reported as its own topic
    #[arg(long)]
    min_topic_size: Option<usize>,

    /// Number of topics in the report
    #[arg(long)]
    top: Option<usize>,

    /// Never rank the outlier bucket, wherever it sorts
    #[arg(long)]
    exclude_outliers: bool,

    /// Directory for report.md and the chart
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Also write report.json
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn into_settings(self, config: &Config) -> RunSettings {
        let sources = if self.subreddits.is_empty() {
            config.subreddits.clone()
        } else {
            config::parse_subreddits(&self.subreddits.join(","))
        };

        RunSettings {
            sources,
            per_source_limit: self.limit.unwrap_or(config.per_source_limit),
            exclude_pinned: !(self.include_pinned || config.include_pinned),
            min_topic_size: self.min_topic_size.unwrap_or(config.min_topic_size),
            top_n: self.top.unwrap_or(config.top_n),
            outlier_policy: if self.exclude_outliers {
                OutlierPolicy::Always
            } else {
                config.outlier_policy
            },
            output_dir: self.output_dir.unwrap_or_else(|| config.output_dir.clone()),
            write_json: self.json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trendscope=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = Config::load()?;
            config.require_embedding_model()?;

            let window = args.window.unwrap_or(config.time_window);
            let settings = args.into_settings(&config);
            if settings.sources.is_empty() {
                anyhow::bail!("No subreddits given");
            }

            let source = RedditClient::new(&config.reddit_api_url, window)?;
            let embedder =
                SentenceEmbedder::load(&download::embedding_model_dir(&config.model_dir))?;
            let engine = Arc::new(EmbeddingClusterEngine::new(
                embedder,
                config.similarity_threshold,
            ));
            let scorer = LexiconScorer::new();
            let renderer = SvgBarChart::default();

            info!(
                sources = settings.sources.len(),
                window = %window,
                "Starting trend run"
            );

            match daily::run(&source, engine, &scorer, &renderer, &settings).await? {
                RunOutcome::NoDocuments => {
                    println!("No posts found. Nothing to report.");
                }
                RunOutcome::Written {
                    report,
                    report_path,
                    chart_path,
                    json_path,
                    documents,
                } => {
                    trendscope::output::terminal::display_report(&report);
                    println!("{}", format!("Analyzed {documents} posts.").bold());
                    println!("  Report: {}", report_path.display());
                    println!("  Chart:  {}", chart_path.display());
                    if let Some(path) = json_path {
                        println!("  JSON:   {}", path.display());
                    }
                }
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading embedding model...");
            println!("  Destination: {}", model_dir.display());

            download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `trendscope run`.");
        }

        Commands::Status => {
            let config = Config::load()?;
            trendscope::status::show(&config)?;
        }
    }

    Ok(())
}
