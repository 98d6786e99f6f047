use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

use kataribe_core::Config;
use kataribe_rag::RagEngine;

#[derive(Parser)]
#[command(name = "kataribe")]
#[command(about = "Topic summaries over an embedded chat history", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the chunks most similar to a topic (content is not anonymized)
    Search {
        topic: String,
        #[arg(long, help = "Number of results (defaults to [search] default_limit)")]
        limit: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Summarize what the history says about a topic
    Summarize {
        topic: String,
        #[arg(long, help = "Number of chunks to retrieve")]
        limit: Option<usize>,
    },
    /// Build profile post content for a user
    Draft {
        #[arg(long, help = "Owner of the post")]
        user_id: String,
        topic: String,
        #[arg(long, help = "Number of chunks to retrieve")]
        limit: Option<usize>,
    },
    /// Print vector store counts
    Stats {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Install the global subscriber. The flag is true when `RUST_LOG` chose the filter.
fn init_tracing() -> (FilterHandle, bool) {
    let rust_log = EnvFilter::try_from_default_env().ok();
    let explicit = rust_log.is_some();
    let (env_filter, handle) = reload::Layer::new(rust_log.unwrap_or_else(|| "info".into()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    (handle, explicit)
}

/// Swap the bootstrap filter for the `[logging] level` setting.
fn apply_log_level(handle: &FilterHandle, level: &str) -> Result<(), reload::Error> {
    handle.reload(level)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing before config so first-run messages are not lost
    let (filter_handle, explicit) = init_tracing();

    let config = Config::load()?;
    if !explicit {
        apply_log_level(&filter_handle, &config.settings.logging.level)?;
    }

    info!(
        "Configuration loaded (generation model: {})",
        config.generation_model()
    );

    let engine = RagEngine::open(&config).await?;
    let default_limit = config.settings.search.default_limit;

    match cli.command {
        Commands::Search { topic, limit, json } => {
            let results = engine
                .search(&topic, limit.unwrap_or(default_limit))
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in &results {
                    let date = result
                        .message_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:.4}  {}  {}", result.similarity, date, result.chunk_id);
                    println!("    {}", result.content.replace('\n', "\n    "));
                }
            }
        }
        Commands::Summarize { topic, limit } => {
            let summary = engine
                .summarize(&topic, limit.unwrap_or(default_limit))
                .await?;
            println!("{summary}");
        }
        Commands::Draft {
            user_id,
            topic,
            limit,
        } => {
            let draft = engine
                .draft_post(&user_id, &topic, limit.unwrap_or(default_limit))
                .await?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        Commands::Stats { json } => {
            let stats = engine.stats().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("chunks: {}", stats.chunk_count);
                println!("dated chunks: {}", stats.dated_chunk_count);
            }
        }
    }

    Ok(())
}
