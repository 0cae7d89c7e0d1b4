//! Helpdesk CLI - answers customer questions from a curated knowledge base.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use helpdesk_assistant::{AnswerRequest, SupportService};
use helpdesk_core::{SelectionMethod, Settings};
use helpdesk_knowledge::{PromptProfile, PromptStyle};
use helpdesk_storage::{JsonQueryLogStore, QueryLogStore};

#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(about = "AI customer support assistant", long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question
    Ask {
        /// The customer's question
        question: String,
        /// Context selection method (all, keyword)
        #[arg(long, default_value = "keyword")]
        method: String,
        /// Sampling preset (default, clarification, creative, strict)
        #[arg(long)]
        profile: Option<String>,
        /// Sampling temperature, overrides the preset
        #[arg(long)]
        temperature: Option<f32>,
        /// Generated token limit, overrides the preset
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Entry cap for the `all` method
        #[arg(long)]
        max_context: Option<usize>,
    },
    /// Show the context a question would be answered with
    Context {
        /// The customer's question
        question: String,
        /// Context selection method (all, keyword)
        #[arg(long, default_value = "keyword")]
        method: String,
        /// Entry cap for the `all` method
        #[arg(long)]
        max_context: Option<usize>,
    },
    /// Load the knowledge base and list its entries
    Kb,
    /// Check the generation backend and knowledge base
    Check,
    /// Show recorded questions
    History {
        /// Number of records to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
        /// Only questions containing this text
        #[arg(long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting {}", settings.app_name);

    match cli.command {
        Commands::Ask { question, method, profile, temperature, max_tokens, max_context } => {
            let profile = profile
                .as_deref()
                .map(PromptProfile::named)
                .unwrap_or(PromptProfile {
                    name: "settings",
                    temperature: settings.default_temperature,
                    max_tokens: settings.default_max_tokens,
                    style: PromptStyle::Answer,
                });
            let request = AnswerRequest::new(
                &question,
                &method,
                temperature.unwrap_or(profile.temperature),
                max_tokens.unwrap_or(profile.max_tokens),
                Some(max_context.unwrap_or(settings.max_context_entries)),
            )?
            .with_style(profile.style);

            let mut service = SupportService::from_settings(settings.clone())?;
            match open_history(&settings).await {
                Ok(history) => service = service.with_history(history),
                Err(e) => warn!("Query history disabled: {:#}", e),
            }
            load_or_degrade(&service).await;

            let outcome = service.ask(&request).await.context("failed to answer question")?;
            println!("{}", outcome.result.answer_text);
            println!();
            println!(
                "[{} | {}ms | {}]",
                outcome.result.model_identifier,
                outcome.result.elapsed_time_ms,
                outcome.result.context_descriptor()
            );
        }
        Commands::Context { question, method, max_context } => {
            let method: SelectionMethod = method.parse()?;
            let service = SupportService::from_settings(settings.clone())?;
            load_or_degrade(&service).await;

            let retrieval = service
                .context(&question, method, Some(max_context.unwrap_or(settings.max_context_entries)))
                .await?;
            println!("Source: {:?} ({} entries)", retrieval.source, retrieval.len());
            for scored in &retrieval.entries {
                println!("  #{} score={} {}", scored.entry.ordinal, scored.score, scored.entry.question);
            }
            println!();
            println!("{}", retrieval.context);
        }
        Commands::Kb => {
            let service = SupportService::from_settings(settings.clone())?;
            let kb = service
                .load_knowledge_base()
                .await
                .with_context(|| format!("failed to load {}", settings.knowledge_base_path.display()))?;

            println!("Knowledge base ({} entries)", kb.len());
            for entry in kb.entries() {
                println!("  {:>3} | {}", entry.ordinal, entry.question);
            }
        }
        Commands::Check => {
            let service = SupportService::from_settings(settings.clone())?;
            service.connect().await.context("generation backend check failed")?;
            println!("Backend: {} (model {})", settings.ollama_host, settings.ollama_model);

            match service.load_knowledge_base().await {
                Ok(kb) => println!("Knowledge base: {} entries", kb.len()),
                Err(e) => println!("Knowledge base: unavailable ({})", e),
            }
        }
        Commands::History { limit, search } => {
            let history = open_history(&settings).await?;
            let logs = match search.as_deref() {
                Some(term) => history.search_by_question(term, limit).await?,
                None => history.latest(limit).await?,
            };

            let total = history.count().await?;
            match history.average_processing_time().await? {
                Some(avg) => println!("Queries ({} total, avg {:.0}ms)", total, avg),
                None => println!("Queries ({} total)", total),
            }
            for log in logs {
                println!(
                    "  {} | {} | {}ms | {}",
                    log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    log.model_used,
                    log.processing_time_ms.unwrap_or_default(),
                    log.question,
                );
            }
        }
    }

    Ok(())
}

async fn open_history(settings: &Settings) -> Result<Arc<dyn QueryLogStore>> {
    let store = JsonQueryLogStore::new(&settings.history_path)
        .await
        .with_context(|| format!("failed to open {}", settings.history_path.display()))?;
    Ok(Arc::new(store))
}

async fn load_or_degrade(service: &SupportService) {
    if let Err(e) = service.load_knowledge_base().await {
        warn!("Knowledge base unavailable, answering without it: {}", e);
    }
}
