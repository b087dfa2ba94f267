//! crypto-research-agent CLI
//!
//! One-shot research runs and an interactive session, wired to the
//! Anthropic provider and the CoinGecko feed, with offline mocks behind
//! `--mock`.

mod display;
mod repl;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::LlmProvider;
use agent_runtime::{AnthropicProvider, MockProvider};
use crypto_research::feeds::{CoinGeckoFeed, MarketDataFeed, MockFeed};
use crypto_research::notion::{NotionClient, NotionConfig};
use crypto_research::orchestrator::DEFAULT_MODEL;
use crypto_research::report::{default_output_dir, save_report_to_file};
use crypto_research::{PromptStore, ResearchOrchestrator};

#[derive(Parser)]
#[command(
    name = "crypto-research-agent",
    about = "Multi-agent crypto research with deterministic weekly allocation guidance"
)]
struct Cli {
    /// Token to research (e.g., BTC). Omit to start the interactive session.
    token: Option<String>,

    /// Model used for subagents and synthesis.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Days of daily history to feed the indicators.
    #[arg(long, default_value_t = 90)]
    history_days: u32,

    /// Run offline with mock market data and canned completions.
    #[arg(long, default_value_t = false)]
    mock: bool,

    /// Never save or publish reports.
    #[arg(long, default_value_t = false)]
    skip_publish: bool,

    /// Directory for saved reports. Defaults to OUTPUT_DIR or ./reports.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let (provider, feed): (Arc<dyn LlmProvider>, Arc<dyn MarketDataFeed>) = if cli.mock {
        tracing::info!("mock mode: no network calls will be made");
        (
            Arc::new(MockProvider::new()),
            Arc::new(MockFeed::default()),
        )
    } else {
        let provider = AnthropicProvider::from_env()?;
        match provider.health_check().await {
            Ok(true) => tracing::info!("✓ Connected to Anthropic"),
            Ok(false) | Err(_) => {
                tracing::warn!("⚠ Anthropic API not reachable - research runs will fail");
                tracing::warn!("  Check ANTHROPIC_API_KEY");
            }
        }

        let feed = CoinGeckoFeed::from_env()?;
        if feed.health_check().await {
            tracing::info!("✓ Connected to CoinGecko");
        } else {
            tracing::warn!("⚠ CoinGecko not reachable - market data will fail");
        }
        (Arc::new(provider), Arc::new(feed))
    };

    let notion = build_notion(cli.mock);
    let output_dir = cli.output_dir.clone().unwrap_or_else(default_output_dir);

    let orchestrator = ResearchOrchestrator::new(provider, feed, PromptStore::from_env())
        .with_model(cli.model.clone())
        .with_history_days(cli.history_days);

    match &cli.token {
        Some(token) => {
            run_once(&orchestrator, token, notion, &output_dir, cli.skip_publish).await
        }
        None => repl::run(&orchestrator, notion, &output_dir, cli.skip_publish).await,
    }
}

async fn run_once(
    orchestrator: &ResearchOrchestrator,
    token: &str,
    notion: Option<Arc<NotionClient>>,
    output_dir: &Path,
    skip_publish: bool,
) -> anyhow::Result<()> {
    display::status(&format!("Researching {}...", token.to_uppercase()));
    let outcome = orchestrator.research_token(token).await?;

    println!("\n{}\n", outcome.report);
    display::success(&format!(
        "{}: {} ({}% of weekly allocation)",
        outcome.token, outcome.guidance.action_bias, outcome.guidance.allocation_percent
    ));

    if skip_publish {
        return Ok(());
    }

    let path = save_report_to_file(&outcome.report, &outcome.token, output_dir)?;
    display::success(&format!("Saved to {}", path.display()));

    if let Some(client) = notion {
        use crypto_research::report::{extract_confidence, extract_sentiment};
        let sentiment = extract_sentiment(&outcome.report);
        let confidence = extract_confidence(&outcome.report);
        match client
            .create_report_page(&outcome.token, &outcome.report, confidence, sentiment)
            .await
        {
            Ok(page) => {
                let location = page.url.unwrap_or(page.id);
                display::success(&format!("Published to Notion: {location}"));
            }
            Err(e) => display::warning(&format!("Notion publish failed: {e}")),
        }
    }
    Ok(())
}

fn build_notion(mock: bool) -> Option<Arc<NotionClient>> {
    if mock {
        return None;
    }
    if !NotionConfig::from_env().is_configured() {
        tracing::info!("Notion not configured, reports save to local files");
        return None;
    }
    match NotionClient::from_env() {
        Ok(client) => {
            tracing::info!("✓ Notion publishing enabled");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("⚠ Notion setup failed: {e}");
            None
        }
    }
}
