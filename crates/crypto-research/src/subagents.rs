//! Research Subagents
//!
//! Three specialized prompt runs fan out in parallel over one provider:
//! the price analyst is seeded with verified market data and computed
//! indicators, the news aggregator and social sentinel cover the
//! qualitative side. A failed branch never fails the research run; its
//! error is carried in the result so the orchestrator can mark that data
//! source unavailable.

use agent_core::{GenerationOptions, LlmProvider, Message};

use crate::error::Result;
use crate::indicators::IndicatorSet;
use crate::model::TokenPrice;
use crate::prompts::PromptStore;

pub const PRICE_ANALYST: &str = "price_analyst";
pub const NEWS_AGGREGATOR: &str = "news_aggregator";
pub const SOCIAL_SENTINEL: &str = "social_sentinel";

const SUBAGENT_MAX_TOKENS: u32 = 2048;

const PRICE_ANALYST_FALLBACK: &str = "You are a cryptocurrency price analyst.";
const NEWS_AGGREGATOR_FALLBACK: &str = "You are a cryptocurrency news analyst.";
const SOCIAL_SENTINEL_FALLBACK: &str = "You are a cryptocurrency sentiment analyst.";

/// Results of one parallel subagent dispatch
#[derive(Debug)]
pub struct SubagentReports {
    pub price_analysis: Result<String>,
    pub news_analysis: Result<String>,
    pub sentiment_analysis: Result<String>,
}

impl SubagentReports {
    pub fn news_available(&self) -> bool {
        self.news_analysis.is_ok()
    }

    pub fn sentiment_available(&self) -> bool {
        self.sentiment_analysis.is_ok()
    }

    pub fn price_section(&self) -> String {
        section_text(&self.price_analysis)
    }

    pub fn news_section(&self) -> String {
        section_text(&self.news_analysis)
    }

    pub fn sentiment_section(&self) -> String {
        section_text(&self.sentiment_analysis)
    }
}

fn section_text(result: &Result<String>) -> String {
    match result {
        Ok(text) => text.clone(),
        Err(e) => format!("Analysis unavailable: {e}"),
    }
}

/// Dispatch all three subagents in parallel and collect their outcomes.
pub async fn run_subagents(
    provider: &dyn LlmProvider,
    store: &PromptStore,
    token: &str,
    price: &TokenPrice,
    indicators: &IndicatorSet,
    model: &str,
) -> SubagentReports {
    tracing::info!(token, "dispatching research subagents in parallel");

    let (price_analysis, news_analysis, sentiment_analysis) = tokio::join!(
        run_price_analyst(provider, store, token, price, indicators, model),
        run_news_aggregator(provider, store, token, model),
        run_social_sentinel(provider, store, token, model),
    );

    for (name, result) in [
        (PRICE_ANALYST, &price_analysis),
        (NEWS_AGGREGATOR, &news_analysis),
        (SOCIAL_SENTINEL, &sentiment_analysis),
    ] {
        match result {
            Ok(text) => {
                tracing::info!(subagent = name, chars = text.len(), "subagent complete");
            }
            Err(e) => tracing::warn!(subagent = name, error = %e, "subagent failed"),
        }
    }

    SubagentReports {
        price_analysis,
        news_analysis,
        sentiment_analysis,
    }
}

/// Technical analysis seeded with real market data. The model interprets
/// the provided numbers; it never sources its own.
pub async fn run_price_analyst(
    provider: &dyn LlmProvider,
    store: &PromptStore,
    token: &str,
    price: &TokenPrice,
    indicators: &IndicatorSet,
    model: &str,
) -> Result<String> {
    let agent_prompt = store.prompt_or(PRICE_ANALYST, PRICE_ANALYST_FALLBACK);
    let skill = store.load_skill("technical-analysis");
    let reference = store.load_skill_reference("technical-analysis", "indicators.md");
    let system = compose_system_prompt(
        &agent_prompt,
        "technical-analysis",
        &skill,
        "indicators.md",
        &reference,
    );

    let user_message = format!(
        "Analyze {token} using the verified market data below.\n\n\
         {}\n\n\
         {}\n\n\
         Provide:\n\
         1. Current price and market metrics assessment\n\
         2. Technical indicator interpretation (RSI, moving averages, volume)\n\
         3. Key support and resistance levels\n\
         4. Brief technical outlook for the coming week\n\n\
         Follow the technical-analysis skill workflow and output format. Base every \
         number on the data above; do not invent figures.",
        price.market_summary(),
        indicators.summary(price.price_usd),
    );

    complete(provider, model, system, user_message).await
}

/// Recent-news roundup from the model's knowledge, clearly marked as such.
pub async fn run_news_aggregator(
    provider: &dyn LlmProvider,
    store: &PromptStore,
    token: &str,
    model: &str,
) -> Result<String> {
    let agent_prompt = store.prompt_or(NEWS_AGGREGATOR, NEWS_AGGREGATOR_FALLBACK);
    let skill = store.load_skill("news-research");
    let reference = store.load_skill_reference("news-research", "trusted-sources.md");
    let system = compose_system_prompt(
        &agent_prompt,
        "news-research",
        &skill,
        "trusted-sources.md",
        &reference,
    );

    let user_message = format!(
        "Research recent news for {token}:\n\
         1. Find the most significant recent headlines (past 7 days)\n\
         2. Categorize news by type (protocol, partnerships, regulatory, adoption, etc.)\n\
         3. Assess overall news sentiment\n\
         4. Identify key developments to watch\n\
         5. Flag any red flags or concerns\n\n\
         Follow the news-research skill workflow and output format exactly.\n\n\
         Note: You don't have direct web search in this context. Use your knowledge of \
         recent developments and clearly indicate where real-time news would need to be \
         fetched. Provide the best analysis you can with available information."
    );

    complete(provider, model, system, user_message).await
}

/// Sentiment and social-signal read, from patterns rather than live data.
pub async fn run_social_sentinel(
    provider: &dyn LlmProvider,
    store: &PromptStore,
    token: &str,
    model: &str,
) -> Result<String> {
    let agent_prompt = store.prompt_or(SOCIAL_SENTINEL, SOCIAL_SENTINEL_FALLBACK);
    let skill = store.load_skill("sentiment-analysis");
    let reference = store.load_skill_reference("sentiment-analysis", "sentiment-rules.md");
    let system = compose_system_prompt(
        &agent_prompt,
        "sentiment-analysis",
        &skill,
        "sentiment-rules.md",
        &reference,
    );

    let user_message = format!(
        "Analyze market sentiment for {token}:\n\
         1. Assess the current Fear & Greed context\n\
         2. Evaluate social media sentiment and activity\n\
         3. Identify where we are in the sentiment cycle\n\
         4. Note any contrarian indicators\n\
         5. Flag potential manipulation or warning signs\n\n\
         Follow the sentiment-analysis skill workflow and output format exactly.\n\n\
         Note: You don't have direct social media access in this context. Use your \
         knowledge of market sentiment patterns and clearly indicate where real-time \
         data would need to be fetched. Provide the best analysis you can."
    );

    complete(provider, model, system, user_message).await
}

fn compose_system_prompt(
    agent_prompt: &str,
    skill_name: &str,
    skill: &str,
    reference_name: &str,
    reference: &str,
) -> String {
    format!(
        "{agent_prompt}\n\n\
         ## Skill: {skill_name}\n\n\
         {skill}\n\n\
         ## Reference: {reference_name}\n\n\
         {reference}\n"
    )
}

async fn complete(
    provider: &dyn LlmProvider,
    model: &str,
    system: String,
    user_message: String,
) -> Result<String> {
    let options = GenerationOptions {
        model: model.to_string(),
        max_tokens: SUBAGENT_MAX_TOKENS,
        system_prompt: Some(system),
        ..Default::default()
    };

    let completion = provider
        .complete(&[Message::user(user_message)], &options)
        .await?;
    Ok(completion.content)
}
