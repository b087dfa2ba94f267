//! Research Orchestration
//!
//! The weekly pipeline for one token: fetch market data, compute
//! indicators, fan out to the three subagents, derive the allocation
//! guidance, then run a single synthesis pass and splice the guidance
//! block into the result. Sizing never comes from the model; the prose
//! is written around numbers the engine already fixed.

use std::sync::Arc;

use agent_core::LlmProvider;

use crate::error::Result;
use crate::feeds::MarketDataFeed;
use crate::guidance::{AllocationGuidance, derive_guidance, render_guidance};
use crate::indicators::IndicatorSet;
use crate::model::{HistoricalSeries, TokenPrice};
use crate::prompts::PromptStore;
use crate::report::{inject_allocation_guidance, synthesize_report};
use crate::subagents::run_subagents;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_HISTORY_DAYS: u32 = 90;

const METHODOLOGY_SKILL: &str = "crypto-research-methodology";
const REPORT_TEMPLATE_REF: &str = "report-template.md";

/// Everything one research run produces
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    /// Canonical ticker symbol, as resolved by the feed
    pub token: String,
    pub price: TokenPrice,
    pub guidance: AllocationGuidance,
    /// Final report markdown with the guidance block already injected
    pub report: String,
}

/// Drives the research pipeline against a provider and a market data feed
pub struct ResearchOrchestrator {
    provider: Arc<dyn LlmProvider>,
    feed: Arc<dyn MarketDataFeed>,
    store: PromptStore,
    model: String,
    history_days: u32,
}

impl ResearchOrchestrator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        feed: Arc<dyn MarketDataFeed>,
        store: PromptStore,
    ) -> Self {
        Self {
            provider,
            feed,
            store,
            model: DEFAULT_MODEL.to_string(),
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run the full pipeline for a single token.
    ///
    /// Missing history degrades the indicators rather than failing the run;
    /// an unknown token or a synthesis failure is an error.
    pub async fn research_token(&self, token: &str) -> Result<ResearchOutcome> {
        let token = token.trim();
        tracing::info!(token, model = %self.model, "starting research run");

        let price = self.feed.get_price(token).await?;
        tracing::info!(
            symbol = %price.symbol,
            price_usd = price.price_usd,
            change_24h = price.change_24h_percent,
            "market data fetched"
        );

        let history = self.fetch_history(token).await;
        let indicators = IndicatorSet::compute(&history.closes(), &history.volumes());
        tracing::info!(
            samples = indicators.sample_size,
            quality = ?indicators.data_quality,
            "indicators computed"
        );

        let reports = run_subagents(
            self.provider.as_ref(),
            &self.store,
            &price.symbol,
            &price,
            &indicators,
            &self.model,
        )
        .await;

        let mut snapshot = indicators.to_snapshot(Some(price.price_usd));
        if snapshot.price_change_7d.is_none() {
            snapshot.price_change_7d = Some(price.change_7d_percent);
        }
        snapshot.news_available = reports.news_available();
        snapshot.sentiment_available = reports.sentiment_available();

        let guidance = derive_guidance(&snapshot);
        let rendered = render_guidance(&guidance);
        tracing::info!(
            bias = %guidance.action_bias,
            allocation = guidance.allocation_percent,
            "allocation guidance derived"
        );

        let template = self
            .store
            .load_skill_reference(METHODOLOGY_SKILL, REPORT_TEMPLATE_REF);
        let draft = synthesize_report(
            self.provider.as_ref(),
            &self.model,
            &price.symbol,
            &reports,
            &template,
        )
        .await?;

        let report = inject_allocation_guidance(&draft, &rendered);

        Ok(ResearchOutcome {
            token: price.symbol.clone(),
            price,
            guidance,
            report,
        })
    }

    /// History failures degrade to an empty series so the run can continue
    /// on live price data alone.
    async fn fetch_history(&self, token: &str) -> HistoricalSeries {
        match self.feed.get_history(token, self.history_days).await {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(token, error = %e, "history unavailable, indicators will degrade");
                HistoricalSeries {
                    symbol: token.to_uppercase(),
                    days: self.history_days,
                    points: Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use agent_core::provider::{Completion, ModelInfo, ProviderInfo};
    use agent_core::{GenerationOptions, Message};
    use async_trait::async_trait;

    use super::*;
    use crate::error::ResearchError;
    use crate::feeds::MockFeed;
    use crate::guidance::ActionBias;
    use crate::model::{MarketOverview, TokenSearchHit, TrendingToken};

    /// Returns a canned analysis for subagent calls and a structured report
    /// for the synthesis call, counting completions along the way.
    struct StubProvider {
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn info(&self) -> agent_core::Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "stub".to_string(),
                version: None,
                models: vec![],
            })
        }

        async fn health_check(&self) -> agent_core::Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            messages: &[Message],
            _options: &GenerationOptions,
        ) -> agent_core::Result<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let prompt = messages.first().map(|m| m.content.as_str()).unwrap_or_default();
            let content = if prompt.contains("synthesizing a cryptocurrency research report") {
                "# BTC Research Report\n\n\
                 ## 📊 Executive Summary\n\nLooks constructive, high confidence.\n\n\
                 ## 💰 Price Analysis\n\nNumbers here.\n"
                    .to_string()
            } else {
                "## Mock Analysis\n\nThis is a mock response.".to_string()
            };
            Ok(Completion {
                content,
                model: "stub".to_string(),
                usage: None,
                finish_reason: None,
            })
        }

        async fn list_models(&self) -> agent_core::Result<Vec<ModelInfo>> {
            Ok(vec![])
        }
    }

    /// Delegates prices to the mock feed but always fails history
    struct NoHistoryFeed {
        inner: MockFeed,
    }

    #[async_trait]
    impl MarketDataFeed for NoHistoryFeed {
        async fn get_price(&self, token: &str) -> Result<TokenPrice> {
            self.inner.get_price(token).await
        }

        async fn get_history(&self, _token: &str, _days: u32) -> Result<HistoricalSeries> {
            Err(ResearchError::MarketData("history endpoint down".to_string()))
        }

        async fn get_market_overview(&self) -> Result<MarketOverview> {
            self.inner.get_market_overview().await
        }

        async fn search(&self, query: &str, limit: usize) -> Result<Vec<TokenSearchHit>> {
            self.inner.search(query, limit).await
        }

        async fn get_trending(&self) -> Result<Vec<TrendingToken>> {
            self.inner.get_trending().await
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "no-history"
        }
    }

    fn orchestrator_with(
        provider: Arc<dyn LlmProvider>,
        feed: Arc<dyn MarketDataFeed>,
    ) -> ResearchOrchestrator {
        ResearchOrchestrator::new(provider, feed, PromptStore::default())
    }

    #[tokio::test]
    async fn test_pipeline_injects_guidance_between_sections() {
        let provider = Arc::new(StubProvider::new());
        let orchestrator = orchestrator_with(provider.clone(), Arc::new(MockFeed::default()));

        let outcome = orchestrator.research_token("BTC").await.unwrap();

        assert_eq!(outcome.token, "BTC");
        let exec_pos = outcome.report.find("## 📊 Executive Summary").unwrap();
        let guidance_pos = outcome
            .report
            .find("### 🧭 Weekly Allocation Guidance")
            .unwrap();
        let price_pos = outcome.report.find("## 💰 Price Analysis").unwrap();
        assert!(exec_pos < guidance_pos);
        assert!(guidance_pos < price_pos);

        // Three subagents plus one synthesis pass
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
        assert!([0, 25, 50, 100].contains(&outcome.guidance.allocation_percent));
    }

    #[tokio::test]
    async fn test_unknown_token_is_an_error() {
        let orchestrator = orchestrator_with(
            Arc::new(StubProvider::new()),
            Arc::new(MockFeed::default()),
        );

        let err = orchestrator.research_token("NOTACOIN").await.unwrap_err();
        assert!(matches!(err, ResearchError::TokenNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_history_degrades_to_hold() {
        let orchestrator = orchestrator_with(
            Arc::new(StubProvider::new()),
            Arc::new(NoHistoryFeed { inner: MockFeed::default() }),
        );

        let outcome = orchestrator.research_token("ETH").await.unwrap();

        // Price-only snapshot: structure unknown, so the engine holds
        assert_eq!(outcome.guidance.action_bias, ActionBias::Hold);
        assert_eq!(outcome.guidance.allocation_percent, 25);
        assert!(outcome.report.contains("Weekly Allocation Guidance"));
    }

    #[tokio::test]
    async fn test_builder_overrides() {
        let orchestrator = orchestrator_with(
            Arc::new(StubProvider::new()),
            Arc::new(MockFeed::default()),
        )
        .with_model("claude-haiku-4-5")
        .with_history_days(30);

        assert_eq!(orchestrator.model(), "claude-haiku-4-5");
        assert_eq!(orchestrator.history_days, 30);
    }
}
