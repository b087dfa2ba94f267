//! # crypto-research
//!
//! Multi-agent cryptocurrency research pipeline with deterministic weekly
//! allocation guidance.
//!
//! ## Philosophy
//!
//! Research prose comes from language models; position sizing never does:
//!
//! - **Specialized subagents** - Price, news, and sentiment run as separate focused completions
//! - **Deterministic guidance** - The allocation tier is a pure function of market structure
//! - **Graceful degradation** - Missing data narrows exposure instead of failing the run
//! - **Auditable output** - Every report carries why/invalidation/next-check rationale
//!
//! ## Example: one weekly run
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  research BTC                                                │
//! ├──────────────────────────────────────────────────────────────┤
//! │  feed       →  price $80,000, 90 daily closes                │
//! │  indicators →  RSI 62, SMA20 $77,500, SMA50 $75,000          │
//! │  subagents  →  price / news / sentiment in parallel          │
//! │  engine     →  bullish structure, support intact             │
//! │  guidance   →  Accumulate, 100% of weekly allocation         │
//! │  report     →  synthesis with guidance block injected        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod feeds;
pub mod guidance;
pub mod indicators;
pub mod model;
pub mod notion;
pub mod orchestrator;
pub mod prompts;
pub mod report;
pub mod subagents;
pub mod svckit;

pub use error::{ResearchError, Result};
pub use guidance::{
    ActionBias, AllocationGuidance, SignalSnapshot, derive_guidance, render_guidance,
};
pub use indicators::{DataQuality, IndicatorSet};
pub use model::{HistoricalSeries, MarketOverview, TokenPrice};
pub use orchestrator::{ResearchOrchestrator, ResearchOutcome};
pub use prompts::PromptStore;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        GetCryptoPriceTool, GetHistoricalPricesTool, GetMarketOverviewTool, GetTrendingTokensTool,
        SaveResearchReportTool, SearchResearchReportsTool, SearchTokensTool,
    };
}
