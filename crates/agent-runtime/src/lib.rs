//! # agent-runtime
//!
//! Runtime providers for the crypto-research-agent system.
//!
//! ## Providers
//!
//! - **Anthropic** (default): Claude via the Messages API
//! - **Mock**: canned offline responses for demos and tests
//! - **OpenAI** (coming soon): OpenAI API integration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::AnthropicProvider;
//!
//! let provider = AnthropicProvider::from_env()?;
//! let completion = provider.complete(&messages, &options).await?;
//! ```

#[cfg(feature = "anthropic")]
pub mod anthropic;
pub mod mock;

#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use mock::MockProvider;

// Re-export core types for convenience
pub use agent_core::{
    AgentError, LlmProvider, Message, Result, Role, Tool, ToolRegistry,
};
