//! Error Types for the Research Pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResearchError>;

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Token not found: {0}")]
    TokenNotFound(String),

    #[error("Publishing error: {0}")]
    Publishing(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Agent(#[from] agent_core::AgentError),
}

impl ResearchError {
    /// Short label for log fields and tool error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MarketData(_) => "market_data",
            Self::TokenNotFound(_) => "token_not_found",
            Self::Publishing(_) => "publishing",
            Self::Prompt(_) => "prompt",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
            Self::Agent(_) => "agent",
        }
    }
}
