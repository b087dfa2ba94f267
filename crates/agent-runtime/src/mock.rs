//! Mock Provider
//!
//! Offline provider for demos and tests. Returns canned completions so the
//! whole pipeline can run without network access or API keys.

use async_trait::async_trait;

use agent_core::{
    Completion, GenerationOptions, LlmProvider, Message, Result,
    provider::{FinishReason, ModelInfo, ProviderInfo, TokenUsage},
};

const MOCK_MODEL: &str = "mock-model";

const MOCK_ANALYSIS: &str = "## Mock Analysis\n\nThis is a mock response.";

const MOCK_REPORT: &str = "# Research Report\n\
**Mock run** | Offline mode\n\
\n\
---\n\
\n\
## 📊 Executive Summary\n\
\n\
This is a mock report generated without any model calls.\n\
\n\
**Overall Stance**: Neutral\n\
**Confidence**: Medium\n\
\n\
---\n\
\n\
## 💰 Price Analysis\n\
\n\
Mock price commentary.\n\
\n\
## 📰 News Analysis\n\
\n\
Mock news commentary.\n\
\n\
## 🌐 Sentiment Analysis\n\
\n\
Mock sentiment commentary.\n";

/// Canned-response provider. Prompts that ask for a full report get a
/// report-shaped document; everything else gets a short analysis blurb.
#[derive(Debug, Default, Clone)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        Ok(ProviderInfo {
            name: "Mock".to_string(),
            version: None,
            models: vec![ModelInfo {
                id: MOCK_MODEL.to_string(),
                name: "Mock Model".to_string(),
            }],
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let prompt: String = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let content = if prompt.contains("research report") {
            MOCK_REPORT.to_string()
        } else {
            MOCK_ANALYSIS.to_string()
        };

        let prompt_tokens = self.estimate_tokens(&prompt);
        let completion_tokens = self.estimate_tokens(&content);
        Ok(Completion {
            content,
            model: options.model.clone(),
            usage: Some(TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
            finish_reason: Some(FinishReason::Stop),
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: MOCK_MODEL.to_string(),
            name: "Mock Model".to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_prompt_gets_analysis_blurb() {
        let provider = MockProvider::new();
        let completion = provider
            .complete(
                &[Message::user("Analyze the price action for BTC")],
                &GenerationOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(completion.content, MOCK_ANALYSIS);
        assert!(completion.usage.is_some());
    }

    #[tokio::test]
    async fn test_report_prompt_gets_report_document() {
        let provider = MockProvider::new();
        let completion = provider
            .complete(
                &[Message::user(
                    "You are synthesizing a cryptocurrency research report for BTC.",
                )],
                &GenerationOptions::default(),
            )
            .await
            .unwrap();

        assert!(completion.content.contains("## 📊 Executive Summary"));
        assert!(completion.content.contains("## 💰 Price Analysis"));
    }
}
