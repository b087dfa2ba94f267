//! Report Journal Tools
//!
//! Persists finished reports and searches past ones. Publishing targets
//! Notion when credentials are configured and the local reports directory
//! otherwise.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::notion::NotionClient;
use crate::report::{extract_confidence, extract_sentiment, save_report_to_file};

/// Tool for saving a finished research report
pub struct SaveResearchReportTool {
    notion: Option<Arc<NotionClient>>,
    output_dir: PathBuf,
}

impl SaveResearchReportTool {
    pub fn new(notion: Option<Arc<NotionClient>>, output_dir: PathBuf) -> Self {
        Self { notion, output_dir }
    }

    async fn publish_to_notion(&self, token: &str, report: &str) -> ToolResult {
        let Some(client) = &self.notion else {
            // No credentials: keep the report instead of dropping it
            return match save_report_to_file(report, token, &self.output_dir) {
                Ok(path) => ToolResult::success(
                    "save_research_report",
                    format!(
                        "Notion is not configured; saved to {} instead",
                        path.display()
                    ),
                )
                .with_data(json!({"path": path.display().to_string()})),
                Err(e) => ToolResult::failure("save_research_report", e.to_string()),
            };
        };

        let sentiment = extract_sentiment(report);
        let confidence = extract_confidence(report);
        match client
            .create_report_page(token, report, confidence, sentiment)
            .await
        {
            Ok(page) => {
                let location = page.url.clone().unwrap_or_else(|| page.id.clone());
                ToolResult::success(
                    "save_research_report",
                    format!("Published to Notion: {location}"),
                )
                .with_data(json!({"page_id": page.id, "url": page.url}))
            }
            Err(e) => ToolResult::failure("save_research_report", e.to_string()),
        }
    }
}

#[async_trait]
impl Tool for SaveResearchReportTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "save_research_report".into(),
            description: "Save a finished research report to the local reports directory or \
                          publish it to Notion."
                .into(),
            parameters: vec![
                ParameterSchema {
                    name: "token".into(),
                    param_type: "string".into(),
                    description: "Token symbol the report covers (e.g., 'BTC')".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "report".into(),
                    param_type: "string".into(),
                    description: "Full report markdown".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "destination".into(),
                    param_type: "string".into(),
                    description: "Where to save the report".into(),
                    required: false,
                    default: Some(json!("file")),
                    enum_values: Some(vec![json!("file"), json!("notion")]),
                },
            ],
            category: Some("publishing".into()),
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let token = call
            .arguments
            .get("token")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim();
        let report = call
            .arguments
            .get("report")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if token.is_empty() || report.is_empty() {
            return Ok(ToolResult::failure(
                "save_research_report",
                "token and report must be non-empty strings",
            ));
        }

        let destination = call
            .arguments
            .get("destination")
            .and_then(|v| v.as_str())
            .unwrap_or("file");

        let result = match destination {
            "notion" => self.publish_to_notion(token, report).await,
            _ => match save_report_to_file(report, token, &self.output_dir) {
                Ok(path) => ToolResult::success(
                    "save_research_report",
                    format!("Report saved to {}", path.display()),
                )
                .with_data(json!({"path": path.display().to_string()})),
                Err(e) => ToolResult::failure("save_research_report", e.to_string()),
            },
        };
        Ok(result)
    }
}

/// Tool for finding previously saved reports
pub struct SearchResearchReportsTool {
    notion: Option<Arc<NotionClient>>,
    output_dir: PathBuf,
}

impl SearchResearchReportsTool {
    pub fn new(notion: Option<Arc<NotionClient>>, output_dir: PathBuf) -> Self {
        Self { notion, output_dir }
    }

    fn search_local(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        let Ok(entries) = std::fs::read_dir(&self.output_dir) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".md") && name.to_lowercase().contains(&needle))
            .collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl Tool for SearchResearchReportsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_research_reports".into(),
            description: "Search previously saved research reports by token or title.".into(),
            parameters: vec![ParameterSchema {
                name: "query".into(),
                param_type: "string".into(),
                description: "Search text (e.g., 'BTC')".into(),
                required: true,
                default: None,
                enum_values: None,
            }],
            category: Some("publishing".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call
            .arguments
            .get("query")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim();
        if query.is_empty() {
            return Ok(ToolResult::failure(
                "search_research_reports",
                "query must be a non-empty string",
            ));
        }

        if let Some(client) = &self.notion {
            return match client.search(query).await {
                Ok(pages) if pages.is_empty() => Ok(ToolResult::success(
                    "search_research_reports",
                    format!("No reports matched '{query}'"),
                )),
                Ok(pages) => {
                    let mut output = format!("Found {} Notion reports:\n", pages.len());
                    for page in &pages {
                        match &page.url {
                            Some(url) => {
                                output.push_str(&format!("  {} ({url})\n", page.title));
                            }
                            None => output.push_str(&format!("  {}\n", page.title)),
                        }
                    }
                    Ok(ToolResult::success(
                        "search_research_reports",
                        output.trim_end(),
                    ))
                }
                Err(e) => Ok(ToolResult::failure(
                    "search_research_reports",
                    e.to_string(),
                )),
            };
        }

        let names = self.search_local(query);
        if names.is_empty() {
            return Ok(ToolResult::success(
                "search_research_reports",
                format!("No reports matched '{query}'"),
            ));
        }

        let mut output = format!(
            "Found {} local reports in {}:\n",
            names.len(),
            self.output_dir.display()
        );
        for name in &names {
            output.push_str(&format!("  {name}\n"));
        }
        let data = json!({"files": names});
        Ok(ToolResult::success("search_research_reports", output.trim_end()).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("journal-{tag}-{}", std::process::id()))
    }

    #[tokio::test]
    async fn test_save_writes_markdown_file() {
        let dir = scratch_dir("save");
        let tool = SaveResearchReportTool::new(None, dir.clone());

        let call = ToolCall::new("save_research_report")
            .with_arg("token", serde_json::json!("BTC"))
            .with_arg("report", serde_json::json!("# BTC Report\n\nBody."));
        let result = tool.execute(&call).await.unwrap();

        assert!(result.success);
        assert!(result.output.starts_with("Report saved to "));
        let path = PathBuf::from(result.data.unwrap()["path"].as_str().unwrap().to_string());
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_notion_destination_falls_back_to_file() {
        let dir = scratch_dir("fallback");
        let tool = SaveResearchReportTool::new(None, dir.clone());

        let call = ToolCall::new("save_research_report")
            .with_arg("token", serde_json::json!("ETH"))
            .with_arg("report", serde_json::json!("# ETH Report"))
            .with_arg("destination", serde_json::json!("notion"));
        let result = tool.execute(&call).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("Notion is not configured"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_search_finds_saved_reports() {
        let dir = scratch_dir("search");
        let save = SaveResearchReportTool::new(None, dir.clone());
        let call = ToolCall::new("save_research_report")
            .with_arg("token", serde_json::json!("SOL"))
            .with_arg("report", serde_json::json!("# SOL Report"));
        save.execute(&call).await.unwrap();

        let search = SearchResearchReportsTool::new(None, dir.clone());
        let call = ToolCall::new("search_research_reports")
            .with_arg("query", serde_json::json!("sol"));
        let result = search.execute(&call).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("sol_"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_search_with_no_journal_reports_empty() {
        let search =
            SearchResearchReportsTool::new(None, scratch_dir("missing-journal"));
        let call = ToolCall::new("search_research_reports")
            .with_arg("query", serde_json::json!("BTC"));
        let result = search.execute(&call).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("No reports matched"));
    }

    #[tokio::test]
    async fn test_blank_arguments_report_failure() {
        let tool = SaveResearchReportTool::new(None, scratch_dir("blank"));
        let call = ToolCall::new("save_research_report")
            .with_arg("token", serde_json::json!("BTC"))
            .with_arg("report", serde_json::json!(""));
        let result = tool.execute(&call).await.unwrap();

        assert!(!result.success);
    }
}
