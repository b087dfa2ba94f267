//! Notion Publishing
//!
//! Minimal REST client for the Notion API: creates report pages in a
//! database and searches existing ones. Markdown reports are converted to
//! Notion blocks with a simplified converter that covers the patterns the
//! synthesis step actually emits.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ResearchError, Result};

const BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION_HEADER: &str = "Notion-Version";
pub const NOTION_VERSION: &str = "2022-06-28";
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Notion caps rich text content per block
const MAX_BLOCK_CHARS: usize = 2000;

/// Publishing credentials, both optional until actually used
#[derive(Debug, Clone, Default)]
pub struct NotionConfig {
    pub api_key: Option<String>,
    pub database_id: Option<String>,
}

impl NotionConfig {
    /// Read `NOTION_API_KEY` and `NOTION_DATABASE_ID`; empty values count
    /// as unset.
    pub fn from_env() -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
        };
        Self {
            api_key: read("NOTION_API_KEY"),
            database_id: read("NOTION_DATABASE_ID"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.database_id.is_some()
    }
}

/// A page created by [`NotionClient::create_report_page`]
#[derive(Debug, Clone)]
pub struct CreatedPage {
    pub id: String,
    pub url: Option<String>,
}

/// A page returned by [`NotionClient::search`]
#[derive(Debug, Clone)]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub created_time: Option<String>,
}

pub struct NotionClient {
    client: reqwest::Client,
    api_key: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(api_key: impl Into<String>, database_id: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ResearchError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            database_id: database_id.into(),
        })
    }

    /// Build a client from the environment; errors when either credential
    /// is missing.
    pub fn from_env() -> Result<Self> {
        let config = NotionConfig::from_env();
        let api_key = config
            .api_key
            .ok_or_else(|| ResearchError::Config("NOTION_API_KEY not set".to_string()))?;
        let database_id = config
            .database_id
            .ok_or_else(|| ResearchError::Config("NOTION_DATABASE_ID not set".to_string()))?;
        Self::new(api_key, database_id)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{BASE_URL}{path}"))
            .bearer_auth(&self.api_key)
            .header(NOTION_VERSION_HEADER, NOTION_VERSION)
    }

    /// Create a research report page with the standard database properties:
    /// Name, Token, Confidence, Sentiment, Date.
    pub async fn create_report_page(
        &self,
        token: &str,
        report: &str,
        confidence: &str,
        sentiment: &str,
    ) -> Result<CreatedPage> {
        let now = Utc::now();
        let title = format!(
            "{} Research Report - {}",
            token.to_uppercase(),
            now.format("%Y-%m-%d %H:%M UTC")
        );

        let payload = json!({
            "parent": {"database_id": self.database_id},
            "properties": {
                "Name": {"title": [{"text": {"content": title}}]},
                "Token": {"select": {"name": token.to_uppercase()}},
                "Confidence": {"select": {"name": confidence}},
                "Sentiment": {"select": {"name": sentiment}},
                "Date": {"date": {"start": now.to_rfc3339()}}
            },
            "children": markdown_to_blocks(report),
        });

        let response = self.post("/pages").json(&payload).send().await?;
        let response = check_response(response).await?;
        let page: PageObject = response.json().await?;

        tracing::info!(page_id = %page.id, token, "report page created in Notion");
        Ok(CreatedPage {
            id: page.id,
            url: page.url,
        })
    }

    /// Search pages visible to the integration
    pub async fn search(&self, query: &str) -> Result<Vec<PageSummary>> {
        let response = self
            .post("/search")
            .json(&json!({"query": query, "page_size": 10}))
            .send()
            .await?;
        let response = check_response(response).await?;
        let results: SearchResults = response.json().await?;

        Ok(results
            .results
            .into_iter()
            .map(PageObject::into_summary)
            .collect())
    }
}

async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map_or_else(|_| body.chars().take(200).collect(), |err| err.message);
    Err(ResearchError::Publishing(format!("{status}: {message}")))
}

/// Convert markdown to Notion blocks.
///
/// Handles headings 1-3, bullet and numbered lists, dividers, fenced code,
/// and tables (flattened to a paragraph). Consecutive plain lines merge
/// into one paragraph, capped at the Notion per-block limit.
pub fn markdown_to_blocks(markdown: &str) -> Vec<Value> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            i += 1;
            continue;
        }

        if let Some(rest) = line.strip_prefix("# ") {
            blocks.push(rich_text_block("heading_1", rest.trim()));
        } else if let Some(rest) = line.strip_prefix("## ") {
            blocks.push(rich_text_block("heading_2", rest.trim()));
        } else if let Some(rest) = line.strip_prefix("### ") {
            blocks.push(rich_text_block("heading_3", rest.trim()));
        } else if trimmed.starts_with("- ") || trimmed.starts_with("• ") {
            let content = trimmed
                .trim_start_matches("- ")
                .trim_start_matches("• ")
                .trim();
            blocks.push(rich_text_block("bulleted_list_item", content));
        } else if starts_numbered(trimmed) {
            let content = trimmed.splitn(2, ". ").nth(1).unwrap_or(trimmed);
            blocks.push(rich_text_block("numbered_list_item", content));
        } else if is_divider(trimmed) {
            blocks.push(json!({"object": "block", "type": "divider", "divider": {}}));
        } else if trimmed.starts_with("```") {
            let mut code_lines = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].trim().starts_with("```") {
                code_lines.push(lines[i]);
                i += 1;
            }
            blocks.push(json!({
                "object": "block",
                "type": "code",
                "code": {
                    "rich_text": [{"type": "text", "text": {"content": code_lines.join("\n")}}],
                    "language": "plain text"
                }
            }));
        } else if trimmed.starts_with('|') {
            // Tables flatten to a plain paragraph
            let mut table_lines = vec![line];
            while i + 1 < lines.len() && lines[i + 1].trim().starts_with('|') {
                i += 1;
                table_lines.push(lines[i]);
            }
            blocks.push(rich_text_block("paragraph", &table_lines.join("\n")));
        } else {
            let mut para_lines = vec![line];
            while i + 1 < lines.len() && continues_paragraph(lines[i + 1]) {
                i += 1;
                para_lines.push(lines[i]);
            }
            let content: String = para_lines
                .join(" ")
                .trim()
                .chars()
                .take(MAX_BLOCK_CHARS)
                .collect();
            if !content.is_empty() {
                blocks.push(rich_text_block("paragraph", &content));
            }
        }

        i += 1;
    }

    blocks
}

fn rich_text_block(block_type: &str, content: &str) -> Value {
    json!({
        "object": "block",
        "type": block_type,
        (block_type): {
            "rich_text": [{"type": "text", "text": {"content": content}}]
        }
    })
}

fn is_divider(trimmed: &str) -> bool {
    matches!(trimmed, "---" | "***" | "___")
}

fn starts_numbered(trimmed: &str) -> bool {
    trimmed.chars().next().is_some_and(|c| c.is_ascii_digit()) && trimmed.contains(". ")
}

fn continues_paragraph(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !line.starts_with('#')
        && !trimmed.starts_with('-')
        && !trimmed.starts_with('•')
        && !trimmed.starts_with('|')
        && !trimmed.starts_with("```")
        && !starts_numbered(trimmed)
        && !is_divider(trimmed)
}

// ============
// Wire types
// ============

#[derive(Debug, Deserialize)]
struct PageObject {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    created_time: Option<String>,
    #[serde(default)]
    properties: Option<Value>,
}

impl PageObject {
    fn into_summary(self) -> PageSummary {
        let title = extract_title(self.properties.as_ref());
        PageSummary {
            id: self.id,
            title,
            url: self.url,
            created_time: self.created_time,
        }
    }
}

fn extract_title(properties: Option<&Value>) -> String {
    properties
        .and_then(Value::as_object)
        .and_then(|props| {
            props
                .values()
                .find_map(|prop| prop.get("title"))
                .and_then(Value::as_array)
                .and_then(|parts| parts.first())
                .and_then(|part| {
                    part.pointer("/text/content")
                        .or_else(|| part.get("plain_text"))
                })
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Untitled".to_string())
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<PageObject>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_both_credentials() {
        let empty = NotionConfig::default();
        assert!(!empty.is_configured());

        let partial = NotionConfig {
            api_key: Some("secret".to_string()),
            database_id: None,
        };
        assert!(!partial.is_configured());

        let full = NotionConfig {
            api_key: Some("secret".to_string()),
            database_id: Some("db".to_string()),
        };
        assert!(full.is_configured());
    }

    #[test]
    fn test_headings_and_bullets_convert() {
        let blocks = markdown_to_blocks(
            "# Title\n\n## Section\n\n### Sub\n\n- first\n- second\n\n1. one\n2. two",
        );

        let types: Vec<&str> = blocks
            .iter()
            .filter_map(|b| b.get("type").and_then(Value::as_str))
            .collect();
        assert_eq!(
            types,
            vec![
                "heading_1",
                "heading_2",
                "heading_3",
                "bulleted_list_item",
                "bulleted_list_item",
                "numbered_list_item",
                "numbered_list_item",
            ]
        );

        assert_eq!(
            blocks[0].pointer("/heading_1/rich_text/0/text/content"),
            Some(&Value::String("Title".to_string()))
        );
        assert_eq!(
            blocks[5].pointer("/numbered_list_item/rich_text/0/text/content"),
            Some(&Value::String("one".to_string()))
        );
    }

    #[test]
    fn test_dividers_and_code_fences_convert() {
        let blocks = markdown_to_blocks("intro\n\n---\n\n```\nlet x = 1;\n```\n\noutro");

        let types: Vec<&str> = blocks
            .iter()
            .filter_map(|b| b.get("type").and_then(Value::as_str))
            .collect();
        assert_eq!(types, vec!["paragraph", "divider", "code", "paragraph"]);

        assert_eq!(
            blocks[2].pointer("/code/rich_text/0/text/content"),
            Some(&Value::String("let x = 1;".to_string()))
        );
    }

    #[test]
    fn test_consecutive_lines_merge_into_one_paragraph() {
        let blocks = markdown_to_blocks("first line\nsecond line\n\nnew paragraph");

        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].pointer("/paragraph/rich_text/0/text/content"),
            Some(&Value::String("first line second line".to_string()))
        );
    }

    #[test]
    fn test_paragraph_capped_at_block_limit() {
        let long = "x".repeat(5000);
        let blocks = markdown_to_blocks(&long);

        let content = blocks[0]
            .pointer("/paragraph/rich_text/0/text/content")
            .and_then(Value::as_str)
            .unwrap();
        assert_eq!(content.chars().count(), MAX_BLOCK_CHARS);
    }

    #[test]
    fn test_table_flattens_to_paragraph() {
        let blocks = markdown_to_blocks("| a | b |\n|---|---|\n| 1 | 2 |");

        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].get("type").and_then(Value::as_str),
            Some("paragraph")
        );
    }

    #[test]
    fn test_extract_title_from_properties() {
        let properties = json!({
            "Name": {
                "title": [{"type": "text", "text": {"content": "BTC Research Report"}}]
            }
        });
        assert_eq!(extract_title(Some(&properties)), "BTC Research Report");
        assert_eq!(extract_title(None), "Untitled");
    }
}
