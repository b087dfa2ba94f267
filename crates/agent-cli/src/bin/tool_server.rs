//! Tool Server
//!
//! Exposes the research tools over stdio JSON-RPC 2.0 for MCP-style hosts.
//! Supported methods: initialize, tools/list, tools/call. Requests without
//! an id are treated as notifications and ignored.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use agent_core::{ToolCall, ToolRegistry, ToolSchema};
use crypto_research::feeds::{CoinGeckoFeed, MarketDataFeed, MockFeed};
use crypto_research::notion::{NotionClient, NotionConfig};
use crypto_research::report::default_output_dir;
use crypto_research::svckit::standard_registry;

const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Parser)]
#[command(name = "tool-server", about = "Stdio JSON-RPC server for the research tools")]
struct Cli {
    /// Serve mock market data instead of CoinGecko.
    #[arg(long, default_value_t = false)]
    mock: bool,

    /// Directory for saved reports. Defaults to OUTPUT_DIR or ./reports.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean JSON-RPC stream
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let feed: Arc<dyn MarketDataFeed> = if cli.mock {
        Arc::new(MockFeed::default())
    } else {
        Arc::new(CoinGeckoFeed::from_env()?)
    };
    let notion = if !cli.mock && NotionConfig::from_env().is_configured() {
        NotionClient::from_env().ok().map(Arc::new)
    } else {
        None
    };
    let output_dir = cli.output_dir.unwrap_or_else(default_output_dir);

    let registry = standard_registry(feed, notion, &output_dir);
    tracing::info!(tools = registry.len(), "tool server ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handle_line(&registry, &line).await {
            writeln!(stdout, "{response}")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

async fn handle_line(registry: &ToolRegistry, line: &str) -> Option<String> {
    let request: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(_) => return Some(error_response(Value::Null, -32700, "Parse error")),
    };

    let method = request
        .get("method")
        .and_then(|m| m.as_str())
        .unwrap_or_default()
        .to_string();
    // No id means notification: process nothing, answer nothing
    let id = request.get("id").cloned()?;

    let response = match method.as_str() {
        "initialize" => success_response(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {
                    "name": "crypto-research-tools",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),
        "tools/list" => {
            let tools: Vec<Value> = registry.schemas().iter().map(mcp_tool).collect();
            success_response(id, json!({"tools": tools}))
        }
        "tools/call" => handle_tool_call(registry, &request, id).await,
        _ => error_response(id, -32601, "Method not found"),
    };
    Some(response)
}

async fn handle_tool_call(registry: &ToolRegistry, request: &Value, id: Value) -> String {
    let params = request.get("params").cloned().unwrap_or_else(|| json!({}));
    let name = params
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or_default()
        .to_string();
    let arguments = params
        .get("arguments")
        .and_then(|a| a.as_object())
        .map(|map| map.clone().into_iter().collect())
        .unwrap_or_default();

    let call = ToolCall {
        name,
        arguments,
        id: Some(Uuid::new_v4().to_string()),
    };

    match registry.execute(&call).await {
        Ok(result) => {
            let text = serde_json::to_string_pretty(&result)
                .unwrap_or_else(|_| result.output.clone());
            success_response(
                id,
                json!({
                    "content": [{"type": "text", "text": text}],
                    "isError": !result.success,
                }),
            )
        }
        Err(e) => error_response(id, -32603, &e.to_string()),
    }
}

/// Convert a tool schema into the MCP tool manifest shape.
fn mcp_tool(schema: &ToolSchema) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for param in &schema.parameters {
        let mut property = json!({
            "type": param.param_type,
            "description": param.description,
        });
        if let Some(default) = &param.default {
            property["default"] = default.clone();
        }
        if let Some(enum_values) = &param.enum_values {
            property["enum"] = json!(enum_values);
        }
        properties.insert(param.name.clone(), property);
        if param.required {
            required.push(param.name.clone());
        }
    }

    json!({
        "name": schema.name,
        "description": schema.description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": required,
        },
    })
}

fn success_response(id: Value, result: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "result": result}).to_string()
}

fn error_response(id: Value, code: i64, message: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": code, "message": message},
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn mock_registry() -> ToolRegistry {
        standard_registry(Arc::new(MockFeed::default()), None, Path::new("reports"))
    }

    #[tokio::test]
    async fn test_initialize_reports_protocol() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        let response = handle_line(&mock_registry(), request).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(
            value["result"]["serverInfo"]["name"],
            "crypto-research-tools"
        );
    }

    #[tokio::test]
    async fn test_tools_list_includes_manifest() {
        let request = r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#;
        let response = handle_line(&mock_registry(), request).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();

        let tools = value["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 7);
        let price = tools
            .iter()
            .find(|t| t["name"] == "get_crypto_price")
            .unwrap();
        assert_eq!(price["inputSchema"]["type"], "object");
        assert_eq!(price["inputSchema"]["required"][0], "token");
    }

    #[tokio::test]
    async fn test_tools_call_runs_tool() {
        let request = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"get_crypto_price","arguments":{"token":"BTC"}}}"#;
        let response = handle_line(&mock_registry(), request).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();

        assert_eq!(value["result"]["isError"], false);
        let text = value["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Bitcoin"));
    }

    #[tokio::test]
    async fn test_unknown_method_and_parse_errors() {
        let registry = mock_registry();

        let response = handle_line(
            &registry,
            r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#,
        )
        .await
        .unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["error"]["code"], -32601);

        let response = handle_line(&registry, "not json at all").await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["error"]["code"], -32700);
        assert!(value["id"].is_null());
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let request = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(handle_line(&mock_registry(), request).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_rpc_error() {
        let request = r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"get_crypto_price","arguments":{}}}"#;
        let response = handle_line(&mock_registry(), request).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();

        assert_eq!(value["error"]["code"], -32603);
        assert!(
            value["error"]["message"]
                .as_str()
                .unwrap()
                .contains("token")
        );
    }
}
