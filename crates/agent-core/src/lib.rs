//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction and MCP-style tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Research Agent                           │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Subagent   │  │    Tools    │  │   LlmProvider       │  │
//! │  │   Fan-out   │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Anthropic, OpenAI, or any
//! other backend without changing orchestration logic. The `Tool` trait and
//! `ToolRegistry` carry the MCP-style tool manifests and dispatch.

pub mod provider;
pub mod tool;
pub mod message;
pub mod error;

pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
