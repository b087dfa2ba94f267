//! Report Assembly
//!
//! Synthesizes the subagent findings into one markdown report, splices in
//! the deterministic guidance block, and handles local persistence. The
//! synthesis step is explicitly told to leave allocation advice out; that
//! block is computed, never generated.

use std::path::{Path, PathBuf};

use agent_core::{GenerationOptions, LlmProvider, Message};
use chrono::Utc;

use crate::error::Result;
use crate::subagents::SubagentReports;

pub const SYNTHESIS_MAX_TOKENS: u32 = 4096;

const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Build the synthesis prompt from the three subagent sections.
pub fn synthesis_prompt(
    token: &str,
    reports: &SubagentReports,
    report_template: &str,
    generated_at: &str,
) -> String {
    format!(
        "You are synthesizing a cryptocurrency research report for {token}.\n\n\
         You have received analysis from three specialized subagents:\n\n\
         ## Price Analysis (from price_analyst)\n\
         {price}\n\n\
         ## News Analysis (from news_aggregator)\n\
         {news}\n\n\
         ## Sentiment Analysis (from social_sentinel)\n\
         {sentiment}\n\n\
         ## Your Task\n\n\
         Synthesize these findings into a cohesive research report following this template:\n\n\
         {report_template}\n\n\
         ## Synthesis Guidelines\n\n\
         1. **Identify agreements** - Where do price, news, and sentiment align?\n\
         2. **Flag contradictions** - Where do they conflict? Explain why.\n\
         3. **Assess confidence** - Rate High/Medium/Low based on data quality and alignment\n\
         4. **Key takeaways** - What are the 3-5 most important insights?\n\n\
         Do not include allocation percentages or buy/sell sizing; that guidance is \
         computed separately and spliced into the report afterwards.\n\n\
         Generate the complete report now. Include today's date: {generated_at}",
        price = reports.price_section(),
        news = reports.news_section(),
        sentiment = reports.sentiment_section(),
    )
}

/// Run the synthesis completion over the collected subagent reports.
pub async fn synthesize_report(
    provider: &dyn LlmProvider,
    model: &str,
    token: &str,
    reports: &SubagentReports,
    report_template: &str,
) -> Result<String> {
    tracing::info!(token, "synthesizing research findings");

    let generated_at = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    let prompt = synthesis_prompt(token, reports, report_template, &generated_at);

    let options = GenerationOptions {
        model: model.to_string(),
        max_tokens: SYNTHESIS_MAX_TOKENS,
        ..Default::default()
    };
    let completion = provider.complete(&[Message::user(prompt)], &options).await?;
    Ok(completion.content)
}

/// Splice the rendered guidance block into a synthesized report.
///
/// Preferred position: after the "Executive Summary" heading, immediately
/// before the next "Price Analysis" heading. Falls back to the first
/// divider line, then to prepending when the document has neither.
pub fn inject_allocation_guidance(report: &str, guidance: &str) -> String {
    let lines: Vec<&str> = report.lines().collect();

    let exec_idx = lines
        .iter()
        .position(|line| is_heading(line) && line.contains("Executive Summary"));

    if let Some(exec_idx) = exec_idx {
        let price_offset = lines[exec_idx + 1..]
            .iter()
            .position(|line| is_heading(line) && line.contains("Price Analysis"));
        if let Some(offset) = price_offset {
            return splice_lines(&lines, exec_idx + 1 + offset, guidance);
        }
    }

    if let Some(divider_idx) = lines.iter().position(|line| is_divider_line(line)) {
        return splice_lines(&lines, divider_idx + 1, guidance);
    }

    format!("{guidance}\n\n{report}")
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn is_divider_line(line: &str) -> bool {
    matches!(line.trim(), "---" | "***" | "___")
}

fn splice_lines(lines: &[&str], insert_at: usize, guidance: &str) -> String {
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 4);
    out.extend(lines[..insert_at].iter().map(|l| (*l).to_string()));

    if out.last().is_some_and(|l| !l.trim().is_empty()) {
        out.push(String::new());
    }
    out.push(guidance.to_string());
    out.push(String::new());

    out.extend(lines[insert_at..].iter().map(|l| (*l).to_string()));
    out.join("\n")
}

/// Coarse sentiment read for publishing metadata
pub fn extract_sentiment(report: &str) -> &'static str {
    let lower = report.to_lowercase();
    if lower.contains("bullish") {
        "Bullish"
    } else if lower.contains("bearish") {
        "Bearish"
    } else {
        "Neutral"
    }
}

/// Coarse confidence read for publishing metadata
pub fn extract_confidence(report: &str) -> &'static str {
    let lower = report.to_lowercase();
    if lower.contains("high confidence") {
        "High"
    } else if lower.contains("low confidence") {
        "Low"
    } else {
        "Medium"
    }
}

/// `OUTPUT_DIR` override or the default reports directory
pub fn default_output_dir() -> PathBuf {
    std::env::var("OUTPUT_DIR")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from)
}

/// Write a report to `<output_dir>/<token>_<timestamp>.md`
pub fn save_report_to_file(report: &str, token: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let filename = format!(
        "{}_{}.md",
        token.to_lowercase(),
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    let path = output_dir.join(filename);
    std::fs::write(&path, report)?;

    tracing::info!(path = %path.display(), "report saved");
    Ok(path)
}
