//! Interactive Session
//!
//! Line-based loop: parse which token the user wants researched, run the
//! pipeline, then offer to save or publish the result.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crypto_research::ResearchOrchestrator;
use crypto_research::notion::NotionClient;
use crypto_research::orchestrator::ResearchOutcome;
use crypto_research::report::{extract_confidence, extract_sentiment, save_report_to_file};

use crate::display;

const MAX_BARE_TOKEN_LEN: usize = 20;

const TOKEN_PREFIXES: [&str; 4] = ["research ", "analyze ", "analyse ", "check "];
const TOKEN_PATTERNS: [&str; 3] = ["what's happening with ", "how is ", "tell me about "];

type StdinLines = tokio::io::Lines<BufReader<tokio::io::Stdin>>;

/// What one line of user input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Research(String),
    Help,
    Quit,
    Unrecognized,
}

pub fn parse_request(input: &str) -> Request {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "quit" | "exit" | "q" => return Request::Quit,
        "help" | "?" => return Request::Help,
        _ => {}
    }
    match parse_token(trimmed) {
        Some(token) => Request::Research(token),
        None => Request::Unrecognized,
    }
}

/// Pull a token out of free-form input.
///
/// Accepts command prefixes ("research bitcoin"), question patterns
/// ("how is ETH?"), and bare short words ("sol").
pub fn parse_token(input: &str) -> Option<String> {
    let lower = input.trim().to_lowercase();

    for prefix in TOKEN_PREFIXES {
        if let Some(rest) = lower.strip_prefix(prefix) {
            return normalize_token(rest);
        }
    }
    for pattern in TOKEN_PATTERNS {
        if let Some(rest) = lower.strip_prefix(pattern) {
            return normalize_token(rest);
        }
    }

    let bare = lower.trim_end_matches('?');
    if !bare.is_empty() && !bare.contains(' ') && bare.len() <= MAX_BARE_TOKEN_LEN {
        return normalize_token(bare);
    }
    None
}

fn normalize_token(raw: &str) -> Option<String> {
    let token = raw.trim_end_matches('?').trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_uppercase())
    }
}

/// Run the interactive session until quit or EOF.
pub async fn run(
    orchestrator: &ResearchOrchestrator,
    notion: Option<Arc<NotionClient>>,
    output_dir: &Path,
    skip_publish: bool,
) -> anyhow::Result<()> {
    display::banner();
    display::help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_request(&line) {
            Request::Quit => {
                println!("Goodbye!");
                break;
            }
            Request::Help => display::help(),
            Request::Unrecognized => {
                println!(
                    "I couldn't understand which token to research. \
                     Try something like 'research bitcoin' or just 'ETH'"
                );
            }
            Request::Research(token) => {
                display::status(&format!("Researching {token}..."));
                match orchestrator.research_token(&token).await {
                    Ok(outcome) => {
                        println!("\n{}\n", outcome.report);
                        display::success(&format!(
                            "{}: {} ({}% of weekly allocation)",
                            outcome.token,
                            outcome.guidance.action_bias,
                            outcome.guidance.allocation_percent
                        ));
                        if !skip_publish {
                            offer_save(&mut lines, &outcome, notion.as_deref(), output_dir)
                                .await?;
                        }
                    }
                    Err(e) => display::error(&e.to_string()),
                }
            }
        }
    }
    Ok(())
}

async fn offer_save(
    lines: &mut StdinLines,
    outcome: &ResearchOutcome,
    notion: Option<&NotionClient>,
    output_dir: &Path,
) -> anyhow::Result<()> {
    print!("\nSave report? (f=file, n=notion, enter=skip): ");
    io::stdout().flush()?;

    let Some(choice) = lines.next_line().await? else {
        return Ok(());
    };

    match choice.trim().to_lowercase().as_str() {
        "f" => {
            let path = save_report_to_file(&outcome.report, &outcome.token, output_dir)?;
            display::success(&format!("Saved to {}", path.display()));
        }
        "n" => match notion {
            Some(client) => {
                let sentiment = extract_sentiment(&outcome.report);
                let confidence = extract_confidence(&outcome.report);
                match client
                    .create_report_page(&outcome.token, &outcome.report, confidence, sentiment)
                    .await
                {
                    Ok(page) => {
                        let location = page.url.unwrap_or(page.id);
                        display::success(&format!("Published to Notion: {location}"));
                    }
                    Err(e) => display::error(&e.to_string()),
                }
            }
            None => display::warning(
                "Notion not configured (set NOTION_API_KEY and NOTION_DATABASE_ID)",
            ),
        },
        _ => {}
    }
    Ok(())
}
