//! Terminal Output
//!
//! Colored console helpers for the interactive session.

use colored::Colorize;

pub fn banner() {
    println!();
    println!("{}", "╔══════════════════════════════════════════╗".cyan());
    println!("{}", "║        🔍  CRYPTO RESEARCH AGENT         ║".cyan());
    println!("{}", "╚══════════════════════════════════════════╝".cyan());
}

pub fn help() {
    println!();
    println!("Commands:");
    println!("  research <token>   Full research run (e.g., 'research bitcoin')");
    println!("  <token>            Shorthand for the same (e.g., 'ETH')");
    println!("  help               Show this message");
    println!("  quit               Exit");
}

pub fn status(message: &str) {
    println!("{} {}", "→".cyan(), message);
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗ Error:".red(), message);
}
