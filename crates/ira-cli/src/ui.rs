//! Terminal output for the assistant

use colored::*;
use crossterm::terminal::size;
use std::io::{self, Write};

use ira_core::{ConversationState, Error, IndexingResult};

const APP_NAME: &str = "Knowledge Base RAG Assistant";

/// Display the startup banner
pub fn display_banner(out: &mut impl Write, model: &str, stats: &IndexingResult) -> io::Result<()> {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let rule = "=".repeat(std::cmp::min(50, terminal_width.max(1)));

    writeln!(out, "{}", format!("🚀 {} Started!", APP_NAME).blue().bold())?;
    writeln!(out, "{}", rule.blue())?;
    writeln!(out, "Using model: {}", model.green())?;
    write!(
        out,
        "Indexed {} chunks from {} documents",
        stats.chunks_indexed, stats.documents_indexed
    )?;
    if stats.files_skipped > 0 {
        write!(out, " ({} skipped)", stats.files_skipped.to_string().yellow())?;
    }
    writeln!(out)?;
    writeln!(out, "{}", rule.blue())?;
    out.flush()
}

/// Display help message
pub fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "Available commands:".bold())?;
    writeln!(out, "  {} - Ask anything about the documents in the knowledge base", "<question>".green())?;
    writeln!(out, "  {} - Show this help message", "help".green())?;
    writeln!(out, "  {} - Exit the application", "quit/exit/q".green())?;
    writeln!(out)?;
    writeln!(out, "{}", "Examples:".bold())?;
    writeln!(out, "  What does the knowledge base say about bananas?")?;
    writeln!(out, "  Summarize the notes on quarterly revenue")
}

/// Print the answer of a completed turn
pub fn display_response(out: &mut impl Write, state: &ConversationState) -> io::Result<()> {
    match state.answer.as_deref() {
        Some(answer) => writeln!(out, "\n💬 {} {}", "Answer:".bold(), answer),
        None => writeln!(out, "\n💬 {}", "No answer found.".yellow()),
    }
}

/// Print a failed turn; the session carries on afterwards
pub fn display_error(out: &mut impl Write, error: &Error) -> io::Result<()> {
    writeln!(out, "\n❌ {} {}", "Error:".red().bold(), error)?;
    writeln!(out, "Please try again with a different question.")
}

pub fn display_hint(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "❌ {}", "Please enter a question or command.".yellow())
}

pub fn display_farewell(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n👋 {}", format!("Goodbye! Thanks for using {}.", APP_NAME).green())
}
