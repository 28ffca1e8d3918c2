//! Terminal interface for the knowledge-base RAG assistant

mod session;
mod ui;


pub use session::{ChatSession, Command, PROMPT};
pub use ui::{
    display_banner, display_error, display_farewell, display_hint, display_response, print_help,
};

// Re-export core types
pub use ira_core::{Error, Result};
