//! Interactive question loop

use colored::*;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

use ira_core::{RagEngine, Result, RunConfig};

use crate::ui;

/// Prompt shown before every question
pub const PROMPT: &str = "Ask me about your knowledge base (or type 'help' for commands): ";

const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

/// What a line of user input asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Exit,
    Empty,
    Help,
    Question(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let input = line.trim();
        if EXIT_COMMANDS.iter().any(|c| input.eq_ignore_ascii_case(c)) {
            Command::Exit
        } else if input.is_empty() {
            Command::Empty
        } else if input.eq_ignore_ascii_case("help") {
            Command::Help
        } else {
            Command::Question(input)
        }
    }
}

/// A read-answer loop over any line source and output sink
pub struct ChatSession<R: BufRead, W: Write> {
    input: R,
    output: W,
    run_config: RunConfig,
}

impl<R: BufRead, W: Write> ChatSession<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            run_config: RunConfig::default(),
        }
    }

    pub fn with_run_config(mut self, run_config: RunConfig) -> Self {
        self.run_config = run_config;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until an exit command or end of input.
    ///
    /// Pipeline failures are reported and the loop continues; only terminal
    /// I/O errors end it early.
    pub async fn run<E: RagEngine + ?Sized>(&mut self, engine: &E) -> Result<()> {
        loop {
            write!(self.output, "\n{}", PROMPT.cyan())?;
            self.output.flush()?;

            // Raw bytes so a line that isn't valid UTF-8 can't end the session
            let mut raw = Vec::new();
            if self.input.read_until(b'\n', &mut raw)? == 0 {
                writeln!(self.output)?;
                ui::display_farewell(&mut self.output)?;
                return Ok(());
            }

            let line = String::from_utf8_lossy(&raw);
            match Command::parse(&line) {
                Command::Exit => {
                    ui::display_farewell(&mut self.output)?;
                    return Ok(());
                }
                Command::Empty => ui::display_hint(&mut self.output)?,
                Command::Help => ui::print_help(&mut self.output)?,
                Command::Question(question) => self.ask(engine, question).await?,
            }
        }
    }

    /// Answer one question and print the outcome
    pub async fn ask<E: RagEngine + ?Sized>(&mut self, engine: &E, question: &str) -> Result<()> {
        debug!(thread_id = %self.run_config.thread_id, "invoking pipeline");

        match engine.invoke(question, &self.run_config).await {
            Ok(state) => ui::display_response(&mut self.output, &state)?,
            Err(e) => {
                if e.is_invalid_input() {
                    debug!(error = %e, "turn rejected");
                } else {
                    warn!(error = %e, "turn failed");
                }
                ui::display_error(&mut self.output, &e)?;
            }
        }

        Ok(())
    }
}
