//! Interactive session loop
//!
//! The session owns the query agent and drives it from a [`LineSource`].
//! Each question runs inside its own [`UsageScope`]; the counters printed
//! after an answer cover that question only.

use crate::agent::QueryAgent;
use crate::cli::commands::{Command, CommandType};
use crate::error::Result;
use crate::llm::{UsageRecord, UsageScope};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;

/// Prompt shown before each question
pub const PROMPT: &str = "\nEnter your question: ";

/// Printed once the session terminates
pub const FAREWELL: &str = "Thanks for using nlsql. Goodbye!";

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Terminated,
}

/// Result of forwarding one question to the agent
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Answered { answer: String, usage: UsageRecord },
    Failed { message: String },
}

/// What handling one input line produced
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Blank input, nothing was sent
    Ignored,
    /// The agent was invoked
    Outcome(QueryOutcome),
    /// An exit keyword or end of input
    Exit,
}

/// Source of user input lines
#[async_trait(?Send)]
pub trait LineSource {
    /// Read one line; `Ok(None)` means end of input
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive session over one query agent
pub struct Session {
    agent: Arc<dyn QueryAgent>,
    state: SessionState,
}

impl Session {
    pub fn new(agent: Arc<dyn QueryAgent>) -> Self {
        Self {
            agent,
            state: SessionState::AwaitingInput,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Invoke the agent inside a fresh usage scope
    pub async fn ask(&self, question: &str) -> QueryOutcome {
        let mut usage = UsageScope::new();
        match self.agent.invoke(question, &mut usage).await {
            Ok(answer) => QueryOutcome::Answered {
                answer,
                usage: usage.finish(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "query failed");
                QueryOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Apply one line of input to the session
    pub async fn handle_input(&mut self, line: &str) -> SessionEvent {
        if self.state == SessionState::Terminated {
            return SessionEvent::Exit;
        }

        match Command::parse(line).command_type {
            CommandType::Quit => {
                self.state = SessionState::Terminated;
                SessionEvent::Exit
            }
            CommandType::Empty => SessionEvent::Ignored,
            CommandType::Query { text } => SessionEvent::Outcome(self.ask(&text).await),
        }
    }

    /// Run until an exit keyword or end of input
    pub async fn run<W: Write>(
        &mut self,
        input: &mut dyn LineSource,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "Welcome to the natural language query system!")?;
        writeln!(out, "Type 'quit' or 'exit' to leave.")?;

        while self.state == SessionState::AwaitingInput {
            let line = match input.read_line(PROMPT).await? {
                Some(line) => line,
                None => {
                    self.state = SessionState::Terminated;
                    break;
                }
            };

            match self.handle_input(&line).await {
                SessionEvent::Ignored | SessionEvent::Exit => {}
                SessionEvent::Outcome(outcome) => {
                    writeln!(out, "{}", format_outcome(&outcome))?;
                }
            }
            out.flush()?;
        }

        writeln!(out, "{}", FAREWELL)?;
        Ok(())
    }
}

/// Text printed for a query outcome
pub fn format_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Answered { answer, usage } => format!(
            "\nResult:\n{}\n\nToken usage:\n{}",
            answer,
            usage.display_lines().join("\n")
        ),
        QueryOutcome::Failed { message } => format!("Query failed: {}", message),
    }
}
