//! CLI module
//!
//! This module provides the command-line interface for nlsql: input
//! parsing, the question/answer session, and the rustyline prompt.

pub mod commands;
pub mod repl;
pub mod session;

// Re-exports
pub use repl::Repl;
pub use session::{LineSource, QueryOutcome, Session, SessionEvent, SessionState};
