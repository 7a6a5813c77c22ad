//! REPL implementation
//!
//! rustyline-backed [`LineSource`] with persistent history. The question
//! loop itself lives in [`Session`].

use crate::agent::QueryAgent;
use crate::cli::commands::EXIT_KEYWORDS;
use crate::cli::session::{LineSource, Session};
use crate::error::{NlSqlError, Result};
use async_trait::async_trait;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::Context;
use rustyline::Helper;
use rustyline::{CompletionType, Config, Editor};
use std::path::PathBuf;
use std::sync::Arc;

/// Completes the exit keywords
struct KeywordCompleter;

impl Completer for KeywordCompleter {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &Context<'_>,
    ) -> std::result::Result<(usize, Vec<String>), ReadlineError> {
        let prefix = line.trim_start().to_lowercase();
        if prefix.is_empty() {
            return Ok((0, vec![]));
        }

        let matches = EXIT_KEYWORDS
            .iter()
            .filter(|keyword| keyword.starts_with(&prefix))
            .map(|s| s.to_string())
            .collect();
        Ok((line.len() - line.trim_start().len(), matches))
    }
}

impl Hinter for KeywordCompleter {
    type Hint = String;
}

impl Highlighter for KeywordCompleter {}

impl Validator for KeywordCompleter {}

impl Helper for KeywordCompleter {}

/// Interactive prompt
pub struct Repl {
    /// The rustyline editor
    editor: Editor<KeywordCompleter, DefaultHistory>,
    /// Where history is loaded from and saved to
    history_path: PathBuf,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .auto_add_history(true)
            .build();

        let mut editor = Editor::<KeywordCompleter, DefaultHistory>::with_config(config)
            .map_err(|e| NlSqlError::Readline(format!("Failed to initialize editor: {}", e)))?;
        editor.set_helper(Some(KeywordCompleter));

        let history_path = history_path();
        if let Err(e) = editor.load_history(&history_path) {
            tracing::debug!(path = %history_path.display(), error = %e, "no history loaded");
        }

        Ok(Self {
            editor,
            history_path,
        })
    }

    /// Run the question loop until the user exits
    pub async fn run(&mut self, agent: Arc<dyn QueryAgent>) -> Result<()> {
        let mut session = Session::new(agent);
        let mut stdout = std::io::stdout();
        let result = session.run(self, &mut stdout).await;

        self.save_history();
        result
    }

    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "could not create history directory");
                return;
            }
        }
        if let Err(e) = self.editor.save_history(&self.history_path) {
            tracing::warn!(path = %self.history_path.display(), error = %e, "could not save history");
        }
    }
}

#[async_trait(?Send)]
impl LineSource for Repl {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                Ok(Some(String::new()))
            }
            Err(ReadlineError::Eof) => {
                println!();
                Ok(None)
            }
            Err(err) => Err(NlSqlError::Readline(err.to_string())),
        }
    }
}

/// History file under the home directory
pub fn history_path() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".nlsql").join("history"))
        .unwrap_or_else(|| ".nlsql-history".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_path() {
        let path = history_path();
        assert!(path.ends_with(".nlsql/history") || path.ends_with(".nlsql-history"));
    }

    #[test]
    fn test_completes_exit_keywords() {
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let (start, matches) = KeywordCompleter.complete("qu", 2, &ctx).unwrap();
        assert_eq!(start, 0);
        assert_eq!(matches, vec!["quit"]);

        let (_, matches) = KeywordCompleter.complete("EX", 2, &ctx).unwrap();
        assert_eq!(matches, vec!["exit"]);

        let (_, matches) = KeywordCompleter.complete("", 0, &ctx).unwrap();
        assert!(matches.is_empty());
    }
}
