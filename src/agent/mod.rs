//! Query agent module
//!
//! The session talks to the agent only through [`QueryAgent`]; the SQL
//! agent, its toolkit, and its prompts live behind that seam.

pub mod prompt;
pub mod sql_agent;
pub mod toolkit;

use crate::error::Result;
use crate::llm::UsageScope;
use async_trait::async_trait;

// Re-exports
pub use sql_agent::SqlAgent;
pub use toolkit::SqlToolkit;

/// Answers one natural-language question
#[async_trait]
pub trait QueryAgent: Send + Sync {
    /// Answer `question`, recording every LLM call's usage in `usage`
    ///
    /// No state is carried from one invocation to the next.
    async fn invoke(&self, question: &str, usage: &mut UsageScope) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::database::{DatabaseManager, DatabasePool};
    use crate::error::{NlSqlError, Result};
    use crate::llm::{GenerationParams, LLMProvider, LLMResponse, Message, ToolCall, ToolDefinition};
    use async_trait::async_trait;
    use serde_json::Value;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Provider that replays canned responses and records each request
    pub struct ScriptedProvider {
        responses: Mutex<VecDeque<LLMResponse>>,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedProvider {
        pub fn new(responses: Vec<LLMResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn last_request(&self) -> Vec<Message> {
            self.requests.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn generate(
            &self,
            messages: &[Message],
            _tools: &[ToolDefinition],
            _params: Option<&GenerationParams>,
        ) -> Result<LLMResponse> {
            self.requests.lock().unwrap().push(messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| NlSqlError::LLMProvider("script exhausted".to_string()))
        }

        fn provider_name(&self) -> &str {
            "Scripted"
        }

        fn model_name(&self) -> &str {
            "gpt-3.5-turbo"
        }

        fn has_api_key(&self) -> bool {
            true
        }
    }

    pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    /// Small in-memory database with `Artist` (4 rows) and empty `Genre`
    pub async fn fixture_db() -> Arc<DatabaseManager> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::raw_sql(
            r#"
            CREATE TABLE Artist (ArtistId INTEGER PRIMARY KEY, Name TEXT);
            INSERT INTO Artist (Name) VALUES ('AC/DC'), ('Accept'), ('Aerosmith'), ('Alanis Morissette');
            CREATE TABLE Genre (GenreId INTEGER PRIMARY KEY, Name TEXT);
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        Arc::new(DatabaseManager::from_pool(DatabasePool::Sqlite(pool)))
    }
}
