//! Tool-calling SQL agent
//!
//! Runs the conversation with the model until it answers in plain text:
//!
//! 1. Sends the conversation plus the toolkit's tool definitions.
//! 2. If the model returns tool calls, executes them in order and appends
//!    each result to the conversation.
//! 3. Repeats until the model replies with text or the iteration limit is hit.
//!
//! Every model response is recorded in the caller's [`UsageScope`].

use crate::agent::prompt;
use crate::agent::toolkit::SqlToolkit;
use crate::agent::QueryAgent;
use crate::database::DatabaseManager;
use crate::error::{NlSqlError, Result};
use crate::llm::{LLMProvider, Message, UsageScope};
use async_trait::async_trait;
use std::sync::Arc;

/// Model round-trips allowed per question
pub const DEFAULT_MAX_ITERATIONS: u32 = 15;

/// Natural-language question answering over one database
pub struct SqlAgent {
    llm: Arc<dyn LLMProvider>,
    toolkit: SqlToolkit,
}

impl SqlAgent {
    pub fn new(llm: Arc<dyn LLMProvider>, db: Arc<DatabaseManager>) -> Self {
        Self {
            toolkit: SqlToolkit::new(db, Arc::clone(&llm)),
            llm,
        }
    }

    fn system_prompt(&self) -> String {
        prompt::system_prompt(
            self.toolkit.database().backend().dialect(),
            prompt::DEFAULT_TOP_K,
        )
    }
}

#[async_trait]
impl QueryAgent for SqlAgent {
    async fn invoke(&self, question: &str, usage: &mut UsageScope) -> Result<String> {
        let tools = self.toolkit.definitions();
        let mut messages = vec![Message::system(self.system_prompt()), Message::user(question)];

        tracing::info!(
            max_iterations = DEFAULT_MAX_ITERATIONS,
            tool_count = tools.len(),
            "agent started"
        );

        for iteration in 0..DEFAULT_MAX_ITERATIONS {
            let response = self.llm.generate(&messages, &tools, None).await?;
            usage.record_response(&response, self.llm.model_name());

            if !response.has_tool_calls() {
                let answer = response.content.trim();
                if answer.is_empty() {
                    return Err(NlSqlError::LLMProvider(format!(
                        "{} returned an empty answer",
                        self.llm.provider_name()
                    )));
                }
                tracing::info!(iterations = iteration + 1, "agent finished");
                return Ok(answer.to_string());
            }

            if !response.content.trim().is_empty() {
                tracing::info!(thought = %response.content.trim(), "agent reasoning");
            }
            messages.push(Message::assistant_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                tracing::info!(iteration, tool = %call.name, input = %call.arguments, "calling tool");

                let output = match self.toolkit.execute(call, usage).await {
                    Ok(output) => output,
                    Err(e) => {
                        tracing::warn!(tool = %call.name, error = %e, "tool failed");
                        format!("Error: {}", e)
                    }
                };

                tracing::info!(tool = %call.name, output = %output, "tool returned");
                messages.push(Message::tool_result(call.id.clone(), output));
            }
        }

        Err(NlSqlError::MaxIterationsExceeded(DEFAULT_MAX_ITERATIONS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{fixture_db, tool_call, ScriptedProvider};
    use crate::agent::toolkit::{LIST_TABLES, QUERY, QUERY_CHECKER, SCHEMA};
    use crate::llm::{LLMResponse, MessageRole};
    use serde_json::json;

    #[tokio::test]
    async fn test_answers_after_tool_calls() {
        let llm = Arc::new(ScriptedProvider::new(vec![
            LLMResponse {
                tool_calls: vec![tool_call("c1", LIST_TABLES, json!({}))],
                ..LLMResponse::new("").with_usage(50, 5)
            },
            LLMResponse {
                tool_calls: vec![tool_call("c2", SCHEMA, json!({"table_names": "Artist"}))],
                ..LLMResponse::new("").with_usage(80, 6)
            },
            LLMResponse {
                tool_calls: vec![tool_call(
                    "c3",
                    QUERY,
                    json!({"query": "SELECT COUNT(*) AS n FROM Artist"}),
                )],
                ..LLMResponse::new("").with_usage(120, 7)
            },
            LLMResponse::new("There are 4 artists.").with_usage(150, 6),
        ]));
        let agent = SqlAgent::new(llm.clone(), fixture_db().await);

        let mut usage = UsageScope::new();
        let answer = agent.invoke("How many artists?", &mut usage).await.unwrap();
        assert_eq!(answer, "There are 4 artists.");

        let record = usage.finish();
        assert_eq!(record.prompt_tokens, 400);
        assert_eq!(record.completion_tokens, 24);
        assert_eq!(record.total_tokens, 424);
        assert_eq!(record.successful_requests, 4);

        let last_request = llm.last_request();
        let tool_results: Vec<&Message> = last_request
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .collect();
        assert_eq!(tool_results.len(), 3);
        assert_eq!(tool_results[0].content, "Artist, Genre");
        assert!(tool_results[1].content.contains("3 rows from Artist table"));
        assert!(tool_results[2].content.contains('4'));
        assert_eq!(last_request[0].role, MessageRole::System);
        assert!(last_request[0].content.contains("sqlite"));
    }

    #[tokio::test]
    async fn test_tool_errors_are_fed_back() {
        let llm = Arc::new(ScriptedProvider::new(vec![
            LLMResponse {
                tool_calls: vec![
                    tool_call("c1", QUERY, json!({"query": "SELECT * FROM Nope"})),
                    tool_call("c2", "drop_everything", json!({})),
                ],
                ..LLMResponse::new("Let me look.")
            },
            LLMResponse::new("I could not find that table."),
        ]));
        let agent = SqlAgent::new(llm.clone(), fixture_db().await);

        let mut usage = UsageScope::new();
        let answer = agent.invoke("Show me nope", &mut usage).await.unwrap();
        assert_eq!(answer, "I could not find that table.");

        let request = llm.last_request();
        let results: Vec<&str> = request
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .map(|m| m.content.as_str())
            .collect();
        assert!(results[0].starts_with("Error: Query failed:"));
        assert_eq!(results[1], "Error: Unknown tool: drop_everything");
    }

    #[tokio::test]
    async fn test_query_checker_uses_llm_and_counts_usage() {
        let llm = Arc::new(ScriptedProvider::new(vec![
            LLMResponse {
                tool_calls: vec![tool_call(
                    "c1",
                    QUERY_CHECKER,
                    json!({"query": "SELECT Name FROM Artist LIMIT 1"}),
                )],
                ..LLMResponse::new("").with_usage(10, 2)
            },
            LLMResponse::new("```sql\nSELECT Name FROM Artist LIMIT 1;\n```").with_usage(30, 9),
            LLMResponse::new("Checked.").with_usage(40, 2),
        ]));
        let agent = SqlAgent::new(llm.clone(), fixture_db().await);

        let mut usage = UsageScope::new();
        agent.invoke("first artist?", &mut usage).await.unwrap();
        assert_eq!(usage.snapshot().total_tokens, 93);
        assert_eq!(usage.snapshot().successful_requests, 3);

        let request = llm.last_request();
        let checked = request
            .iter()
            .find(|m| m.role == MessageRole::Tool)
            .map(|m| m.content.clone());
        assert_eq!(checked.as_deref(), Some("SELECT Name FROM Artist LIMIT 1;"));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let responses = (0..DEFAULT_MAX_ITERATIONS)
            .map(|i| LLMResponse {
                tool_calls: vec![tool_call(&format!("c{i}"), LIST_TABLES, json!({}))],
                ..LLMResponse::new("")
            })
            .collect();
        let llm = Arc::new(ScriptedProvider::new(responses));
        let agent = SqlAgent::new(llm, fixture_db().await);

        let mut usage = UsageScope::new();
        let err = agent.invoke("loop forever", &mut usage).await.unwrap_err();
        assert!(matches!(err, NlSqlError::MaxIterationsExceeded(15)));
        assert_eq!(usage.snapshot().successful_requests, 15);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let llm = Arc::new(ScriptedProvider::new(vec![]));
        let agent = SqlAgent::new(llm, fixture_db().await);

        let mut usage = UsageScope::new();
        assert!(agent.invoke("anything", &mut usage).await.is_err());
        assert_eq!(usage.finish().total_tokens, 0);
    }
}
