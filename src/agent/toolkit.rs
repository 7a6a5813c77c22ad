//! SQL toolkit
//!
//! The four database tools the agent exposes to the model. Tools return
//! plain text; failures are reported as errors and turned into
//! `Error: ...` tool results by the agent loop.

use crate::agent::prompt;
use crate::database::DatabaseManager;
use crate::error::{NlSqlError, Result};
use crate::llm::{LLMProvider, Message, ToolCall, ToolDefinition, UsageScope};
use serde_json::{json, Value};
use std::sync::Arc;

pub const LIST_TABLES: &str = "sql_db_list_tables";
pub const SCHEMA: &str = "sql_db_schema";
pub const QUERY: &str = "sql_db_query";
pub const QUERY_CHECKER: &str = "sql_db_query_checker";

/// Database tools bound to one database and one LLM
pub struct SqlToolkit {
    db: Arc<DatabaseManager>,
    llm: Arc<dyn LLMProvider>,
}

impl SqlToolkit {
    pub fn new(db: Arc<DatabaseManager>, llm: Arc<dyn LLMProvider>) -> Self {
        Self { db, llm }
    }

    /// The database the tools operate on
    pub fn database(&self) -> &DatabaseManager {
        &self.db
    }

    /// Tool definitions advertised to the model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: LIST_TABLES.to_string(),
                description: "List the tables in the database as a comma-separated string."
                    .to_string(),
                parameters: json!({ "type": "object", "properties": {} }),
            },
            ToolDefinition {
                name: SCHEMA.to_string(),
                description: "Get the columns, keys and sample rows of the given tables. \
                              Call sql_db_list_tables first to be sure the tables exist."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "table_names": {
                            "type": "string",
                            "description": "Comma-separated table names, e.g. \"Album, Artist\""
                        }
                    },
                    "required": ["table_names"]
                }),
            },
            ToolDefinition {
                name: QUERY.to_string(),
                description: "Run a SQL query and get the result. If the query is wrong an \
                              error is returned; fix the query and try again."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "A complete SQL query" }
                    },
                    "required": ["query"]
                }),
            },
            ToolDefinition {
                name: QUERY_CHECKER.to_string(),
                description: "Double-check a SQL query for common mistakes before running \
                              it with sql_db_query. Returns the corrected query."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "The SQL query to check" }
                    },
                    "required": ["query"]
                }),
            },
        ]
    }

    /// Run one tool call
    pub async fn execute(&self, call: &ToolCall, usage: &mut UsageScope) -> Result<String> {
        match call.name.as_str() {
            LIST_TABLES => Ok(self.db.table_names().await?.join(", ")),
            SCHEMA => {
                let raw = string_arg(call, "table_names")?;
                let names: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect();
                if names.is_empty() {
                    return Err(NlSqlError::tool(SCHEMA, "no table names given"));
                }
                self.db.table_info(&names).await
            }
            QUERY => {
                let sql = string_arg(call, "query")?;
                self.db.run(&sql).await
            }
            QUERY_CHECKER => {
                let sql = string_arg(call, "query")?;
                self.check_query(&sql, usage).await
            }
            other => Err(NlSqlError::UnknownTool(other.to_string())),
        }
    }

    /// Ask the model to review a query; its usage counts toward `usage`
    async fn check_query(&self, sql: &str, usage: &mut UsageScope) -> Result<String> {
        let messages = [Message::user(prompt::query_checker_prompt(
            self.db.backend().dialect(),
            sql,
        ))];
        let response = self.llm.complete(&messages).await?;
        usage.record_response(&response, self.llm.model_name());
        Ok(prompt::strip_code_fence(&response.content))
    }
}

/// Pull a string argument out of a tool call
///
/// Accepts `{"key": "..."}`, `{"key": ["a", "b"]}` (joined with commas),
/// or a bare string when the model did not send a JSON object.
fn string_arg(call: &ToolCall, key: &str) -> Result<String> {
    let value = match &call.arguments {
        Value::String(raw) => return Ok(raw.clone()),
        Value::Object(map) => map.get(key),
        _ => None,
    };

    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", ")),
        _ => Err(NlSqlError::tool(
            call.name.clone(),
            format!("missing string argument '{}'", key),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{fixture_db, ScriptedProvider};

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn test_string_arg_shapes() {
        assert_eq!(
            string_arg(&call(QUERY, json!({"query": "SELECT 1"})), "query").unwrap(),
            "SELECT 1"
        );
        assert_eq!(
            string_arg(&call(QUERY, json!("SELECT 2")), "query").unwrap(),
            "SELECT 2"
        );
        assert_eq!(
            string_arg(&call(SCHEMA, json!({"table_names": ["Album", "Artist"]})), "table_names")
                .unwrap(),
            "Album, Artist"
        );
        assert!(string_arg(&call(QUERY, json!({})), "query").is_err());
        assert!(string_arg(&call(QUERY, json!({"query": "  "})), "query").is_err());
    }

    #[test]
    fn test_execute_dispatches_by_name() {
        tokio_test::block_on(async {
            let toolkit = SqlToolkit::new(
                fixture_db().await,
                Arc::new(ScriptedProvider::new(vec![])),
            );
            let mut usage = UsageScope::new();

            let tables = toolkit.execute(&call(LIST_TABLES, json!({})), &mut usage).await;
            assert_eq!(tables.unwrap(), "Artist, Genre");

            let err = toolkit
                .execute(&call(SCHEMA, json!({"table_names": " , "})), &mut usage)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Tool sql_db_schema failed: no table names given");

            let err = toolkit
                .execute(&call(SCHEMA, json!({"table_names": "Artist, Track"})), &mut usage)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("{Track}"));

            let err = toolkit
                .execute(&call("sql_db_drop", json!({})), &mut usage)
                .await
                .unwrap_err();
            assert!(matches!(err, NlSqlError::UnknownTool(name) if name == "sql_db_drop"));

            assert_eq!(usage.finish().successful_requests, 0);
        });
    }

    #[test]
    fn test_definitions_match_dispatch() {
        tokio_test::block_on(async {
            let toolkit = SqlToolkit::new(
                fixture_db().await,
                Arc::new(ScriptedProvider::new(vec![])),
            );
            let names: Vec<String> = toolkit.definitions().into_iter().map(|d| d.name).collect();
            assert_eq!(names, vec![LIST_TABLES, SCHEMA, QUERY, QUERY_CHECKER]);
        });
    }
}
