//! Application context
//!
//! Everything the session needs, assembled once at startup from a resolved
//! [`RuntimeConfig`]. Any failure here is fatal to startup.

use crate::agent::{QueryAgent, SqlAgent};
use crate::config::RuntimeConfig;
use crate::database::DatabaseManager;
use crate::error::Result;
use crate::llm::{self, LLMProvider};
use std::sync::Arc;

/// Assembled components
pub struct AppContext {
    pub config: RuntimeConfig,
    pub llm: Arc<dyn LLMProvider>,
    pub database: Arc<DatabaseManager>,
    pub agent: Arc<SqlAgent>,
}

impl AppContext {
    /// Build the LLM client, connect to the database, and assemble the agent
    pub async fn build(config: RuntimeConfig) -> Result<Self> {
        let llm = llm::build_provider(&config.llm)?;
        let database = Arc::new(DatabaseManager::connect(&config.database).await?);
        let agent = Arc::new(SqlAgent::new(Arc::clone(&llm), Arc::clone(&database)));

        Ok(Self {
            config,
            llm,
            database,
            agent,
        })
    }

    /// The agent behind the session seam
    pub fn query_agent(&self) -> Arc<dyn QueryAgent> {
        self.agent.clone()
    }

    /// Release the database pool
    pub async fn shutdown(&self) {
        self.database.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, LlmConfig};
    use crate::database::DatabaseBackend;

    #[tokio::test]
    async fn test_build_with_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Chinook.db");
        let config = RuntimeConfig {
            llm: LlmConfig::OpenAI {
                api_key: "sk-test".to_string(),
                model: "gpt-3.5-turbo".to_string(),
                base_url: None,
            },
            database: DatabaseConfig::Sqlite { path: path.clone() },
        };

        let ctx = AppContext::build(config).await.unwrap();
        assert_eq!(ctx.llm.model_name(), "gpt-3.5-turbo");
        assert_eq!(ctx.database.backend(), DatabaseBackend::SQLite);
        assert!(ctx.database.table_names().await.unwrap().is_empty());
        ctx.shutdown().await;
        assert!(path.exists());
    }
}
