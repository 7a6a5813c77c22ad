//! Configuration module
//!
//! Resolves which LLM provider and which database backend to use from the
//! process environment. Resolution happens once at startup and the result is
//! never mutated afterwards.

pub mod env;

use crate::database::DatabaseBackend;
use std::path::PathBuf;

pub use env::mask_secret;

/// Which chat-completion endpoint to talk to, with only the fields that branch needs
#[derive(Debug, Clone, PartialEq)]
pub enum LlmConfig {
    /// Azure-hosted OpenAI deployment
    Azure {
        endpoint: String,
        deployment: String,
        api_key: String,
        api_version: String,
    },
    /// OpenAI (or any compatible) API reached directly
    OpenAI {
        model: String,
        api_key: String,
        /// Custom base URL, `None` means the public OpenAI endpoint
        base_url: Option<String>,
    },
}

impl LlmConfig {
    /// Short human-readable description, e.g. `Azure OpenAI (my-deployment)`
    pub fn describe(&self) -> String {
        match self {
            LlmConfig::Azure { deployment, .. } => format!("Azure OpenAI ({})", deployment),
            LlmConfig::OpenAI { model, .. } => format!("OpenAI ({})", model),
        }
    }

    /// The API key for whichever branch is selected
    pub fn api_key(&self) -> &str {
        match self {
            LlmConfig::Azure { api_key, .. } | LlmConfig::OpenAI { api_key, .. } => api_key,
        }
    }
}

/// Connection parameters for a networked MySQL server
#[derive(Debug, Clone, PartialEq)]
pub struct MySqlSettings {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Kept verbatim; a malformed port is reported by the connector
    pub port: String,
}

/// Which database to open
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseConfig {
    /// Embedded file-based SQLite database
    Sqlite { path: PathBuf },
    /// Networked MySQL server
    MySql(MySqlSettings),
}

impl DatabaseConfig {
    /// Backend this configuration selects
    pub fn backend(&self) -> DatabaseBackend {
        match self {
            DatabaseConfig::Sqlite { .. } => DatabaseBackend::SQLite,
            DatabaseConfig::MySql(_) => DatabaseBackend::MySQL,
        }
    }

    /// Connection descriptor with the password replaced by `****`
    pub fn display_url(&self) -> String {
        match self {
            DatabaseConfig::Sqlite { path } => format!("sqlite://{}", path.display()),
            DatabaseConfig::MySql(s) => format!(
                "mysql://{}:****@{}:{}/{}",
                s.user, s.host, s.port, s.database
            ),
        }
    }

    /// Short human-readable description, e.g. `SQLite (Chinook.db)`
    pub fn describe(&self) -> String {
        match self {
            DatabaseConfig::Sqlite { path } => format!("SQLite ({})", path.display()),
            DatabaseConfig::MySql(_) => format!("MySQL ({})", self.display_url()),
        }
    }
}

/// Immutable snapshot of everything needed to assemble a session
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
}

impl RuntimeConfig {
    /// Resolve configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration from an arbitrary variable lookup
    ///
    /// Absent variables fall back to their documented defaults. A variable
    /// that is set, even to an empty string, is taken as-is. Nothing is
    /// validated here; a missing endpoint or key shows up on the first request.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let model_type = get(env::MODEL_TYPE, env::DEFAULT_MODEL_TYPE);
        let llm = if model_type.eq_ignore_ascii_case("azure") {
            LlmConfig::Azure {
                endpoint: get(env::AZURE_OPENAI_ENDPOINT, ""),
                deployment: get(env::AZURE_OPENAI_DEPLOYMENT_NAME, ""),
                api_key: get(env::AZURE_OPENAI_API_KEY, ""),
                api_version: get(env::AZURE_OPENAI_API_VERSION, ""),
            }
        } else {
            LlmConfig::OpenAI {
                model: get(env::MODEL_NAME, env::DEFAULT_MODEL_NAME),
                api_key: get(env::OPENAI_API_KEY, ""),
                base_url: lookup(env::OPENAI_API_BASE).filter(|url| !url.trim().is_empty()),
            }
        };

        let db_type = get(env::DB_TYPE, env::DEFAULT_DB_TYPE);
        let database = if db_type.eq_ignore_ascii_case("mysql") {
            DatabaseConfig::MySql(MySqlSettings {
                host: get(env::MYSQL_HOST, env::DEFAULT_MYSQL_HOST),
                user: get(env::MYSQL_USER, env::DEFAULT_MYSQL_USER),
                password: get(env::MYSQL_PASSWORD, ""),
                database: get(env::MYSQL_DATABASE, ""),
                port: get(env::MYSQL_PORT, env::DEFAULT_MYSQL_PORT),
            })
        } else {
            DatabaseConfig::Sqlite {
                path: PathBuf::from(get(env::SQLITE_PATH, env::DEFAULT_SQLITE_PATH)),
            }
        };

        Self { llm, database }
    }

    /// Startup summary lines with credentials masked
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Model:    {}", self.llm.describe())];
        if let LlmConfig::Azure { endpoint, .. } = &self.llm {
            let endpoint = if endpoint.is_empty() { "(not set)" } else { endpoint };
            lines.push(format!("Endpoint: {}", endpoint));
        }
        if let LlmConfig::OpenAI {
            base_url: Some(base_url),
            ..
        } = &self.llm
        {
            lines.push(format!("Base URL: {}", base_url));
        }
        lines.push(format!("API key:  {}", mask_secret(self.llm.api_key())));
        lines.push(format!("Database: {}", self.database.describe()));
        lines
    }
}
