//! Database Manager
//!
//! This module implements the DatabaseManager struct, the single handle the
//! agent uses for schema introspection and query execution.

use crate::config::DatabaseConfig;
use crate::database::connection::{DatabaseBackend, DatabasePool};
use crate::database::render;
use crate::database::schema::SchemaIndex;
use crate::error::{NlSqlError, Result};
use tokio::sync::RwLock;

/// Number of example rows shown with each table definition
pub const SAMPLE_ROWS: usize = 3;

/// Database Manager
///
/// Owns the connection pool and a lazily built schema index.
pub struct DatabaseManager {
    /// Database connection pool
    pool: DatabasePool,
    /// Database backend type
    backend: DatabaseBackend,
    /// Schema index, built on first use
    schema_index: RwLock<Option<SchemaIndex>>,
}

impl DatabaseManager {
    /// Connects to the configured database and verifies the connection
    ///
    /// # Example
    /// ```no_run
    /// use nlsql::config::DatabaseConfig;
    /// use nlsql::database::manager::DatabaseManager;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = DatabaseConfig::Sqlite { path: "Chinook.db".into() };
    ///     let manager = DatabaseManager::connect(&config).await?;
    ///     println!("{:?}", manager.table_names().await?);
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = DatabasePool::connect(config).await?;
        pool.test_connection().await?;

        tracing::info!(backend = %pool.backend(), url = %config.display_url(), "database connected");
        Ok(Self::from_pool(pool))
    }

    /// Wrap an already open pool
    pub fn from_pool(pool: DatabasePool) -> Self {
        Self {
            backend: pool.backend(),
            pool,
            schema_index: RwLock::new(None),
        }
    }

    /// Queries the system catalogs and builds a fresh schema index
    async fn index_database(&self) -> Result<SchemaIndex> {
        match &self.pool {
            DatabasePool::Sqlite(pool) => crate::database::indexer::index_sqlite(pool).await,
            DatabasePool::MySql(pool) => crate::database::indexer::index_mysql(pool).await,
        }
    }

    /// Get the schema index, building it on first use
    pub async fn schema(&self) -> Result<SchemaIndex> {
        if let Some(index) = self.schema_index.read().await.as_ref() {
            return Ok(index.clone());
        }

        let mut guard = self.schema_index.write().await;
        if guard.is_none() {
            let index = self.index_database().await?;
            tracing::debug!(
                database = index.database_name.as_deref().unwrap_or("-"),
                tables = index.tables.len(),
                indexed_at = %index.indexed_at,
                "schema indexed"
            );
            *guard = Some(index);
        }
        guard
            .clone()
            .ok_or_else(|| NlSqlError::NotFound("schema index".to_string()))
    }

    /// Names of all tables and views
    pub async fn table_names(&self) -> Result<Vec<String>> {
        Ok(self
            .schema()
            .await?
            .table_names()
            .into_iter()
            .map(String::from)
            .collect())
    }

    /// Definitions and sample rows for the named tables
    ///
    /// Names are matched case-insensitively. Any unknown name fails the
    /// whole call so the caller sees every missing table at once.
    pub async fn table_info(&self, names: &[String]) -> Result<String> {
        let index = self.schema().await?;

        let missing: Vec<&str> = names
            .iter()
            .map(|n| n.as_str())
            .filter(|n| index.find_table(n).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(NlSqlError::NotFound(format!(
                "table_names {{{}}} not found in database",
                missing.join(", ")
            )));
        }

        let mut sections = Vec::with_capacity(names.len());
        for name in names {
            if let Some(table) = index.find_table(name) {
                let samples = self.sample_rows(&table.name, SAMPLE_ROWS).await?;
                sections.push(format!(
                    "{}\n/*\n{} rows from {} table:\n{}\n*/",
                    table.format_schema().trim_end(),
                    SAMPLE_ROWS,
                    table.name,
                    samples
                ));
            }
        }
        Ok(sections.join("\n\n"))
    }

    /// First `limit` rows of a table, rendered as text
    async fn sample_rows(&self, table: &str, limit: usize) -> Result<String> {
        let sql = format!(
            "SELECT * FROM {} LIMIT {}",
            self.backend.quote_identifier(table),
            limit
        );
        self.run(&sql).await
    }

    /// Execute a statement and render whatever rows it returns
    pub async fn run(&self, sql: &str) -> Result<String> {
        tracing::debug!(sql, "executing statement");
        match &self.pool {
            DatabasePool::Sqlite(pool) => {
                let rows = sqlx::query(sql)
                    .fetch_all(pool)
                    .await
                    .map_err(|e| NlSqlError::db_query(sql, e))?;
                Ok(render::render_sqlite_rows(&rows))
            }
            DatabasePool::MySql(pool) => {
                let rows = sqlx::query(sql)
                    .fetch_all(pool)
                    .await
                    .map_err(|e| NlSqlError::db_query(sql, e))?;
                Ok(render::render_mysql_rows(&rows))
            }
        }
    }

    /// Get the database backend type
    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    /// Close the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn chinook_fixture() -> DatabaseManager {
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
        DatabaseManager::from_pool(DatabasePool::Sqlite(pool))
    }

    #[tokio::test]
    async fn test_table_names() {
        let db = chinook_fixture().await;
        assert_eq!(db.table_names().await.unwrap(), vec!["Artist", "Genre"]);
        assert_eq!(db.backend(), DatabaseBackend::SQLite);
    }

    #[tokio::test]
    async fn test_table_info_has_schema_and_three_samples() {
        let db = chinook_fixture().await;
        let info = db.table_info(&["artist".to_string()]).await.unwrap();
        assert!(info.contains("Table: Artist"));
        assert!(info.contains("3 rows from Artist table:"));
        assert!(info.contains("AC/DC"));
        assert!(info.contains("Aerosmith"));
        assert!(!info.contains("Alanis Morissette"));
    }

    #[tokio::test]
    async fn test_table_info_reports_missing_tables() {
        let db = chinook_fixture().await;
        let err = db
            .table_info(&["Artist".to_string(), "Track".to_string()])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not found: table_names {Track} not found in database"
        );
    }

    #[tokio::test]
    async fn test_run_renders_rows_and_errors() {
        let db = chinook_fixture().await;
        let out = db.run("SELECT COUNT(*) AS total FROM Artist").await.unwrap();
        assert!(out.contains("total"));
        assert!(out.contains('4'));

        let empty = db.run("SELECT * FROM Genre").await.unwrap();
        assert_eq!(empty, render::NO_ROWS);

        assert!(db.run("SELEC nonsense").await.is_err());
    }

    #[tokio::test]
    async fn test_schema_is_cached_for_the_session() {
        let db = chinook_fixture().await;
        assert_eq!(db.table_names().await.unwrap().len(), 2);

        db.run("CREATE TABLE Track (TrackId INTEGER PRIMARY KEY)").await.unwrap();
        assert_eq!(db.table_names().await.unwrap(), vec!["Artist", "Genre"]);
    }
}
