//! Schema Indexer
//!
//! This module implements schema indexing logic for each database backend.
//! Each function queries the system catalogs and builds a complete
//! SchemaIndex of tables, views, columns, and foreign keys.

use crate::database::schema::{Column, ForeignKeyReference, SchemaIndex, Table};
use crate::error::{NlSqlError, Result};
use sqlx::{mysql::MySqlPool, sqlite::SqlitePool, Row};

/// Index SQLite database schema
pub async fn index_sqlite(pool: &SqlitePool) -> Result<SchemaIndex> {
    let mut schema_index = SchemaIndex::new();
    schema_index.database_name = Some("main".to_string());

    let tables_query = r#"
        SELECT name, type
        FROM sqlite_master
        WHERE type IN ('table', 'view')
            AND name NOT LIKE 'sqlite_%'
        ORDER BY name
    "#;

    let tables_rows = sqlx::query(tables_query)
        .fetch_all(pool)
        .await
        .map_err(|e| NlSqlError::db_query(tables_query, e))?;

    for row in tables_rows {
        let table_name: String = row.try_get("name")?;
        let table_type: String = row.try_get("type")?;

        let mut table = if table_type == "view" {
            Table::new_view(&table_name)
        } else {
            Table::new(&table_name)
        };

        let columns_query = r#"
            SELECT name, type, "notnull", dflt_value, pk
            FROM pragma_table_info(?)
            ORDER BY cid
        "#;

        let columns_rows = sqlx::query(columns_query)
            .bind(&table_name)
            .fetch_all(pool)
            .await
            .map_err(|e| NlSqlError::db_query(columns_query, e))?;

        // pk is the 1-based position within the primary key, 0 otherwise
        let mut pk_positions: Vec<(i64, String)> = Vec::new();
        for col_row in columns_rows {
            let column_name: String = col_row.try_get("name")?;
            let data_type: String = col_row.try_get("type")?;
            let not_null: i64 = col_row.try_get("notnull")?;
            let default_value: Option<String> = col_row.try_get("dflt_value")?;
            let pk: i64 = col_row.try_get("pk")?;

            if pk > 0 {
                pk_positions.push((pk, column_name.clone()));
            }

            table.columns.push(Column {
                name: column_name,
                data_type: if data_type.is_empty() {
                    "ANY".to_string()
                } else {
                    data_type
                },
                nullable: not_null == 0 && pk == 0,
                default_value,
                is_primary_key: pk > 0,
                references: None,
            });
        }
        pk_positions.sort();
        table.primary_keys = pk_positions.into_iter().map(|(_, name)| name).collect();

        let fk_query = r#"
            SELECT "from", "table", "to"
            FROM pragma_foreign_key_list(?)
            ORDER BY id, seq
        "#;

        let fk_rows = sqlx::query(fk_query)
            .bind(&table_name)
            .fetch_all(pool)
            .await
            .map_err(|e| NlSqlError::db_query(fk_query, e))?;

        for fk_row in fk_rows {
            let from: String = fk_row.try_get("from")?;
            let target_table: String = fk_row.try_get("table")?;
            // A NULL target means the referenced table's primary key.
            let target_column: Option<String> = fk_row.try_get("to")?;

            if let Some(col) = table.get_column_mut(&from) {
                col.references = Some(ForeignKeyReference {
                    table: target_table,
                    column: target_column.unwrap_or_else(|| "<primary key>".to_string()),
                });
            }
        }

        schema_index.add_table(table);
    }

    Ok(schema_index)
}

/// Index MySQL database schema
///
/// Catalog columns are cast to CHAR because some server versions report
/// them as binary strings.
pub async fn index_mysql(pool: &MySqlPool) -> Result<SchemaIndex> {
    let mut schema_index = SchemaIndex::new();

    let db_row: Option<(Option<String>,)> = sqlx::query_as("SELECT CAST(DATABASE() AS CHAR)")
        .fetch_optional(pool)
        .await?;
    schema_index.database_name = db_row.and_then(|(name,)| name);

    let tables_query = r#"
        SELECT
            CAST(TABLE_NAME AS CHAR) AS table_name,
            CAST(TABLE_TYPE AS CHAR) AS table_type
        FROM information_schema.TABLES
        WHERE TABLE_SCHEMA = DATABASE()
            AND TABLE_TYPE IN ('BASE TABLE', 'VIEW')
        ORDER BY TABLE_NAME
    "#;

    let tables_rows = sqlx::query(tables_query)
        .fetch_all(pool)
        .await
        .map_err(|e| NlSqlError::db_query(tables_query, e))?;

    for row in tables_rows {
        let table_name: String = row.try_get("table_name")?;
        let table_type: String = row.try_get("table_type")?;

        let mut table = if table_type == "VIEW" {
            Table::new_view(&table_name)
        } else {
            Table::new(&table_name)
        };

        let columns_query = r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR) AS column_name,
                CAST(COLUMN_TYPE AS CHAR) AS column_type,
                CAST(IS_NULLABLE AS CHAR) AS is_nullable,
                CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
                CAST(COLUMN_KEY AS CHAR) AS column_key
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE()
                AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        let columns_rows = sqlx::query(columns_query)
            .bind(&table_name)
            .fetch_all(pool)
            .await
            .map_err(|e| NlSqlError::db_query(columns_query, e))?;

        for col_row in columns_rows {
            let column_name: String = col_row.try_get("column_name")?;
            let column_type: String = col_row.try_get("column_type")?;
            let is_nullable: String = col_row.try_get("is_nullable")?;
            let default_value: Option<String> = col_row.try_get("column_default")?;
            let column_key: Option<String> = col_row.try_get("column_key")?;

            table.add_column(Column {
                name: column_name,
                data_type: column_type,
                nullable: is_nullable == "YES",
                default_value,
                is_primary_key: column_key.as_deref() == Some("PRI"),
                references: None,
            });
        }

        let fk_query = r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR) AS column_name,
                CAST(REFERENCED_TABLE_NAME AS CHAR) AS foreign_table_name,
                CAST(REFERENCED_COLUMN_NAME AS CHAR) AS foreign_column_name
            FROM information_schema.KEY_COLUMN_USAGE
            WHERE TABLE_SCHEMA = DATABASE()
                AND TABLE_NAME = ?
                AND REFERENCED_TABLE_NAME IS NOT NULL
            ORDER BY ORDINAL_POSITION
        "#;

        let fk_rows = sqlx::query(fk_query)
            .bind(&table_name)
            .fetch_all(pool)
            .await
            .map_err(|e| NlSqlError::db_query(fk_query, e))?;

        for fk_row in fk_rows {
            let column_name: String = fk_row.try_get("column_name")?;
            let foreign_table: String = fk_row.try_get("foreign_table_name")?;
            let foreign_column: String = fk_row.try_get("foreign_column_name")?;

            if let Some(col) = table.get_column_mut(&column_name) {
                col.references = Some(ForeignKeyReference {
                    table: foreign_table,
                    column: foreign_column,
                });
            }
        }

        schema_index.add_table(table);
    }

    Ok(schema_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    fn column<'a>(table: &'a Table, name: &str) -> Option<&'a Column> {
        table.columns.iter().find(|c| c.name == name)
    }

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_sqlite() {
        let pool = memory_pool().await;
        sqlx::raw_sql(
            r#"
            CREATE TABLE Artist (ArtistId INTEGER PRIMARY KEY, Name NVARCHAR(120));
            CREATE TABLE Album (
                AlbumId INTEGER NOT NULL,
                Title NVARCHAR(160) NOT NULL DEFAULT 'untitled',
                ArtistId INTEGER NOT NULL REFERENCES Artist (ArtistId),
                PRIMARY KEY (AlbumId)
            );
            CREATE VIEW album_titles AS SELECT Title FROM Album;
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let index = index_sqlite(&pool).await.unwrap();
        assert_eq!(index.table_names(), vec!["Album", "Artist", "album_titles"]);
        assert!(index.find_table("album_titles").unwrap().is_view);

        let album = index.find_table("Album").unwrap();
        assert_eq!(album.primary_keys, vec!["AlbumId".to_string()]);
        let title = column(album, "Title").unwrap();
        assert_eq!(title.data_type, "NVARCHAR(160)");
        assert!(!title.nullable);
        assert_eq!(title.default_value.as_deref(), Some("'untitled'"));

        let artist_ref = column(album, "ArtistId").unwrap().references.clone().unwrap();
        assert_eq!(artist_ref.table, "Artist");
        assert_eq!(artist_ref.column, "ArtistId");

        let artist = index.find_table("Artist").unwrap();
        assert!(column(artist, "Name").unwrap().nullable);
    }

    #[tokio::test]
    async fn test_index_empty_sqlite() {
        let pool = memory_pool().await;
        let index = index_sqlite(&pool).await.unwrap();
        assert!(index.tables.is_empty());
    }
}
