//! Schema data structures
//!
//! This module defines the core data structures for representing
//! database schema information, including tables, columns, and their metadata.

use std::collections::BTreeMap;
use std::fmt;

/// Represents a column in a database table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared type as reported by the database (e.g. "varchar(120)")
    pub data_type: String,
    /// Whether the column is nullable
    pub nullable: bool,
    /// Default value (if any)
    pub default_value: Option<String>,
    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
    /// Referenced column (if this is a foreign key)
    pub references: Option<ForeignKeyReference>,
}

impl Column {
    /// Create a nullable column with no constraints
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default_value: None,
            is_primary_key: false,
            references: None,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)?;

        if self.is_primary_key {
            write!(f, " PRIMARY KEY")?;
        }
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        if let Some(ref default) = self.default_value {
            write!(f, " DEFAULT {}", default)?;
        }
        if let Some(ref fk) = self.references {
            write!(f, " REFERENCES {}({})", fk.table, fk.column)?;
        }

        Ok(())
    }
}

/// Foreign key reference information
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyReference {
    /// Referenced table name
    pub table: String,
    /// Referenced column name
    pub column: String,
}

/// Represents a database table or view
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table or view name
    pub name: String,
    /// Whether this is a view (vs a table)
    pub is_view: bool,
    /// Table columns, in declaration order
    pub columns: Vec<Column>,
    /// Primary key columns (ordered)
    pub primary_keys: Vec<String>,
}

impl Table {
    /// Create a new table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_view: false,
            columns: Vec::new(),
            primary_keys: Vec::new(),
        }
    }

    /// Create a new view
    pub fn new_view(name: impl Into<String>) -> Self {
        let mut table = Self::new(name);
        table.is_view = true;
        table
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: Column) {
        if column.is_primary_key {
            self.primary_keys.push(column.name.clone());
        }
        self.columns.push(column);
    }

    /// Mutable access to a column by name
    pub fn get_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Format table schema for display
    pub fn format_schema(&self) -> String {
        let prefix = if self.is_view { "View" } else { "Table" };
        let mut result = format!("{}: {}\n", prefix, self.name);

        if !self.primary_keys.is_empty() {
            result.push_str(&format!("  Primary Key: {}\n", self.primary_keys.join(", ")));
        }

        let foreign_keys: Vec<String> = self
            .columns
            .iter()
            .filter_map(|c| {
                c.references
                    .as_ref()
                    .map(|fk| format!("    {} -> {}({})\n", c.name, fk.table, fk.column))
            })
            .collect();
        if !foreign_keys.is_empty() {
            result.push_str("  Foreign Keys:\n");
            for line in foreign_keys {
                result.push_str(&line);
            }
        }

        result.push_str("  Columns:\n");
        for column in &self.columns {
            result.push_str(&format!("    {}\n", column));
        }

        result
    }
}

/// Complete database schema index
#[derive(Debug, Clone)]
pub struct SchemaIndex {
    /// Database name (if available)
    pub database_name: Option<String>,
    /// Tables and views indexed by name
    pub tables: BTreeMap<String, Table>,
    /// Index timestamp
    pub indexed_at: chrono::DateTime<chrono::Utc>,
}

impl SchemaIndex {
    /// Create a new schema index
    pub fn new() -> Self {
        Self {
            database_name: None,
            tables: BTreeMap::new(),
            indexed_at: chrono::Utc::now(),
        }
    }

    /// Add a table to the index
    pub fn add_table(&mut self, table: Table) {
        let name = table.name.clone();
        self.tables.insert(name, table);
    }

    /// Resolve a name case-insensitively to the table as stored
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        let name = name.trim();
        self.tables
            .get(name)
            .or_else(|| self.tables.values().find(|t| t.name.eq_ignore_ascii_case(name)))
    }

    /// Get all table names, sorted
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for SchemaIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album_table() -> Table {
        let mut table = Table::new("Album");
        table.add_column(Column {
            nullable: false,
            is_primary_key: true,
            ..Column::new("AlbumId", "INTEGER")
        });
        table.add_column(Column {
            nullable: false,
            ..Column::new("Title", "NVARCHAR(160)")
        });
        table.add_column(Column {
            nullable: false,
            references: Some(ForeignKeyReference {
                table: "Artist".to_string(),
                column: "ArtistId".to_string(),
            }),
            ..Column::new("ArtistId", "INTEGER")
        });
        table
    }

    #[test]
    fn test_table_creation() {
        let table = Table::new("users");
        assert_eq!(table.name, "users");
        assert!(!table.is_view);
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_primary_keys_follow_columns() {
        let table = album_table();
        assert_eq!(table.primary_keys, vec!["AlbumId".to_string()]);
        assert_eq!(table.columns[1].name, "Title");
    }

    #[test]
    fn test_format_schema() {
        let formatted = album_table().format_schema();
        assert!(formatted.starts_with("Table: Album\n"));
        assert!(formatted.contains("Primary Key: AlbumId"));
        assert!(formatted.contains("ArtistId -> Artist(ArtistId)"));
        assert!(formatted.contains("AlbumId: INTEGER PRIMARY KEY NOT NULL"));
        assert!(formatted.contains("ArtistId: INTEGER NOT NULL REFERENCES Artist(ArtistId)"));
    }

    #[test]
    fn test_find_table_ignores_case() {
        let mut index = SchemaIndex::new();
        index.add_table(album_table());
        index.add_table(Table::new_view("top_albums"));

        assert_eq!(index.find_table("album").map(|t| t.name.as_str()), Some("Album"));
        assert_eq!(index.find_table(" Album ").map(|t| t.name.as_str()), Some("Album"));
        assert!(index.find_table("Track").is_none());
        assert_eq!(index.table_names(), vec!["Album", "top_albums"]);
    }
}
