//! nlsql library
//!
//! Answers natural-language questions about a SQLite or MySQL database by
//! letting an OpenAI-compatible chat model explore the schema and run SQL.
//! The binary in src/main.rs wires these modules into an interactive prompt.

pub mod agent;
pub mod cli;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod llm;
