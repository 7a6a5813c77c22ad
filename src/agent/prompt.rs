//! Prompt text for the SQL agent and its query checker.

/// Default row limit the agent is told to apply
pub const DEFAULT_TOP_K: usize = 10;

/// System prompt for the tool-calling loop
pub fn system_prompt(dialect: &str, top_k: usize) -> String {
    format!(
        "You are an agent that answers questions by querying a {dialect} database.\n\
         \n\
         Work step by step with the tools you are given:\n\
         1. Call sql_db_list_tables to see which tables exist. Do not skip this step.\n\
         2. Call sql_db_schema for the tables that look relevant before writing any SQL.\n\
         3. Write one syntactically correct {dialect} query and pass it to \
         sql_db_query_checker before running it.\n\
         4. Run the checked query with sql_db_query. If it fails, read the error, fix the \
         query, and try again.\n\
         \n\
         Unless the user asks for a specific number of results, limit every query to at \
         most {top_k} rows. Order results by a relevant column so the most interesting rows \
         come first. Select only the columns needed to answer the question, never every \
         column of a table.\n\
         \n\
         Never issue INSERT, UPDATE, DELETE, DROP, ALTER or any other statement that \
         changes the database.\n\
         \n\
         If the question has nothing to do with the database, say that you do not know.\n\
         When you have enough information, reply with the final answer in plain language \
         and do not call any more tools."
    )
}

/// Prompt asking the model to review a query before it runs
pub fn query_checker_prompt(dialect: &str, query: &str) -> String {
    format!(
        "{query}\n\n\
         Review the {dialect} query above for these common mistakes:\n\
         - NOT IN against a subquery that can return NULL\n\
         - UNION where UNION ALL was intended\n\
         - BETWEEN used for a range that should exclude an endpoint\n\
         - comparing values of mismatched types\n\
         - identifiers that need quoting\n\
         - functions called with the wrong number of arguments\n\
         - missing or wrong casts\n\
         - joining on the wrong columns\n\
         \n\
         If you find a mistake, rewrite the query. Otherwise repeat it unchanged.\n\
         Reply with the SQL query only, without explanation or markdown."
    )
}

/// Remove a markdown code fence the model may wrap SQL in
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    // Drop the language tag on the opening fence line, e.g. ```sql
    let body = match body.split_once('\n') {
        Some((tag, rest)) if !tag.trim().contains(' ') => rest,
        _ => body,
    };
    body.trim().to_string()
}
