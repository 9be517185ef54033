//! # Prompt Templates
//!
//! This module contains the prompt template the SQL-generation model was
//! fine-tuned against, along with the helpers that render retrieved table
//! context into it and slice the generated SQL back out of a completion.
//!
//! The section headers and the `[QUESTION]`/`[/QUESTION]`/`[SQL]` marker
//! tokens are part of the model's training contract and must be emitted
//! byte-for-byte.

use crate::{errors::PredictError, types::TableContext};

/// Header of the task section of the prompt.
pub const TASK_HEADER: &str = "### Task";

/// Header of the schema section of the prompt.
pub const DATABASE_SCHEMA_HEADER: &str = "### Database Schema";

/// Header of the answer section of the prompt.
pub const ANSWER_HEADER: &str = "### Answer";

/// Marker the model emits immediately before the generated SQL.
pub const SQL_MARKER: &str = "[SQL]";

/// End-of-sequence marker terminating the generated SQL.
pub const EOS_MARKER: &str = "</s>";

/// Renders retrieved table metadata rows into the schema context block.
///
/// Rows are rendered in the order the index returned them, three labeled
/// lines per table.
pub fn render_table_context(tables: &[TableContext]) -> String {
    let mut context = String::new();
    for table in tables {
        context.push_str(&format!(
            "TableName: {}\nCreateTableStatement: {}\nTableDescription: {}\n",
            table.table_name, table.create_table_statement, table.table_description
        ));
    }
    context
}

/// Builds the full generation prompt from a question and its schema context.
pub fn build_prompt(question: &str, schema_context: &str) -> String {
    format!(
        "{TASK_HEADER}\n\
         Generate a SQL query to answer [QUESTION]{question}[/QUESTION]\n\
         {DATABASE_SCHEMA_HEADER}\n\
         {schema_context}\n\
         {ANSWER_HEADER}\n\
         Given the database schema, here is the SQL query that [QUESTION]{question}[/QUESTION]\n\
         {SQL_MARKER}\n"
    )
}

/// Extracts the generated SQL statement from a raw completion.
///
/// The statement is the text between `[SQL]\n` and the `</s>` end-of-sequence
/// marker, with surrounding whitespace trimmed. Both markers are required; a
/// completion missing either one fails with [`PredictError::MarkerNotFound`]
/// rather than yielding a truncated slice.
pub fn extract_sql(completion: &str) -> Result<String, PredictError> {
    let sql_marker = format!("{SQL_MARKER}\n");
    let start = completion
        .find(&sql_marker)
        .map(|pos| pos + sql_marker.len())
        .ok_or(PredictError::MarkerNotFound(SQL_MARKER))?;
    let end = completion[start..]
        .find(EOS_MARKER)
        .map(|pos| start + pos)
        .ok_or(PredictError::MarkerNotFound(EOS_MARKER))?;
    Ok(completion[start..end].trim().to_string())
}
