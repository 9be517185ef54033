//! # Prompt Logic Tests
//!
//! Validates the prompt template, the schema-context rendering, and the
//! SQL extraction helpers. The template's section headers and marker
//! tokens are a fine-tuning contract, so these tests assert exact text
//! and ordering, not just presence.

use sqlrag::prompts::{
    build_prompt, extract_sql, render_table_context, ANSWER_HEADER, DATABASE_SCHEMA_HEADER,
    EOS_MARKER, SQL_MARKER, TASK_HEADER,
};
use sqlrag::{PredictError, TableContext};

fn farm_context() -> Vec<TableContext> {
    vec![TableContext {
        table_name: "farm".to_string(),
        create_table_statement: "CREATE TABLE farm (...)".to_string(),
        table_description: "desc1".to_string(),
    }]
}

// --- Tests for `render_table_context` ---

/// Verifies that a retrieved row is rendered as three labeled lines in
/// column order.
#[test]
fn test_render_table_context_labels_and_order() {
    let rendered = render_table_context(&farm_context());

    let name_pos = rendered
        .find("TableName: farm")
        .expect("missing TableName line");
    let ddl_pos = rendered
        .find("CreateTableStatement: CREATE TABLE farm (...)")
        .expect("missing CreateTableStatement line");
    let desc_pos = rendered
        .find("TableDescription: desc1")
        .expect("missing TableDescription line");

    assert!(name_pos < ddl_pos, "TableName must precede the DDL");
    assert!(ddl_pos < desc_pos, "DDL must precede the description");
}

/// Verifies that multiple rows keep the order the index returned them in.
#[test]
fn test_render_table_context_preserves_index_ranking() {
    let tables = vec![
        TableContext {
            table_name: "city".to_string(),
            create_table_statement: "CREATE TABLE city (...)".to_string(),
            table_description: "cities".to_string(),
        },
        TableContext {
            table_name: "farm".to_string(),
            create_table_statement: "CREATE TABLE farm (...)".to_string(),
            table_description: "farms".to_string(),
        },
    ];
    let rendered = render_table_context(&tables);

    let city_pos = rendered.find("TableName: city").unwrap();
    let farm_pos = rendered.find("TableName: farm").unwrap();
    assert!(city_pos < farm_pos, "rows must not be re-sorted");
}

/// An empty retrieval result renders an empty context block.
#[test]
fn test_render_table_context_empty() {
    assert_eq!(render_table_context(&[]), "");
}

// --- Tests for `build_prompt` ---

/// Verifies the three section headers appear in fixed order and the
/// question text appears verbatim inside both `[QUESTION]` markers.
#[test]
fn test_build_prompt_sections_and_markers() {
    let question = "Return the maximum and minimum number of cows across all farms.";
    let schema = render_table_context(&farm_context());
    let prompt = build_prompt(question, &schema);

    let task_pos = prompt.find(TASK_HEADER).expect("missing task header");
    let schema_pos = prompt
        .find(DATABASE_SCHEMA_HEADER)
        .expect("missing schema header");
    let answer_pos = prompt.find(ANSWER_HEADER).expect("missing answer header");
    assert!(task_pos < schema_pos && schema_pos < answer_pos);

    let wrapped = format!("[QUESTION]{question}[/QUESTION]");
    assert_eq!(
        prompt.matches(&wrapped).count(),
        2,
        "question must appear verbatim in both the task and answer sections"
    );

    assert!(
        prompt.contains("Generate a SQL query to answer [QUESTION]"),
        "task section text must match the fine-tuning template"
    );
    assert!(
        prompt.contains("Given the database schema, here is the SQL query that [QUESTION]"),
        "answer section text must match the fine-tuning template"
    );
}

/// The prompt must end with a line containing exactly `[SQL]` so the model
/// continues from the marker.
#[test]
fn test_build_prompt_ends_with_sql_marker_line() {
    let prompt = build_prompt("How many farms are there?", "TableName: farm\n");
    let last_line = prompt
        .lines()
        .last()
        .expect("prompt must not be empty");
    assert_eq!(last_line, SQL_MARKER);
}

/// The schema context appears verbatim between the schema and answer
/// headers.
#[test]
fn test_build_prompt_embeds_schema_verbatim() {
    let schema = "TableName: farm\nCreateTableStatement: CREATE TABLE farm (...)\n";
    let prompt = build_prompt("q", schema);

    let schema_pos = prompt.find(schema).expect("schema block missing");
    let header_pos = prompt.find(DATABASE_SCHEMA_HEADER).unwrap();
    let answer_pos = prompt.find(ANSWER_HEADER).unwrap();
    assert!(header_pos < schema_pos && schema_pos < answer_pos);
}

// --- Tests for `extract_sql` ---

/// The SQL statement between the markers is returned trimmed.
#[test]
fn test_extract_sql_between_markers() {
    let completion = "...[SQL]\nSELECT 1;</s>";
    assert_eq!(extract_sql(completion).unwrap(), "SELECT 1;");
}

/// Whitespace around the statement is stripped.
#[test]
fn test_extract_sql_trims_whitespace() {
    let completion = "[SQL]\n  SELECT MAX(Cows), MIN(Cows) FROM farm;\n\n</s> trailing";
    assert_eq!(
        extract_sql(completion).unwrap(),
        "SELECT MAX(Cows), MIN(Cows) FROM farm;"
    );
}

/// A completion without the end-of-sequence marker fails explicitly
/// instead of returning a truncated slice.
#[test]
fn test_extract_sql_missing_eos_marker() {
    let completion = "[SQL]\nSELECT 1;";
    match extract_sql(completion) {
        Err(PredictError::MarkerNotFound(marker)) => assert_eq!(marker, EOS_MARKER),
        other => panic!("expected MarkerNotFound, got {other:?}"),
    }
}

/// A completion without the SQL marker fails explicitly.
#[test]
fn test_extract_sql_missing_sql_marker() {
    let completion = "SELECT 1;</s>";
    match extract_sql(completion) {
        Err(PredictError::MarkerNotFound(marker)) => assert_eq!(marker, SQL_MARKER),
        other => panic!("expected MarkerNotFound, got {other:?}"),
    }
}

/// An end-of-sequence marker before the SQL marker does not terminate the
/// statement; only a marker after `[SQL]` counts.
#[test]
fn test_extract_sql_eos_before_sql_marker_is_ignored() {
    let completion = "</s> noise [SQL]\nSELECT 2;</s>";
    assert_eq!(extract_sql(completion).unwrap(), "SELECT 2;");
}
