//! Subcommand implementations.

use anyhow::{Context, Result};
use log_core::json::{parse_jsonl_line, row_to_json};
use log_core::{FieldDescriptor, LogRow, StreamSchema};
use pglog_postgresql::{
    ConnectionConfig, ConnectionDefaults, PostgreSQLConnectionArgs, PostgreSQLLogReader,
    PostgreSQLLogWriter, PostgreSQLWriterArgs, WriterOptions,
};
use postgresql_log_types::{PostgreSQLDdl, PostgreSQLQuoter, StreamStatements};
use std::io::{BufRead, Write};
use std::path::Path;

/// Load and validate a stream schema.
pub fn load_schema(path: &Path) -> Result<StreamSchema> {
    StreamSchema::from_file(path)
        .with_context(|| format!("Failed to load schema from {path:?}"))
}

/// The CREATE TABLE and INSERT statements for a stream, one per line.
pub fn render_ddl(
    schema: &StreamSchema,
    bytea_instead_of_text: bool,
    sql_addition: &str,
) -> Result<String> {
    let statements = StreamStatements::build(
        &schema.path,
        &schema.fields,
        &PostgreSQLDdl::with_bytea(bytea_instead_of_text),
        &PostgreSQLQuoter,
        sql_addition,
    )
    .with_context(|| format!("Failed to build statements for stream '{}'", schema.path))?;
    Ok(format!("{}\n{}\n", statements.create_table, statements.insert))
}

/// Parse JSON lines into rows; blank lines are skipped.
pub fn read_jsonl<R: BufRead>(fields: &[FieldDescriptor], input: R) -> Result<Vec<LogRow>> {
    let mut rows = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let row = parse_jsonl_line(fields, &line)
            .with_context(|| format!("Invalid record on line {}", index + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write rows as JSON lines.
pub fn write_jsonl<W: Write>(fields: &[FieldDescriptor], rows: &[LogRow], mut out: W) -> Result<()> {
    for row in rows {
        let json = row_to_json(fields, row);
        writeln!(out, "{json}").context("Failed to write output")?;
    }
    out.flush().context("Failed to write output")?;
    Ok(())
}

/// Insert every record of `input` into the stream's table.
pub async fn run_write<R: BufRead>(
    schema: &StreamSchema,
    input: R,
    args: &PostgreSQLWriterArgs,
) -> Result<usize> {
    let params = args.to_params();
    let config = ConnectionConfig::from_params(&params, &ConnectionDefaults::default())
        .context("Invalid connection options")?;
    let options = WriterOptions::from_params(&params);

    let fields = schema.shared_fields();
    let rows = read_jsonl(&fields, input)?;
    tracing::info!("Writing {} rows to stream '{}'", rows.len(), schema.path);

    let writer = PostgreSQLLogWriter::init(&config, options, &schema.path, fields)
        .await
        .with_context(|| format!("Failed to set up stream '{}'", schema.path))?;
    let written = writer
        .write_batch(&rows)
        .await
        .context("Failed to write rows")?;
    writer.finish()?;

    tracing::info!("Wrote {} of {} rows", written, rows.len());
    Ok(written)
}

/// Run `query` and return the decoded rows.
pub async fn run_read(
    schema: &StreamSchema,
    query: &str,
    args: &PostgreSQLConnectionArgs,
) -> Result<Vec<LogRow>> {
    let config = ConnectionConfig::from_params(&args.to_params(), &ConnectionDefaults::default())
        .context("Invalid connection options")?;

    let reader = PostgreSQLLogReader::init(&config, query, schema.shared_fields())
        .await
        .context("Failed to connect to PostgreSQL")?;
    let rows = reader.update().await.context("Query failed")?;

    tracing::info!("Read {} rows from stream '{}'", rows.len(), schema.path);
    Ok(rows)
}
