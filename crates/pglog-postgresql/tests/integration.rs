//! Integration tests against a live PostgreSQL server.
//!
//! Run with `POSTGRESQL_CONNECTION_STRING` pointing at a scratch database:
//!
//! ```bash
//! POSTGRESQL_CONNECTION_STRING="host=localhost user=postgres password=postgres dbname=postgres" \
//!   cargo test -p pglog-postgresql -- --ignored
//! ```

use anyhow::{Context, Result};
use log_core::{FieldDescriptor, LogRow, LogType, LogValue, TypedValue};
use pglog_postgresql::{
    connect::connect, ConnectionConfig, PostgreSQLLogReader, PostgreSQLLogWriter, WriterOptions,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize logging for tests
fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn connection_config() -> Result<ConnectionConfig> {
    let conninfo = std::env::var("POSTGRESQL_CONNECTION_STRING")
        .context("POSTGRESQL_CONNECTION_STRING must be set")?;
    Ok(ConnectionConfig::new(conninfo))
}

fn unique_table(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

async fn drop_table(config: &ConnectionConfig, table: &str) -> Result<()> {
    let client = connect(config).await?;
    client
        .batch_execute(&format!("DROP TABLE IF EXISTS \"{table}\""))
        .await?;
    Ok(())
}

fn strings(items: &[Option<&str>]) -> Vec<LogValue> {
    items
        .iter()
        .map(|item| match item {
            Some(s) => LogValue::String(s.to_string()),
            None => LogValue::Null,
        })
        .collect()
}

fn conn_fields() -> Arc<[FieldDescriptor]> {
    vec![
        FieldDescriptor::new("ts", LogType::Time),
        FieldDescriptor::new("id.orig_h", LogType::Addr),
        FieldDescriptor::new("id.orig_p", LogType::Port),
        FieldDescriptor::new("local_orig", LogType::Bool),
        FieldDescriptor::new("orig_bytes", LogType::Count),
        FieldDescriptor::new("proto", LogType::Enum),
        FieldDescriptor::new("tunnel_parents", LogType::set(LogType::String)),
        FieldDescriptor::new("resp_nets", LogType::set(LogType::Subnet)),
        FieldDescriptor::new("rtts", LogType::vector(LogType::Interval)),
    ]
    .into()
}

fn conn_rows() -> Vec<LogRow> {
    vec![
        vec![
            TypedValue::time(1_300_475_167.096_535),
            TypedValue::addr("141.142.220.202".parse().unwrap()),
            TypedValue::port(5353),
            TypedValue::bool(true),
            TypedValue::count(73),
            TypedValue::enum_value("udp"),
            TypedValue::set(
                LogType::String,
                strings(&[Some("x"), None, Some("NULL"), Some(r#"quote " and \ slash"#)]),
            ),
            TypedValue::set(
                LogType::Subnet,
                vec![LogValue::Subnet("10.0.0.0/8".parse().unwrap())],
            ),
            TypedValue::vector(LogType::Interval, vec![LogValue::Double(0.25), LogValue::Null]),
        ],
        vec![
            TypedValue::time(1_300_475_168.5),
            TypedValue::addr("fe80::217:f2ff:fed7:cf65".parse().unwrap()),
            TypedValue::null(LogType::Port),
            TypedValue::bool(false),
            TypedValue::null(LogType::Count),
            TypedValue::enum_value("tcp"),
            TypedValue::set(LogType::String, vec![]),
            TypedValue::null(LogType::set(LogType::Subnet)),
            TypedValue::vector(LogType::Interval, vec![]),
        ],
    ]
}

#[tokio::test]
#[ignore = "requires POSTGRESQL_CONNECTION_STRING"]
async fn test_write_then_read_round_trip() -> Result<()> {
    init_logging();
    let config = connection_config()?;
    let table = unique_table("conn");
    let fields = conn_fields();

    let writer =
        PostgreSQLLogWriter::init(&config, WriterOptions::default(), &table, fields.clone())
            .await?;
    let rows = conn_rows();
    assert_eq!(writer.write_batch(&rows).await?, rows.len());
    writer.flush()?;
    writer.finish()?;

    let reader = PostgreSQLLogReader::init(
        &config,
        format!("SELECT * FROM \"{table}\" ORDER BY id"),
        fields,
    )
    .await?;
    let read = reader.update().await?;
    info!("Read {} rows back from {}", read.len(), table);
    assert_eq!(read, rows);

    drop_table(&config, &table).await
}

#[tokio::test]
#[ignore = "requires POSTGRESQL_CONNECTION_STRING"]
async fn test_init_is_idempotent_and_applies_sql_addition() -> Result<()> {
    init_logging();
    let config = connection_config()?;
    let table = unique_table("dns");
    let fields: Arc<[FieldDescriptor]> = vec![FieldDescriptor::new("query", LogType::String)].into();
    let options = WriterOptions {
        sql_addition: "RETURNING id".to_string(),
        ..Default::default()
    };

    let first = PostgreSQLLogWriter::init(&config, options.clone(), &table, fields.clone()).await?;
    first.write(&[TypedValue::string("example.com")]).await?;

    // a second writer for the same stream reuses the existing table
    let second = PostgreSQLLogWriter::init(&config, options, &table, fields.clone()).await?;
    second.write(&[TypedValue::string("example.org")]).await?;

    let reader =
        PostgreSQLLogReader::init(&config, format!("SELECT query FROM \"{table}\""), fields)
            .await?;
    assert_eq!(reader.update().await?.len(), 2);

    drop_table(&config, &table).await
}

#[tokio::test]
#[ignore = "requires POSTGRESQL_CONNECTION_STRING"]
async fn test_continue_on_errors() -> Result<()> {
    init_logging();
    let config = connection_config()?;
    let table = unique_table("notice");
    let fields: Arc<[FieldDescriptor]> = vec![FieldDescriptor::new("n", LogType::Count)].into();

    // count is stored as bigint; u64::MAX does not fit and the server rejects it
    let rows = vec![
        vec![TypedValue::count(1)],
        vec![TypedValue::count(u64::MAX)],
        vec![TypedValue::count(3)],
    ];

    let strict =
        PostgreSQLLogWriter::init(&config, WriterOptions::default(), &table, fields.clone())
            .await?;
    assert!(strict.write_batch(&rows).await.is_err());

    let lenient = PostgreSQLLogWriter::init(
        &config,
        WriterOptions {
            continue_on_errors: true,
            ..Default::default()
        },
        &table,
        fields,
    )
    .await?;
    assert!(!lenient.write(&rows[1]).await?);
    assert_eq!(lenient.write_batch(&rows).await?, 2);

    drop_table(&config, &table).await
}

#[tokio::test]
#[ignore = "requires POSTGRESQL_CONNECTION_STRING"]
async fn test_reader_drops_malformed_rows() -> Result<()> {
    init_logging();
    let config = connection_config()?;
    let fields: Arc<[FieldDescriptor]> = vec![
        FieldDescriptor::new("name", LogType::String),
        FieldDescriptor::new("n", LogType::Count),
    ]
    .into();

    let query = "SELECT * FROM (VALUES ('a', '1'), ('b', 'x'), ('c', NULL)) AS t(name, n)";
    let reader = PostgreSQLLogReader::init(&config, query, fields).await?;
    let rows = reader.update().await?;

    assert_eq!(
        rows,
        vec![
            vec![TypedValue::string("a"), TypedValue::count(1)],
            vec![TypedValue::string("c"), TypedValue::null(LogType::Count)],
        ]
    );
    Ok(())
}

#[tokio::test]
#[ignore = "requires POSTGRESQL_CONNECTION_STRING"]
async fn test_reader_missing_column_fails_update() -> Result<()> {
    init_logging();
    let config = connection_config()?;
    let fields: Arc<[FieldDescriptor]> =
        vec![FieldDescriptor::new("missing", LogType::String)].into();

    let reader = PostgreSQLLogReader::init(&config, "SELECT 1 AS present", fields).await?;
    assert!(reader.update().await.is_err());
    Ok(())
}
