//! Log stream writer: one table per stream, one INSERT per row.

use crate::config::{ConnectionConfig, WriterOptions};
use crate::connect::connect;
use crate::error::Result;
use crate::params::text_params;
use log_core::{FieldDescriptor, LogRow, TypedValue};
use postgresql_log_types::{encode_row, PostgreSQLDdl, PostgreSQLQuoter, StreamStatements};
use std::sync::Arc;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Statement};
use tracing::{debug, info, warn};

/// Writes rows of one log stream into a PostgreSQL table.
pub struct PostgreSQLLogWriter {
    client: Client,
    fields: Arc<[FieldDescriptor]>,
    statements: StreamStatements,
    insert: Statement,
    options: WriterOptions,
}

impl PostgreSQLLogWriter {
    /// Connect, create the stream's table if needed and prepare the INSERT.
    ///
    /// `path` is the stream path and becomes the table name.
    pub async fn init(
        config: &ConnectionConfig,
        options: WriterOptions,
        path: &str,
        fields: Arc<[FieldDescriptor]>,
    ) -> Result<Self> {
        let statements = StreamStatements::build(
            path,
            &fields,
            &PostgreSQLDdl::with_bytea(options.bytea_instead_of_text),
            &PostgreSQLQuoter,
            &options.sql_addition,
        )?;

        let client = connect(config).await?;

        debug!("Create table SQL: {}", statements.create_table);
        client.batch_execute(&statements.create_table).await?;
        info!("Ensured table {} exists", statements.table);

        debug!("Insert SQL: {}", statements.insert);
        let insert = client.prepare(&statements.insert).await?;

        Ok(Self {
            client,
            fields,
            statements,
            insert,
            options,
        })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn statements(&self) -> &StreamStatements {
        &self.statements
    }

    /// Write one row.
    ///
    /// Returns `false` when the row failed and was skipped because
    /// `continue_on_errors` is set.
    pub async fn write(&self, row: &[TypedValue]) -> Result<bool> {
        match self.insert_row(row).await {
            Ok(()) => Ok(true),
            Err(e) if self.options.continue_on_errors => {
                warn!("Command failed, continuing: {}", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Write rows in order, returning how many were stored.
    pub async fn write_batch(&self, rows: &[LogRow]) -> Result<usize> {
        let mut written = 0;
        for row in rows {
            if self.write(row).await? {
                written += 1;
            }
        }
        debug!("Wrote {} of {} rows to {}", written, rows.len(), self.statements.table);
        Ok(written)
    }

    async fn insert_row(&self, row: &[TypedValue]) -> Result<()> {
        let encoded = encode_row(&self.fields, row)?;
        let params = text_params(&encoded);
        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        self.client.execute(&self.insert, &refs).await?;
        Ok(())
    }

    /// Every write is sent immediately; nothing is buffered.
    pub fn flush(&self) -> Result<()> {
        Ok(())
    }

    pub fn finish(&self) -> Result<()> {
        Ok(())
    }

    /// Rows go to the same table across rotations.
    pub fn rotate(&self) -> Result<()> {
        Ok(())
    }

    pub fn heartbeat(&self) -> Result<()> {
        Ok(())
    }

    pub fn set_buf(&self, _enabled: bool) -> Result<()> {
        Ok(())
    }
}
