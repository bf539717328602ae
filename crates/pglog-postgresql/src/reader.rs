//! Log stream reader: runs a query and decodes every result row.

use crate::config::ConnectionConfig;
use crate::connect::connect;
use crate::error::Result;
use log_core::{FieldDescriptor, LogRow};
use postgresql_log_types::{decode_row, ColumnMapping, PostgreSQLQuoter};
use std::sync::Arc;
use tokio_postgres::{Client, SimpleQueryMessage, SimpleQueryRow};
use tracing::{debug, warn};

/// Reads a log stream from the result of a query.
///
/// Results are read with the simple query protocol, so every cell arrives
/// as text regardless of its column type.
pub struct PostgreSQLLogReader {
    client: Client,
    query: String,
    fields: Arc<[FieldDescriptor]>,
}

impl PostgreSQLLogReader {
    pub async fn init(
        config: &ConnectionConfig,
        query: impl Into<String>,
        fields: Arc<[FieldDescriptor]>,
    ) -> Result<Self> {
        let client = connect(config).await?;
        Ok(Self {
            client,
            query: query.into(),
            fields,
        })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Run the query and decode the result.
    ///
    /// A field without a result column fails the whole update. A row with a
    /// malformed cell is logged and dropped; the others are returned in
    /// result order.
    pub async fn update(&self) -> Result<Vec<LogRow>> {
        let messages = self.client.simple_query(&self.query).await?;

        let mut mapping: Option<ColumnMapping> = None;
        let mut rows = Vec::new();
        let mut dropped = 0usize;

        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(columns) => {
                    let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
                    mapping = Some(ColumnMapping::build(&self.fields, &names, &PostgreSQLQuoter)?);
                }
                SimpleQueryMessage::Row(row) => {
                    if mapping.is_none() {
                        mapping = Some(self.mapping_for(&row)?);
                    }
                    if let Some(mapping) = &mapping {
                        match self.decode(mapping, &row) {
                            Some(decoded) => rows.push(decoded),
                            None => dropped += 1,
                        }
                    }
                }
                _ => {}
            }
        }

        debug!("Query returned {} rows, {} dropped", rows.len(), dropped);
        Ok(rows)
    }

    fn mapping_for(&self, row: &SimpleQueryRow) -> Result<ColumnMapping> {
        let names: Vec<&str> = row.columns().iter().map(|c| c.name()).collect();
        Ok(ColumnMapping::build(&self.fields, &names, &PostgreSQLQuoter)?)
    }

    fn decode(&self, mapping: &ColumnMapping, row: &SimpleQueryRow) -> Option<LogRow> {
        let cells: Vec<Option<&str>> = (0..row.len()).map(|i| row.get(i)).collect();
        match decode_row(&self.fields, mapping, &cells) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Dropping row: {}", e);
                None
            }
        }
    }

    /// Results are not streamed, so there is nothing to poll.
    pub fn heartbeat(&self) -> Result<()> {
        Ok(())
    }
}
