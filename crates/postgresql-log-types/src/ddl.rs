//! PostgreSQL DDL and statement generation from log field types.
//!
//! This module maps `LogType` to PostgreSQL column types and builds the two
//! statements a stream needs: the `CREATE TABLE IF NOT EXISTS` run once at
//! setup, and the positional `INSERT` template reused for every row.

use crate::error::{CodecError, CodecResult};
use crate::ident::IdentifierQuoter;
use log_core::{FieldDescriptor, LogType};
use tracing::debug;

/// Name of the surrogate identity column added to every table.
pub const ID_COLUMN: &str = "id";

/// Column type used for string-like fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StringStorage {
    /// `text`
    #[default]
    Text,
    /// `bytea`, for streams carrying binary strings
    Bytea,
}

/// Trait for generating DDL type strings.
pub trait ToDdl {
    /// Convert a LogType to a DDL type string.
    fn to_ddl(&self, log_type: &LogType) -> CodecResult<String>;

    /// Generate a complete CREATE TABLE statement.
    fn to_create_table(
        &self,
        table_name: &str,
        fields: &[FieldDescriptor],
        quoter: &dyn IdentifierQuoter,
    ) -> CodecResult<String>;
}

/// PostgreSQL DDL generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgreSQLDdl {
    string_storage: StringStorage,
}

impl PostgreSQLDdl {
    pub fn new(string_storage: StringStorage) -> Self {
        Self { string_storage }
    }

    /// Map string-like fields to `bytea` instead of `text`.
    pub fn with_bytea(bytea_instead_of_text: bool) -> Self {
        Self::new(if bytea_instead_of_text {
            StringStorage::Bytea
        } else {
            StringStorage::Text
        })
    }

    /// Generate the INSERT template with one positional placeholder per field.
    ///
    /// `sql_addition` is appended verbatim before the terminating `;`, e.g.
    /// `ON CONFLICT DO NOTHING`.
    pub fn to_insert(
        &self,
        table_name: &str,
        fields: &[FieldDescriptor],
        sql_addition: &str,
        quoter: &dyn IdentifierQuoter,
    ) -> CodecResult<String> {
        let table = quoter.quote_identifier(table_name)?;
        let columns = fields
            .iter()
            .map(|f| quoter.quote_identifier(&f.name))
            .collect::<CodecResult<Vec<_>>>()?;
        let placeholders: Vec<String> = (0..fields.len()).map(placeholder).collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );
        let addition = sql_addition.trim();
        if !addition.is_empty() {
            sql.push(' ');
            sql.push_str(addition);
        }
        sql.push(';');
        Ok(sql)
    }
}

impl ToDdl for PostgreSQLDdl {
    fn to_ddl(&self, log_type: &LogType) -> CodecResult<String> {
        map_type(log_type, self.string_storage)
    }

    fn to_create_table(
        &self,
        table_name: &str,
        fields: &[FieldDescriptor],
        quoter: &dyn IdentifierQuoter,
    ) -> CodecResult<String> {
        let table = quoter.quote_identifier(table_name)?;
        let mut sql = format!("CREATE TABLE IF NOT EXISTS {table} (\n{ID_COLUMN} SERIAL UNIQUE NOT NULL");

        for field in fields {
            let column = quoter.quote_identifier(&field.name)?;
            let column_type = self.to_ddl(&field.field_type)?;
            sql.push_str(",\n");
            sql.push_str(&column);
            sql.push(' ');
            sql.push_str(&column_type);
        }

        sql.push_str("\n);");
        Ok(sql)
    }
}

/// Map a field type to its PostgreSQL column type.
///
/// Collections append `[]` to their element's type, so nesting composes:
/// `vector[vector[int]]` maps to `bigint[][]`.
pub fn map_type(log_type: &LogType, string_storage: StringStorage) -> CodecResult<String> {
    let column_type = match log_type {
        LogType::Bool => "boolean",
        LogType::Int | LogType::Count | LogType::Port => "bigint",
        LogType::Addr | LogType::Subnet => "inet",
        LogType::Time | LogType::Interval | LogType::Double => "double precision",
        LogType::Enum => "text",
        LogType::String | LogType::File | LogType::Func => match string_storage {
            StringStorage::Text => "text",
            StringStorage::Bytea => "bytea",
        },
        LogType::Set(element) | LogType::Vector(element) => {
            return Ok(format!("{}[]", map_type(element, string_storage)?));
        }
        LogType::Record | LogType::Pattern | LogType::Table | LogType::Any | LogType::Opaque => {
            return Err(CodecError::UnsupportedKind(log_type.clone()));
        }
    };
    Ok(column_type.to_string())
}

/// Fail with `UnsupportedKind` if the type, or any element type, has no mapping.
pub fn ensure_mappable(log_type: &LogType) -> CodecResult<()> {
    match log_type {
        LogType::Set(element) | LogType::Vector(element) => ensure_mappable(element),
        LogType::Record | LogType::Pattern | LogType::Table | LogType::Any | LogType::Opaque => {
            Err(CodecError::UnsupportedKind(log_type.clone()))
        }
        _ => Ok(()),
    }
}

/// Positional placeholder for the field at `index` (`$1` for index 0).
pub fn placeholder(index: usize) -> String {
    format!("${}", index + 1)
}

/// Statements derived once per output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatements {
    /// Quoted table name
    pub table: String,
    /// `CREATE TABLE IF NOT EXISTS ...`
    pub create_table: String,
    /// `INSERT INTO ... VALUES ($1, ...) ...;`
    pub insert: String,
}

impl StreamStatements {
    /// Build both statements; any quoting or mapping failure aborts the stream.
    pub fn build(
        table_name: &str,
        fields: &[FieldDescriptor],
        ddl: &PostgreSQLDdl,
        quoter: &dyn IdentifierQuoter,
        sql_addition: &str,
    ) -> CodecResult<Self> {
        let table = quoter.quote_identifier(table_name)?;
        let create_table = ddl.to_create_table(table_name, fields, quoter)?;
        let insert = ddl.to_insert(table_name, fields, sql_addition, quoter)?;
        debug!(table = %table, fields = fields.len(), "Built stream statements");
        Ok(Self {
            table,
            create_table,
            insert,
        })
    }
}
