//! Whole-row conversion between log rows and statement parameters or
//! result cells.
//!
//! A row either converts completely or not at all: the first failing field
//! aborts the row with a [`RowError`] naming that field.

use crate::error::{CodecError, RowError};
use crate::forward::{encode_value, EncodedParam};
use crate::ident::{column_ordinal, IdentifierQuoter};
use crate::reverse::decode_cell;
use log_core::{FieldDescriptor, LogRow, TypedValue};
use thiserror::Error;

/// Encode one row into parameters, in field order.
pub fn encode_row(
    fields: &[FieldDescriptor],
    row: &[TypedValue],
) -> Result<Vec<EncodedParam>, RowError> {
    check_arity(fields.len(), row.len())?;

    fields
        .iter()
        .zip(row)
        .map(|(field, value)| {
            if value.log_type != field.field_type {
                return Err(field_error(
                    field,
                    CodecError::TypeMismatch {
                        expected: field.field_type.clone(),
                        found: value.value.variant_name(),
                    },
                ));
            }
            encode_value(&field.field_type, &value.value).map_err(|e| field_error(field, e))
        })
        .collect()
}

/// Decode one result row.
///
/// `cells` holds every column of the result in result order; `mapping`
/// picks the cell for each field. `None` is a SQL NULL; a mapped column
/// missing from `cells` is an error, never an absent value.
pub fn decode_row(
    fields: &[FieldDescriptor],
    mapping: &ColumnMapping,
    cells: &[Option<&str>],
) -> Result<LogRow, RowError> {
    check_arity(fields.len(), mapping.len())?;

    fields
        .iter()
        .zip(mapping.ordinals())
        .map(|(field, &ordinal)| {
            let cell = cells.get(ordinal).ok_or_else(|| RowError::MissingCell {
                field: field.name.clone(),
                ordinal,
                cells: cells.len(),
            })?;
            decode_cell(*cell, &field.field_type).map_err(|e| field_error(field, e))
        })
        .collect()
}

fn check_arity(expected: usize, actual: usize) -> Result<(), RowError> {
    if expected != actual {
        return Err(RowError::Arity { expected, actual });
    }
    Ok(())
}

fn field_error(field: &FieldDescriptor, source: CodecError) -> RowError {
    RowError::Field {
        field: field.name.clone(),
        source,
    }
}

/// Failures while matching fields to result columns.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnMappingError {
    #[error(transparent)]
    Escape(#[from] CodecError),

    #[error("field '{0}' has no column in the result")]
    NotFound(String),
}

/// Result column ordinal for each field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    ordinals: Vec<usize>,
}

impl ColumnMapping {
    /// Resolve every field against the column names of a result.
    ///
    /// Field names are quoted first and then looked up with the server's
    /// identifier rules, so `id.orig_h` finds the column named `id.orig_h`.
    pub fn build<S: AsRef<str>>(
        fields: &[FieldDescriptor],
        column_names: &[S],
        quoter: &dyn IdentifierQuoter,
    ) -> Result<Self, ColumnMappingError> {
        let ordinals = fields
            .iter()
            .map(|field| {
                let escaped = quoter.quote_identifier(&field.name)?;
                column_ordinal(column_names, &escaped)
                    .ok_or_else(|| ColumnMappingError::NotFound(field.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ordinals })
    }

    pub fn ordinals(&self) -> &[usize] {
        &self.ordinals
    }

    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }
}
