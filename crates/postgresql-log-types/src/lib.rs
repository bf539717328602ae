//! PostgreSQL text codec for typed log values.
//!
//! This crate converts between [`log_core::TypedValue`] and the text
//! PostgreSQL uses for parameters and query results:
//!
//! - [`ddl`]: column type mapping, `CREATE TABLE` and `INSERT` generation
//! - [`forward`]: value → parameter text, including array literals
//! - [`reverse`]: result text → value
//! - [`array`]: array literal tokenizer shared by the decoder
//! - [`row`]: whole-row conversion and result column mapping
//!
//! No I/O happens here; the connection lives in `pglog-postgresql`.

pub mod array;
pub mod ddl;
pub mod error;
pub mod escape;
pub mod forward;
pub mod ident;
pub mod reverse;
pub mod row;

pub use ddl::{PostgreSQLDdl, StreamStatements, StringStorage, ToDdl};
pub use error::{CodecError, CodecResult, RowError};
pub use forward::{encode, EncodedParam};
pub use ident::{IdentifierQuoter, PostgreSQLQuoter};
pub use reverse::{decode, decode_cell};
pub use row::{decode_row, encode_row, ColumnMapping, ColumnMappingError};
