//! Core types for typed log streams.
//!
//! This crate provides the value model shared by the PostgreSQL codec and
//! the stream drivers:
//!
//! - [`LogType`] - Field types, including nested sets and vectors
//! - [`LogValue`] - Field payloads, with an explicit absent value
//! - [`TypedValue`] - A payload together with its declared type
//! - [`FieldDescriptor`] / [`StreamSchema`] - Stream definitions loaded from YAML
//!
//! # Architecture
//!
//! ```text
//! log-core (this crate)
//!    │
//!    ├─── postgresql-log-types  (type mapping, literal codec, statements)
//!    │
//!    └─── pglog-postgresql      (writer and reader over tokio-postgres)
//! ```
//!
//! # Example
//!
//! ```rust
//! use log_core::{LogType, LogValue, TypedValue};
//!
//! let tags = TypedValue::vector(
//!     LogType::String,
//!     vec![LogValue::String("x".into()), LogValue::Null],
//! );
//! assert_eq!(tags.log_type.to_string(), "vector[string]");
//! ```

pub mod json;
pub mod schema;
pub mod types;
pub mod values;

pub use schema::{FieldDescriptor, SchemaError, StreamSchema};
pub use types::{LogType, ParseTypeError};
pub use values::{LogRow, LogValue, Subnet, SubnetError, TypedValue};
