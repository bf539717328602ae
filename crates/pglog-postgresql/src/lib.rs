//! PostgreSQL log streams.
//!
//! [`PostgreSQLLogWriter`] stores the rows of a log stream in a table named
//! after the stream path, creating it on first use. [`PostgreSQLLogReader`]
//! runs a query and decodes its result rows back into typed values.
//!
//! Values travel as text in both directions; the conversion itself lives in
//! `postgresql-log-types`.

pub mod args;
pub mod config;
pub mod connect;
pub mod error;
pub mod params;
pub mod reader;
pub mod writer;

pub use args::{PostgreSQLConnectionArgs, PostgreSQLWriterArgs};
pub use config::{ConnectionConfig, ConnectionDefaults, StreamParams, WriterOptions};
pub use error::{LogStreamError, Result};
pub use reader::PostgreSQLLogReader;
pub use writer::PostgreSQLLogWriter;
