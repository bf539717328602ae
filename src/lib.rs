//! pglog
//!
//! Stores typed log streams in PostgreSQL and reads them back.
//!
//! A stream is described by a YAML schema naming its path (the table) and its
//! typed fields. Records are exchanged as JSON lines, one object per row.
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the statements generated for a stream
//! pglog ddl --schema conn.yaml
//!
//! # Create the table and insert every record
//! pglog write --schema conn.yaml --input conn.jsonl --dbname zeek
//!
//! # Decode the result of a query back into records
//! pglog read --schema conn.yaml --query 'SELECT * FROM "conn"' --dbname zeek
//! ```

pub mod commands;

pub use commands::{read_jsonl, render_ddl, write_jsonl};
