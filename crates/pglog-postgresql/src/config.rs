//! Stream parameter resolution.
//!
//! Streams are configured with a flat name → value map. Connection
//! parameters resolve into a libpq-style connection string; the remaining
//! writer parameters become [`WriterOptions`].

use crate::error::{LogStreamError, Result};
use std::collections::HashMap;
use tracing::info;

/// Name → value stream parameters.
pub type StreamParams = HashMap<String, String>;

pub const PARAM_CONNINFO: &str = "conninfo";
pub const PARAM_HOSTNAME: &str = "hostname";
pub const PARAM_DBNAME: &str = "dbname";
pub const PARAM_PORT: &str = "port";
pub const PARAM_SQL_ADDITION: &str = "sql_addition";
pub const PARAM_CONTINUE_ON_ERRORS: &str = "continue_on_errors";
pub const PARAM_BYTEA_INSTEAD_OF_TEXT: &str = "bytea_instead_of_text";

/// Fallbacks for connection parameters a stream does not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDefaults {
    pub hostname: String,
    /// `None` makes `dbname` mandatory.
    pub dbname: Option<String>,
    pub port: Option<u16>,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            dbname: None,
            port: None,
        }
    }
}

/// Resolved connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    conninfo: String,
}

impl ConnectionConfig {
    /// Use a complete connection string as is.
    pub fn new(conninfo: impl Into<String>) -> Self {
        Self {
            conninfo: conninfo.into(),
        }
    }

    /// Resolve connection parameters.
    ///
    /// A non-empty `conninfo` wins outright. Otherwise the string is built
    /// from `hostname`, `dbname` and `port`, falling back to `defaults`.
    pub fn from_params(params: &StreamParams, defaults: &ConnectionDefaults) -> Result<Self> {
        if let Some(conninfo) = lookup(params, PARAM_CONNINFO) {
            return Ok(Self::new(conninfo));
        }

        let hostname = match lookup(params, PARAM_HOSTNAME) {
            Some(hostname) => hostname.to_string(),
            None => {
                info!(
                    "hostname configuration option not found. Defaulting to {}",
                    defaults.hostname
                );
                defaults.hostname.clone()
            }
        };

        let dbname = match (lookup(params, PARAM_DBNAME), &defaults.dbname) {
            (Some(dbname), _) => dbname.to_string(),
            (None, Some(default)) => {
                info!("dbname configuration option not found. Defaulting to {default}");
                default.clone()
            }
            (None, None) => {
                return Err(LogStreamError::Config(
                    "dbname configuration option not found".to_string(),
                ))
            }
        };

        let mut conninfo = format!("host={hostname} dbname={dbname}");
        match lookup(params, PARAM_PORT) {
            Some(port) => {
                let port: u16 = port.parse().map_err(|_| {
                    LogStreamError::Config(format!("invalid port '{port}'"))
                })?;
                conninfo.push_str(&format!(" port={port}"));
            }
            None => {
                if let Some(port) = defaults.port {
                    conninfo.push_str(&format!(" port={port}"));
                }
            }
        }

        Ok(Self { conninfo })
    }

    pub fn connection_string(&self) -> &str {
        &self.conninfo
    }
}

/// Writer behaviour that does not affect the connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterOptions {
    /// Clause appended to the INSERT template, e.g. `ON CONFLICT DO NOTHING`
    pub sql_addition: String,
    /// Log and skip rows that fail instead of aborting the write
    pub continue_on_errors: bool,
    /// Store string-like fields as `bytea`
    pub bytea_instead_of_text: bool,
}

impl WriterOptions {
    pub fn from_params(params: &StreamParams) -> Self {
        Self {
            sql_addition: lookup(params, PARAM_SQL_ADDITION)
                .unwrap_or_default()
                .to_string(),
            continue_on_errors: flag(params, PARAM_CONTINUE_ON_ERRORS),
            bytea_instead_of_text: flag(params, PARAM_BYTEA_INSTEAD_OF_TEXT),
        }
    }
}

/// Non-empty parameter value.
fn lookup<'a>(params: &'a StreamParams, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Boolean parameters are on only when set to exactly `T`.
fn flag(params: &StreamParams, name: &str) -> bool {
    lookup(params, name) == Some("T")
}
