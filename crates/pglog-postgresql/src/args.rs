//! CLI argument definitions for PostgreSQL log streams.

use crate::config::{
    StreamParams, PARAM_BYTEA_INSTEAD_OF_TEXT, PARAM_CONNINFO, PARAM_CONTINUE_ON_ERRORS,
    PARAM_DBNAME, PARAM_HOSTNAME, PARAM_PORT, PARAM_SQL_ADDITION,
};
use clap::Args;

/// Connection arguments shared by the writer and the reader.
#[derive(Args, Clone, Debug, Default)]
pub struct PostgreSQLConnectionArgs {
    /// PostgreSQL connection string (e.g., "host=localhost user=postgres dbname=zeek")
    #[arg(long, env = "POSTGRESQL_CONNECTION_STRING")]
    pub conninfo: Option<String>,

    /// Server host, used when no connection string is given
    #[arg(long, env = "PGLOG_HOSTNAME")]
    pub hostname: Option<String>,

    /// Database name, used when no connection string is given
    #[arg(long, env = "PGLOG_DBNAME")]
    pub dbname: Option<String>,

    /// Server port, used when no connection string is given
    #[arg(long, env = "PGLOG_PORT")]
    pub port: Option<u16>,
}

impl PostgreSQLConnectionArgs {
    /// Stream parameters for the options that were given.
    pub fn to_params(&self) -> StreamParams {
        let mut params = StreamParams::new();
        let mut set = |name: &str, value: Option<String>| {
            if let Some(value) = value {
                params.insert(name.to_string(), value);
            }
        };
        set(PARAM_CONNINFO, self.conninfo.clone());
        set(PARAM_HOSTNAME, self.hostname.clone());
        set(PARAM_DBNAME, self.dbname.clone());
        set(PARAM_PORT, self.port.map(|p| p.to_string()));
        params
    }
}

/// Writer arguments.
#[derive(Args, Clone, Debug, Default)]
pub struct PostgreSQLWriterArgs {
    #[command(flatten)]
    pub connection: PostgreSQLConnectionArgs,

    /// Clause appended to every INSERT (e.g., "ON CONFLICT DO NOTHING")
    #[arg(long)]
    pub sql_addition: Option<String>,

    /// Log and skip rows that fail to insert instead of stopping
    #[arg(long)]
    pub continue_on_errors: bool,

    /// Store string fields as bytea instead of text
    #[arg(long)]
    pub bytea_instead_of_text: bool,
}

impl PostgreSQLWriterArgs {
    pub fn to_params(&self) -> StreamParams {
        let mut params = self.connection.to_params();
        if let Some(addition) = &self.sql_addition {
            params.insert(PARAM_SQL_ADDITION.to_string(), addition.clone());
        }
        if self.continue_on_errors {
            params.insert(PARAM_CONTINUE_ON_ERRORS.to_string(), "T".to_string());
        }
        if self.bytea_instead_of_text {
            params.insert(PARAM_BYTEA_INSTEAD_OF_TEXT.to_string(), "T".to_string());
        }
        params
    }
}
