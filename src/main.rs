//! Command-line interface for pglog
//!
//! # Usage Examples
//!
//! ```bash
//! # Show the table and insert statements for a stream
//! pglog ddl --schema conn.yaml --bytea-instead-of-text
//!
//! # Insert records, skipping rows the server rejects
//! pglog write --schema conn.yaml --input conn.jsonl \
//!   --hostname db --dbname zeek --continue-on-errors
//!
//! # Read records back as JSON lines
//! POSTGRESQL_CONNECTION_STRING="host=db dbname=zeek" \
//!   pglog read --schema conn.yaml --query 'SELECT * FROM "conn" ORDER BY id'
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use pglog::commands::{load_schema, render_ddl, run_read, run_write, write_jsonl};
use pglog_postgresql::{PostgreSQLConnectionArgs, PostgreSQLWriterArgs};
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pglog")]
#[command(about = "Write typed log streams to PostgreSQL and read them back")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the CREATE TABLE and INSERT statements for a stream
    Ddl {
        /// Path to stream schema YAML file
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// Map string fields to bytea instead of text
        #[arg(long)]
        bytea_instead_of_text: bool,

        /// Clause appended to the INSERT statement
        #[arg(long, default_value = "")]
        sql_addition: String,
    },

    /// Create the stream's table and insert JSONL records
    Write {
        /// Path to stream schema YAML file
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// JSONL input file (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        #[command(flatten)]
        writer: PostgreSQLWriterArgs,
    },

    /// Run a query and print the decoded rows as JSONL
    Read {
        /// Path to stream schema YAML file
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// Query whose result columns are named after the schema fields
        #[arg(long, short = 'q')]
        query: String,

        #[command(flatten)]
        connection: PostgreSQLConnectionArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ddl {
            schema,
            bytea_instead_of_text,
            sql_addition,
        } => {
            let schema = load_schema(&schema)?;
            print!("{}", render_ddl(&schema, bytea_instead_of_text, &sql_addition)?);
        }
        Commands::Write {
            schema,
            input,
            writer,
        } => {
            let schema = load_schema(&schema)?;
            let written = match input {
                Some(path) => {
                    let file = std::fs::File::open(&path)
                        .with_context(|| format!("Failed to open input {path:?}"))?;
                    run_write(&schema, BufReader::new(file), &writer).await?
                }
                None => run_write(&schema, std::io::stdin().lock(), &writer).await?,
            };
            tracing::info!("Write completed: {} rows stored", written);
        }
        Commands::Read {
            schema,
            query,
            connection,
        } => {
            let schema = load_schema(&schema)?;
            let rows = run_read(&schema, &query, &connection).await?;
            write_jsonl(&schema.fields, &rows, std::io::stdout().lock())?;
        }
    }

    Ok(())
}
