use crate::config::ConnectionConfig;
use crate::error::Result;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

/// Connect and drive the connection on a background task.
pub async fn connect(config: &ConnectionConfig) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(config.connection_string(), NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("PostgreSQL connection error: {}", e);
        }
    });

    debug!("Connected to PostgreSQL");
    Ok(client)
}
