use std::time::Duration;

use bson::doc;
use mongodb::{Client, Database, error::Error as MongoError, options::ClientOptions};
use tracing::info;

use crate::config::DatabaseConfig;

/// Connect to MongoDB and verify the deployment answers a ping.
///
/// The returned handle is cheap to clone and safe to share across requests;
/// the driver multiplexes calls over its own connection pool.
pub async fn init_db(config: &DatabaseConfig) -> Result<Database, MongoError> {
    let mut opt = ClientOptions::parse(&config.url).await?;

    // Set connection pool options
    opt.app_name = Some("estate-server".into());
    opt.max_pool_size = Some(config.max_pool_size);
    opt.min_pool_size = Some(1);
    opt.connect_timeout = Some(Duration::from_millis(config.connect_timeout_ms));
    opt.server_selection_timeout = Some(Duration::from_millis(config.connect_timeout_ms));

    let client = Client::with_options(opt)?;
    let db = client.database(&config.name);
    db.run_command(doc! { "ping": 1 }).await?;

    info!(database = %config.name, "Connected to MongoDB");
    Ok(db)
}
