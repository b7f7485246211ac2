use mongodb::{bson::doc, Client, Database};

use crate::config::AppConfig;
use crate::errors::Result;

pub async fn get_db_client(config: &AppConfig) -> Result<Database> {
    let client = Client::with_uri_str(&config.database_url).await?;
    let db = client.database(&config.database_name);

    // Fail at startup rather than on the first request.
    db.run_command(doc! { "ping": 1 }).await?;
    tracing::info!("✅ Connected to database: {}", config.database_name);

    Ok(db)
}
