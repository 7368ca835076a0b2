//! `pgseed init-db` command implementation

use pgseed::db::{create_pool, health_check};

use crate::config::Settings;
use crate::error::Result;
use crate::schema;

/// Connect and create the seeded tables
pub async fn run(settings: &Settings) -> Result<()> {
    let pool = create_pool(&settings.database).await?;
    health_check(&pool).await?;

    schema::init_db(&pool).await?;
    println!("Database schema is up to date.");

    pool.close().await;
    Ok(())
}
