use anyhow::Result;
use redis::Client as RedisClient;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the Redis client backing the session store.
pub fn create_redis_client(redis_url: &str) -> Result<RedisClient> {
    let client = RedisClient::open(redis_url)?;
    info!("Redis client initialized");
    Ok(client)
}
