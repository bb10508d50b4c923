use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use eyre::{Error, Result};

/// Pool of async Postgres connections
pub type DbPool = Pool<AsyncPgConnection>;

/// Connections kept open for the opportunity store. Scans write sequentially,
/// the CLI query commands need one or two.
const MAX_POOL_SIZE: usize = 8;

/// Creates the database connection pool.
///
/// Connections are opened lazily, so a wrong URL only shows up on first use.
///
/// # Errors
/// * If pool creation fails
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Pool::builder(manager)
        .max_size(MAX_POOL_SIZE)
        .build()
        .map_err(|e| Error::msg(format!("Failed to create connection pool: {e}")))
}
