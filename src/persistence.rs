//! Shared `PostgreSQL` connection plumbing for Diesel adapters.
//!
//! Diesel connections are synchronous, so adapters obtain a pooled
//! connection and run their queries on tokio's blocking thread pool.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};

/// `PostgreSQL` connection pool shared by the catalog and job adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Pooled connection handed to adapter closures.
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Default upper bound on pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Builds a connection pool for the given database URL.
///
/// # Errors
///
/// Returns [`PoolError`] when the initial connections cannot be established.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

/// Runs `f` with a pooled connection on the blocking thread pool.
///
/// Pool checkout failures and join failures are mapped into the caller's
/// error type with `map_err`.
pub(crate) async fn run_blocking<F, T, E, M>(pool: &PgPool, map_err: M, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    M: Fn(Box<dyn std::error::Error + Send + Sync>) -> E + Send + Copy + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(|err| map_err(Box::new(err)))?;
        f(&mut connection)
    })
    .await
    .map_err(|err| map_err(Box::new(err)))?
}
