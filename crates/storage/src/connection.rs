//! PostgreSQL connection pooling.
//!
//! Stage workers in §5 cap concurrency at "the storage pool size (default 8
//! concurrent)"; [`Pool`] is that shared, bounded pool. Diesel's blocking
//! API is called through [`crate::repo::Storage`], which suspends on a
//! [`tokio::task::spawn_blocking`] thread rather than the async executor so
//! stages still yield promptly, per §5's suspension model.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool as R2d2Pool, PooledConnection};

use crate::error::RepoError;

/// A pooled Diesel PostgreSQL connection.
pub type PooledPg = PooledConnection<ConnectionManager<PgConnection>>;

/// A bounded pool of PostgreSQL connections.
#[derive(Clone)]
pub struct Pool(R2d2Pool<ConnectionManager<PgConnection>>);

impl Pool {
    /// Builds a pool capped at `max_size` connections against `database_url`.
    pub fn connect(database_url: &str, max_size: u32) -> Result<Self, RepoError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = R2d2Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(|e| RepoError::TransientIo(e.to_string()))?;
        Ok(Self(pool))
    }

    /// Checks out a connection, blocking the calling (blocking-pool) thread
    /// until one is available.
    pub fn get(&self) -> Result<PooledPg, RepoError> {
        self.0.get().map_err(|e| RepoError::TransientIo(e.to_string()))
    }
}
