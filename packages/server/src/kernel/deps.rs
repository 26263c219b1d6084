//! Server dependencies shared by all use-case entry points.
//!
//! Both handles are created once at process start (see `bootstrap`) and
//! injected here; nothing in the domain layer reaches for globals. The pool
//! is safe for concurrent checkout; a checked-out connection or transaction
//! is always passed explicitly down one call chain and never shared.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use super::traits::BlobStore;

/// Dependency container handed to every action.
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub blob_store: Arc<dyn BlobStore>,
    /// Lifetime of presigned attachment URLs.
    pub presign_ttl: Duration,
}

impl ServerDeps {
    pub fn new(db_pool: PgPool, blob_store: Arc<dyn BlobStore>, presign_ttl: Duration) -> Self {
        Self {
            db_pool,
            blob_store,
            presign_ttl,
        }
    }
}
