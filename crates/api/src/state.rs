use std::sync::Arc;

use stockroom_core::eav::SchemaSnapshot;

use crate::config::ServerConfig;
use crate::error::AppResult;
use crate::schema_cache::SchemaCache;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: stockroom_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Latest attribute schema snapshot.
    pub schema: Arc<SchemaCache>,
}

impl AppState {
    pub fn new(pool: stockroom_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            schema: Arc::new(SchemaCache::new()),
        }
    }

    /// The current schema snapshot for this request.
    pub async fn snapshot(&self) -> AppResult<Arc<SchemaSnapshot>> {
        Ok(self.schema.get(&self.pool).await?)
    }
}
