//! Versioned cache of the attribute schema.
//!
//! Every schema mutation bumps `schema_revisions.version` in the same
//! transaction, so comparing the stored version against the cached
//! snapshot's is enough to know when to reload.

use std::sync::Arc;

use stockroom_core::eav::SchemaSnapshot;
use stockroom_db::repositories::SchemaRepo;
use stockroom_db::DbPool;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct SchemaCache {
    current: RwLock<Option<Arc<SchemaSnapshot>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the latest snapshot, reloading it if the schema has changed
    /// since it was cached.
    pub async fn get(&self, pool: &DbPool) -> Result<Arc<SchemaSnapshot>, sqlx::Error> {
        let version = SchemaRepo::current_version(pool).await?;

        if let Some(snapshot) = self.current.read().await.as_ref() {
            if snapshot.version() == version {
                return Ok(Arc::clone(snapshot));
            }
        }

        let mut slot = self.current.write().await;
        // Another request may have reloaded while we waited for the lock.
        if let Some(snapshot) = slot.as_ref() {
            if snapshot.version() >= version {
                return Ok(Arc::clone(snapshot));
            }
        }
        let snapshot = Arc::new(SchemaRepo::load_snapshot(pool).await?);
        tracing::debug!(version = snapshot.version(), "Schema snapshot reloaded");
        *slot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}
