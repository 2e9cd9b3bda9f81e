//! Schema revision counter and snapshot loading.

use sqlx::{PgConnection, PgPool};
use stockroom_core::eav::SchemaSnapshot;

use crate::models::attribute::PartAttribute;
use crate::models::category::PartCategory;
use crate::models::choice::PartAttributeChoice;

/// Loads versioned schema snapshots and maintains the revision counter.
pub struct SchemaRepo;

impl SchemaRepo {
    /// Current schema revision.
    pub async fn current_version(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT version FROM schema_revisions WHERE id = 1")
            .fetch_one(pool)
            .await
    }

    /// Increment the revision. Call inside the transaction that changes the
    /// schema so readers never see a new schema under an old version.
    pub async fn bump(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE schema_revisions SET version = version + 1, updated_at = now() \
             WHERE id = 1 \
             RETURNING version",
        )
        .fetch_one(conn)
        .await
    }

    /// Load every category, attribute and choice at one consistent revision.
    pub async fn load_snapshot(pool: &PgPool) -> Result<SchemaSnapshot, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let version =
            sqlx::query_scalar::<_, i64>("SELECT version FROM schema_revisions WHERE id = 1")
                .fetch_one(&mut *tx)
                .await?;

        let categories = sqlx::query_as::<_, PartCategory>(
            "SELECT id, name, slug, created_at, updated_at FROM part_categories",
        )
        .fetch_all(&mut *tx)
        .await?;

        let attributes = sqlx::query_as::<_, PartAttribute>(
            "SELECT id, category_id, name, code, data_type, unit, is_required, \
                    sort_order, help_text, created_at, updated_at \
             FROM part_attributes",
        )
        .fetch_all(&mut *tx)
        .await?;

        let choices = sqlx::query_as::<_, PartAttributeChoice>(
            "SELECT id, attribute_id, value, label, sort_order, created_at, updated_at \
             FROM part_attribute_choices",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            version,
            categories = categories.len(),
            attributes = attributes.len(),
            choices = choices.len(),
            "Schema snapshot loaded",
        );

        Ok(SchemaSnapshot::new(
            version,
            categories.into_iter().map(Into::into).collect(),
            attributes.into_iter().map(Into::into).collect(),
            choices.into_iter().map(Into::into).collect(),
        ))
    }
}
