//! Repository for the `part_attribute_choices` table.

use sqlx::PgPool;
use stockroom_core::types::DbId;

use crate::models::choice::PartAttributeChoice;
use crate::repositories::SchemaRepo;

/// Column list for `part_attribute_choices` queries.
const COLUMNS: &str = "id, attribute_id, value, label, sort_order, created_at, updated_at";

/// Provides CRUD operations for choice options.
pub struct ChoiceRepo;

impl ChoiceRepo {
    pub async fn create(
        pool: &PgPool,
        attribute_id: DbId,
        value: &str,
        label: &str,
        sort_order: i32,
    ) -> Result<PartAttributeChoice, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO part_attribute_choices (attribute_id, value, label, sort_order) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let choice = sqlx::query_as::<_, PartAttributeChoice>(&query)
            .bind(attribute_id)
            .bind(value)
            .bind(label)
            .bind(sort_order)
            .fetch_one(&mut *tx)
            .await?;
        SchemaRepo::bump(&mut *tx).await?;
        tx.commit().await?;
        Ok(choice)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PartAttributeChoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM part_attribute_choices WHERE id = $1");
        sqlx::query_as::<_, PartAttributeChoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Options of an attribute in display order.
    pub async fn list_for_attribute(
        pool: &PgPool,
        attribute_id: DbId,
    ) -> Result<Vec<PartAttributeChoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM part_attribute_choices \
             WHERE attribute_id = $1 \
             ORDER BY sort_order, label, id"
        );
        sqlx::query_as::<_, PartAttributeChoice>(&query)
            .bind(attribute_id)
            .fetch_all(pool)
            .await
    }

    /// Update an option. Values referencing it follow a changed `value`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        value: Option<&str>,
        label: Option<&str>,
        sort_order: Option<i32>,
    ) -> Result<Option<PartAttributeChoice>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE part_attribute_choices SET \
                 value = COALESCE($2, value), \
                 label = COALESCE($3, label), \
                 sort_order = COALESCE($4, sort_order) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let choice = sqlx::query_as::<_, PartAttributeChoice>(&query)
            .bind(id)
            .bind(value)
            .bind(label)
            .bind(sort_order)
            .fetch_optional(&mut *tx)
            .await?;
        if choice.is_some() {
            SchemaRepo::bump(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(choice)
    }

    /// Number of stored values selecting this option.
    pub async fn count_values(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM part_attribute_values WHERE choice_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Delete an option. With `cascade`, values selecting it are deleted
    /// first; otherwise they make the delete fail.
    pub async fn delete(pool: &PgPool, id: DbId, cascade: bool) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if cascade {
            sqlx::query("DELETE FROM part_attribute_values WHERE choice_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        let result = sqlx::query("DELETE FROM part_attribute_choices WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            SchemaRepo::bump(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(deleted)
    }
}
