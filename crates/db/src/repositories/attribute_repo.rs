//! Repository for the `part_attributes` table.

use sqlx::PgPool;
use stockroom_core::types::DbId;

use crate::models::attribute::{NewAttribute, PartAttribute, UpdateAttribute};
use crate::repositories::SchemaRepo;

/// Column list for `part_attributes` queries.
const COLUMNS: &str = "\
    id, category_id, name, code, data_type, unit, is_required, \
    sort_order, help_text, created_at, updated_at";

/// Provides CRUD operations for attribute definitions.
pub struct AttributeRepo;

impl AttributeRepo {
    pub async fn create(
        pool: &PgPool,
        category_id: DbId,
        input: &NewAttribute,
    ) -> Result<PartAttribute, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO part_attributes \
                 (category_id, name, code, data_type, unit, is_required, sort_order, help_text) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let attribute = sqlx::query_as::<_, PartAttribute>(&query)
            .bind(category_id)
            .bind(&input.name)
            .bind(&input.code)
            .bind(input.data_type.as_str())
            .bind(input.unit.as_deref())
            .bind(input.is_required)
            .bind(input.sort_order)
            .bind(input.help_text.as_deref())
            .fetch_one(&mut *tx)
            .await?;
        SchemaRepo::bump(&mut *tx).await?;
        tx.commit().await?;
        Ok(attribute)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PartAttribute>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM part_attributes WHERE id = $1");
        sqlx::query_as::<_, PartAttribute>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Attributes of a category in display order.
    pub async fn list_for_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<PartAttribute>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM part_attributes \
             WHERE category_id = $1 \
             ORDER BY sort_order, name, id"
        );
        sqlx::query_as::<_, PartAttribute>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Update an attribute. `code` must already be resolved and checked for
    /// uniqueness. Returns `None` if the attribute does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAttribute,
    ) -> Result<Option<PartAttribute>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE part_attributes SET \
                 name = COALESCE($2, name), \
                 code = COALESCE($3, code), \
                 unit = COALESCE($4, unit), \
                 is_required = COALESCE($5, is_required), \
                 sort_order = COALESCE($6, sort_order), \
                 help_text = COALESCE($7, help_text) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let attribute = sqlx::query_as::<_, PartAttribute>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.code.as_deref())
            .bind(input.unit.as_deref())
            .bind(input.is_required)
            .bind(input.sort_order)
            .bind(input.help_text.as_deref())
            .fetch_optional(&mut *tx)
            .await?;
        if attribute.is_some() {
            SchemaRepo::bump(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(attribute)
    }

    /// Number of stored values for the attribute.
    pub async fn count_values(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM part_attribute_values WHERE attribute_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Delete an attribute and its choices. With `cascade`, its stored values
    /// are deleted first; otherwise existing values make the delete fail.
    ///
    /// Returns `true` if an attribute was deleted.
    pub async fn delete(pool: &PgPool, id: DbId, cascade: bool) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if cascade {
            sqlx::query("DELETE FROM part_attribute_values WHERE attribute_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        let result = sqlx::query("DELETE FROM part_attributes WHERE id = $1")
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
