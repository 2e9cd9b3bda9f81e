//! Repository for the `part_categories` table.

use sqlx::PgPool;
use stockroom_core::types::DbId;

use crate::models::category::{CategoryWithCounts, PartCategory};
use crate::repositories::SchemaRepo;

/// Column list for `part_categories` queries.
const COLUMNS: &str = "id, name, slug, created_at, updated_at";

/// Provides CRUD operations for part categories.
pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(
        pool: &PgPool,
        name: &str,
        slug: &str,
    ) -> Result<PartCategory, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO part_categories (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, PartCategory>(&query)
            .bind(name)
            .bind(slug)
            .fetch_one(&mut *tx)
            .await?;
        SchemaRepo::bump(&mut *tx).await?;
        tx.commit().await?;
        Ok(category)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PartCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM part_categories WHERE id = $1");
        sqlx::query_as::<_, PartCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All categories ordered by name, with attribute and part counts.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<CategoryWithCounts>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithCounts>(
            "SELECT c.id, c.name, c.slug, \
                    (SELECT COUNT(*) FROM part_attributes a \
                     WHERE a.category_id = c.id) AS field_count, \
                    (SELECT COUNT(*) FROM parts p WHERE p.category_id = c.id) AS part_count \
             FROM part_categories c \
             ORDER BY c.name, c.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Slugs equal to `base` or of the form `base-…`, for collision suffixing.
    pub async fn slugs_like(pool: &PgPool, base: &str) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT slug FROM part_categories WHERE slug = $1 OR starts_with(slug, $1 || '-')",
        )
        .bind(base)
        .fetch_all(pool)
        .await
    }

    /// Rename a category. Returns `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
        slug: Option<&str>,
    ) -> Result<Option<PartCategory>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE part_categories SET \
                 name = COALESCE($2, name), \
                 slug = COALESCE($3, slug) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, PartCategory>(&query)
            .bind(id)
            .bind(name)
            .bind(slug)
            .fetch_optional(&mut *tx)
            .await?;
        if category.is_some() {
            SchemaRepo::bump(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(category)
    }

    /// Number of parts assigned to the category.
    pub async fn count_parts(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parts WHERE category_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a category together with its attributes and choices.
    ///
    /// Fails with a foreign-key violation if any value still references one
    /// of its attributes; use [`Self::delete_cascade`] to remove those too.
    /// Returns `true` if a category was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query("DELETE FROM part_categories WHERE id = $1")
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

    /// Unassign the category's parts, delete every value of its attributes,
    /// then delete the category.
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let values = sqlx::query(
            "DELETE FROM part_attribute_values \
             WHERE attribute_id IN (SELECT id FROM part_attributes WHERE category_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let parts = sqlx::query("UPDATE parts SET category_id = NULL WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM part_categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            SchemaRepo::bump(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!(
            category_id = id,
            values_removed = values.rows_affected(),
            parts_unassigned = parts.rows_affected(),
            "Category cascade delete",
        );
        Ok(deleted)
    }
}
