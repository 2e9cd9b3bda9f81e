//! Repository for the `part_attribute_values` table.
//!
//! Rows are read joined with the attribute's data type and the selected
//! option's value so they decode straight into `TypedValue`.

use sqlx::{PgConnection, PgPool};
use stockroom_core::types::DbId;

use crate::models::attribute_value::{AttributeValueRow, ValueWrite};

/// Select list producing [`AttributeValueRow`].
const VALUE_SELECT: &str = "\
    SELECT v.part_id, v.attribute_id, a.data_type, v.value_text, v.value_int, \
           v.value_dec, v.value_bool, v.value_date, c.value AS choice_value \
    FROM part_attribute_values v \
    JOIN part_attributes a ON a.id = v.attribute_id \
    LEFT JOIN part_attribute_choices c ON c.id = v.choice_id";

/// Reads and writes typed spec values.
pub struct AttributeValueRepo;

impl AttributeValueRepo {
    /// The value of one attribute for one part.
    pub async fn get(
        pool: &PgPool,
        part_id: DbId,
        attribute_id: DbId,
    ) -> Result<Option<AttributeValueRow>, sqlx::Error> {
        let query = format!("{VALUE_SELECT} WHERE v.part_id = $1 AND v.attribute_id = $2");
        sqlx::query_as::<_, AttributeValueRow>(&query)
            .bind(part_id)
            .bind(attribute_id)
            .fetch_optional(pool)
            .await
    }

    /// Every stored value of a part.
    pub async fn list_for_part(
        pool: &PgPool,
        part_id: DbId,
    ) -> Result<Vec<AttributeValueRow>, sqlx::Error> {
        let query = format!("{VALUE_SELECT} WHERE v.part_id = $1 ORDER BY v.attribute_id");
        sqlx::query_as::<_, AttributeValueRow>(&query)
            .bind(part_id)
            .fetch_all(pool)
            .await
    }

    /// Values of the given attributes for the given parts (CSV export).
    pub async fn list_for_parts(
        pool: &PgPool,
        part_ids: &[DbId],
        attribute_ids: &[DbId],
    ) -> Result<Vec<AttributeValueRow>, sqlx::Error> {
        if part_ids.is_empty() || attribute_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query =
            format!("{VALUE_SELECT} WHERE v.part_id = ANY($1) AND v.attribute_id = ANY($2)");
        sqlx::query_as::<_, AttributeValueRow>(&query)
            .bind(part_ids)
            .bind(attribute_ids)
            .fetch_all(pool)
            .await
    }

    /// Apply one write on an open connection: upsert a value or clear it.
    pub async fn write(
        conn: &mut PgConnection,
        part_id: DbId,
        write: &ValueWrite,
    ) -> Result<(), sqlx::Error> {
        let Some(value) = &write.value else {
            sqlx::query(
                "DELETE FROM part_attribute_values WHERE part_id = $1 AND attribute_id = $2",
            )
            .bind(part_id)
            .bind(write.attribute_id)
            .execute(conn)
            .await?;
            return Ok(());
        };

        let slots = value.clone().into_slots();
        sqlx::query(
            "INSERT INTO part_attribute_values \
                 (part_id, attribute_id, value_text, value_int, value_dec, \
                  value_bool, value_date, choice_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (part_id, attribute_id) DO UPDATE SET \
                 value_text = EXCLUDED.value_text, \
                 value_int = EXCLUDED.value_int, \
                 value_dec = EXCLUDED.value_dec, \
                 value_bool = EXCLUDED.value_bool, \
                 value_date = EXCLUDED.value_date, \
                 choice_id = EXCLUDED.choice_id",
        )
        .bind(part_id)
        .bind(write.attribute_id)
        .bind(slots.text)
        .bind(slots.integer)
        .bind(slots.decimal)
        .bind(slots.boolean)
        .bind(slots.date)
        .bind(write.choice_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Apply a single write.
    pub async fn write_one(
        pool: &PgPool,
        part_id: DbId,
        write: &ValueWrite,
    ) -> Result<(), sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::write(&mut *conn, part_id, write).await
    }

    /// Apply several writes atomically.
    pub async fn write_batch(
        pool: &PgPool,
        part_id: DbId,
        writes: &[ValueWrite],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        for write in writes {
            Self::write(&mut *tx, part_id, write).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Remove one value. Returns `true` if a value existed.
    pub async fn delete(
        pool: &PgPool,
        part_id: DbId,
        attribute_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM part_attribute_values WHERE part_id = $1 AND attribute_id = $2",
        )
        .bind(part_id)
        .bind(attribute_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
