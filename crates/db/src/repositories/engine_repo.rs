//! Repository for the `engines` table.

use sqlx::PgPool;
use stockroom_core::listing::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use stockroom_core::types::DbId;

use crate::models::engine::{CreateEngine, Engine, EngineListParams, UpdateEngine};
use crate::repositories::ilike_pattern;

/// Column list for `engines` queries.
const COLUMNS: &str = "\
    id, engine_make, engine_model, serial_number, cpl_number, ar_number, \
    cylinder, compression_ratio, price, status, notes, created_at, updated_at";

/// Provides CRUD operations for engines.
pub struct EngineRepo;

impl EngineRepo {
    pub async fn create(pool: &PgPool, input: &CreateEngine) -> Result<Engine, sqlx::Error> {
        let query = format!(
            "INSERT INTO engines \
                 (engine_make, engine_model, serial_number, cpl_number, ar_number, \
                  cylinder, compression_ratio, price, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Engine>(&query)
            .bind(&input.engine_make)
            .bind(&input.engine_model)
            .bind(input.serial_number.as_deref())
            .bind(input.cpl_number.as_deref())
            .bind(input.ar_number.as_deref())
            .bind(input.cylinder)
            .bind(input.compression_ratio)
            .bind(input.price)
            .bind(input.status.as_deref())
            .bind(input.notes.as_deref())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Engine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM engines WHERE id = $1");
        sqlx::query_as::<_, Engine>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &EngineListParams,
    ) -> Result<Vec<Engine>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM engines \
             WHERE ($1::TEXT IS NULL \
                    OR engine_make ILIKE $1 OR engine_model ILIKE $1 OR serial_number ILIKE $1) \
             ORDER BY engine_make, engine_model, id \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Engine>(&query)
            .bind(ilike_pattern(params.search.as_deref()))
            .bind(clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEngine,
    ) -> Result<Option<Engine>, sqlx::Error> {
        let query = format!(
            "UPDATE engines SET \
                 engine_make = COALESCE($2, engine_make), \
                 engine_model = COALESCE($3, engine_model), \
                 serial_number = COALESCE($4, serial_number), \
                 cpl_number = COALESCE($5, cpl_number), \
                 ar_number = COALESCE($6, ar_number), \
                 cylinder = COALESCE($7, cylinder), \
                 compression_ratio = COALESCE($8, compression_ratio), \
                 price = COALESCE($9, price), \
                 status = COALESCE($10, status), \
                 notes = COALESCE($11, notes) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Engine>(&query)
            .bind(id)
            .bind(input.engine_make.as_deref())
            .bind(input.engine_model.as_deref())
            .bind(input.serial_number.as_deref())
            .bind(input.cpl_number.as_deref())
            .bind(input.ar_number.as_deref())
            .bind(input.cylinder)
            .bind(input.compression_ratio)
            .bind(input.price)
            .bind(input.status.as_deref())
            .bind(input.notes.as_deref())
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM engines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
