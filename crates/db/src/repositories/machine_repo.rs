//! Repository for the `machines` table.

use sqlx::PgPool;
use stockroom_core::listing::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use stockroom_core::types::DbId;

use crate::models::machine::{CreateMachine, Machine, MachineListParams, UpdateMachine};
use crate::repositories::ilike_pattern;

/// Column list for `machines` queries.
const COLUMNS: &str = "id, make, model, year, machine_type, market_type, created_at, updated_at";

/// Provides CRUD operations for machines.
pub struct MachineRepo;

impl MachineRepo {
    pub async fn create(pool: &PgPool, input: &CreateMachine) -> Result<Machine, sqlx::Error> {
        let query = format!(
            "INSERT INTO machines (make, model, year, machine_type, market_type) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Machine>(&query)
            .bind(&input.make)
            .bind(&input.model)
            .bind(input.year)
            .bind(&input.machine_type)
            .bind(&input.market_type)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Machine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM machines WHERE id = $1");
        sqlx::query_as::<_, Machine>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List machines, newest model year first.
    pub async fn list(
        pool: &PgPool,
        params: &MachineListParams,
    ) -> Result<Vec<Machine>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM machines \
             WHERE ($1::TEXT IS NULL \
                    OR make ILIKE $1 OR model ILIKE $1 OR machine_type ILIKE $1) \
             ORDER BY make, model, year DESC, id \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Machine>(&query)
            .bind(ilike_pattern(params.search.as_deref()))
            .bind(clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMachine,
    ) -> Result<Option<Machine>, sqlx::Error> {
        let query = format!(
            "UPDATE machines SET \
                 make = COALESCE($2, make), \
                 model = COALESCE($3, model), \
                 year = COALESCE($4, year), \
                 machine_type = COALESCE($5, machine_type), \
                 market_type = COALESCE($6, market_type) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Machine>(&query)
            .bind(id)
            .bind(input.make.as_deref())
            .bind(input.model.as_deref())
            .bind(input.year)
            .bind(input.machine_type.as_deref())
            .bind(input.market_type.as_deref())
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM machines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
