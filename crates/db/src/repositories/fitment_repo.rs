//! Repositories for fitment links and engine supersession.
//!
//! A link is unique per pair; a second link between the same two rows hits
//! the table's `uq_` constraint. A machine has at most one primary engine
//! and one primary part: flagging a new link primary clears the flag on the
//! machine's other links in the same transaction.

use sqlx::PgPool;
use stockroom_core::types::DbId;

use crate::models::fitment::{
    EnginePartLink, EngineSupersession, LinkEngine, LinkPart, MachineEngineLink,
    MachinePartLink, SupersessionHistory,
};

const MACHINE_ENGINE_SELECT: &str = "\
    SELECT me.id, me.machine_id, me.engine_id, m.make, m.model, m.year, \
           e.engine_make, e.engine_model, e.serial_number, \
           me.notes, me.is_primary, me.created_at, me.updated_at \
    FROM machine_engines me \
    JOIN machines m ON m.id = me.machine_id \
    JOIN engines e ON e.id = me.engine_id";

const MACHINE_PART_SELECT: &str = "\
    SELECT mp.id, mp.machine_id, mp.part_id, m.make, m.model, m.year, \
           p.part_number, p.name AS part_name, \
           mp.notes, mp.is_primary, mp.created_at, mp.updated_at \
    FROM machine_parts mp \
    JOIN machines m ON m.id = mp.machine_id \
    JOIN parts p ON p.id = mp.part_id";

const ENGINE_PART_SELECT: &str = "\
    SELECT ep.id, ep.engine_id, ep.part_id, e.engine_make, e.engine_model, e.serial_number, \
           p.part_number, p.name AS part_name, ep.notes, ep.created_at, ep.updated_at \
    FROM engine_parts ep \
    JOIN engines e ON e.id = ep.engine_id \
    JOIN parts p ON p.id = ep.part_id";

const SUPERSESSION_SELECT: &str = "\
    SELECT s.id, s.from_engine_id, f.engine_make AS from_engine_make, \
           f.engine_model AS from_engine_model, s.to_engine_id, \
           t.engine_make AS to_engine_make, t.engine_model AS to_engine_model, \
           s.notes, s.effective_date, s.created_at, s.updated_at \
    FROM engine_supersessions s \
    JOIN engines f ON f.id = s.from_engine_id \
    JOIN engines t ON t.id = s.to_engine_id";

/// Engines and parts fitted to machines.
pub struct MachineFitmentRepo;

impl MachineFitmentRepo {
    /// Engines for a machine, primary first.
    pub async fn engines_for_machine(
        pool: &PgPool,
        machine_id: DbId,
    ) -> Result<Vec<MachineEngineLink>, sqlx::Error> {
        let query = format!(
            "{MACHINE_ENGINE_SELECT} WHERE me.machine_id = $1 \
             ORDER BY me.is_primary DESC, e.engine_make, e.engine_model, me.id"
        );
        sqlx::query_as::<_, MachineEngineLink>(&query)
            .bind(machine_id)
            .fetch_all(pool)
            .await
    }

    pub async fn machines_for_engine(
        pool: &PgPool,
        engine_id: DbId,
    ) -> Result<Vec<MachineEngineLink>, sqlx::Error> {
        let query = format!(
            "{MACHINE_ENGINE_SELECT} WHERE me.engine_id = $1 \
             ORDER BY m.make, m.model, m.year DESC, me.id"
        );
        sqlx::query_as::<_, MachineEngineLink>(&query)
            .bind(engine_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_engine(
        pool: &PgPool,
        machine_id: DbId,
        engine_id: DbId,
    ) -> Result<Option<MachineEngineLink>, sqlx::Error> {
        let query =
            format!("{MACHINE_ENGINE_SELECT} WHERE me.machine_id = $1 AND me.engine_id = $2");
        sqlx::query_as::<_, MachineEngineLink>(&query)
            .bind(machine_id)
            .bind(engine_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn link_engine(
        pool: &PgPool,
        machine_id: DbId,
        input: &LinkEngine,
    ) -> Result<MachineEngineLink, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if input.is_primary {
            sqlx::query(
                "UPDATE machine_engines SET is_primary = false \
                 WHERE machine_id = $1 AND is_primary",
            )
            .bind(machine_id)
            .execute(&mut *tx)
            .await?;
        }
        sqlx::query(
            "INSERT INTO machine_engines (machine_id, engine_id, notes, is_primary) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(machine_id)
        .bind(input.engine_id)
        .bind(input.notes.as_deref())
        .bind(input.is_primary)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Self::find_engine(pool, machine_id, input.engine_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn unlink_engine(
        pool: &PgPool,
        machine_id: DbId,
        engine_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM machine_engines WHERE machine_id = $1 AND engine_id = $2")
                .bind(machine_id)
                .bind(engine_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Parts for a machine, primary first.
    pub async fn parts_for_machine(
        pool: &PgPool,
        machine_id: DbId,
    ) -> Result<Vec<MachinePartLink>, sqlx::Error> {
        let query = format!(
            "{MACHINE_PART_SELECT} WHERE mp.machine_id = $1 \
             ORDER BY mp.is_primary DESC, p.part_number, mp.id"
        );
        sqlx::query_as::<_, MachinePartLink>(&query)
            .bind(machine_id)
            .fetch_all(pool)
            .await
    }

    pub async fn machines_for_part(
        pool: &PgPool,
        part_id: DbId,
    ) -> Result<Vec<MachinePartLink>, sqlx::Error> {
        let query = format!(
            "{MACHINE_PART_SELECT} WHERE mp.part_id = $1 \
             ORDER BY m.make, m.model, m.year DESC, mp.id"
        );
        sqlx::query_as::<_, MachinePartLink>(&query)
            .bind(part_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_part(
        pool: &PgPool,
        machine_id: DbId,
        part_id: DbId,
    ) -> Result<Option<MachinePartLink>, sqlx::Error> {
        let query = format!("{MACHINE_PART_SELECT} WHERE mp.machine_id = $1 AND mp.part_id = $2");
        sqlx::query_as::<_, MachinePartLink>(&query)
            .bind(machine_id)
            .bind(part_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn link_part(
        pool: &PgPool,
        machine_id: DbId,
        input: &LinkPart,
    ) -> Result<MachinePartLink, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if input.is_primary {
            sqlx::query(
                "UPDATE machine_parts SET is_primary = false \
                 WHERE machine_id = $1 AND is_primary",
            )
            .bind(machine_id)
            .execute(&mut *tx)
            .await?;
        }
        sqlx::query(
            "INSERT INTO machine_parts (machine_id, part_id, notes, is_primary) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(machine_id)
        .bind(input.part_id)
        .bind(input.notes.as_deref())
        .bind(input.is_primary)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Self::find_part(pool, machine_id, input.part_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn unlink_part(
        pool: &PgPool,
        machine_id: DbId,
        part_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM machine_parts WHERE machine_id = $1 AND part_id = $2")
                .bind(machine_id)
                .bind(part_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Parts fitted to engines, and engine supersession.
pub struct EngineFitmentRepo;

impl EngineFitmentRepo {
    pub async fn parts_for_engine(
        pool: &PgPool,
        engine_id: DbId,
    ) -> Result<Vec<EnginePartLink>, sqlx::Error> {
        let query = format!(
            "{ENGINE_PART_SELECT} WHERE ep.engine_id = $1 ORDER BY p.part_number, ep.id"
        );
        sqlx::query_as::<_, EnginePartLink>(&query)
            .bind(engine_id)
            .fetch_all(pool)
            .await
    }

    pub async fn engines_for_part(
        pool: &PgPool,
        part_id: DbId,
    ) -> Result<Vec<EnginePartLink>, sqlx::Error> {
        let query = format!(
            "{ENGINE_PART_SELECT} WHERE ep.part_id = $1 \
             ORDER BY e.engine_make, e.engine_model, ep.id"
        );
        sqlx::query_as::<_, EnginePartLink>(&query)
            .bind(part_id)
            .fetch_all(pool)
            .await
    }

    pub async fn link_part(
        pool: &PgPool,
        engine_id: DbId,
        input: &LinkPart,
    ) -> Result<EnginePartLink, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO engine_parts (engine_id, part_id, notes) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(engine_id)
        .bind(input.part_id)
        .bind(input.notes.as_deref())
        .fetch_one(pool)
        .await?;

        let query = format!("{ENGINE_PART_SELECT} WHERE ep.id = $1");
        sqlx::query_as::<_, EnginePartLink>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn unlink_part(
        pool: &PgPool,
        engine_id: DbId,
        part_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM engine_parts WHERE engine_id = $1 AND part_id = $2")
            .bind(engine_id)
            .bind(part_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Older engines `engine_id` replaces and newer engines replacing it,
    /// most recent effective date first.
    pub async fn supersessions(
        pool: &PgPool,
        engine_id: DbId,
    ) -> Result<SupersessionHistory, sqlx::Error> {
        let order = "ORDER BY s.effective_date DESC NULLS LAST, s.id";
        let supersedes = format!("{SUPERSESSION_SELECT} WHERE s.to_engine_id = $1 {order}");
        let superseded_by = format!("{SUPERSESSION_SELECT} WHERE s.from_engine_id = $1 {order}");

        Ok(SupersessionHistory {
            supersedes: sqlx::query_as::<_, EngineSupersession>(&supersedes)
                .bind(engine_id)
                .fetch_all(pool)
                .await?,
            superseded_by: sqlx::query_as::<_, EngineSupersession>(&superseded_by)
                .bind(engine_id)
                .fetch_all(pool)
                .await?,
        })
    }

    /// Record that `to_engine_id` replaces `from_engine_id`. Self-supersession
    /// hits `ck_engine_supersessions_not_self`; a repeated pair hits
    /// `uq_engine_supersessions_from_to`.
    pub async fn create_supersession(
        pool: &PgPool,
        from_engine_id: DbId,
        to_engine_id: DbId,
        notes: Option<&str>,
        effective_date: Option<chrono::NaiveDate>,
    ) -> Result<EngineSupersession, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO engine_supersessions \
                 (from_engine_id, to_engine_id, notes, effective_date) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(from_engine_id)
        .bind(to_engine_id)
        .bind(notes)
        .bind(effective_date)
        .fetch_one(pool)
        .await?;

        let query = format!("{SUPERSESSION_SELECT} WHERE s.id = $1");
        sqlx::query_as::<_, EngineSupersession>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a supersession record that involves `engine_id` on either side.
    pub async fn delete_supersession(
        pool: &PgPool,
        engine_id: DbId,
        supersession_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM engine_supersessions \
             WHERE id = $1 AND (from_engine_id = $2 OR to_engine_id = $2)",
        )
        .bind(supersession_id)
        .bind(engine_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
