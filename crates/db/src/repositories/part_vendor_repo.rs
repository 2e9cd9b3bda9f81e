//! Repository for the `part_vendors` table and a part's primary vendor.

use sqlx::PgPool;
use stockroom_core::types::DbId;

use crate::models::part_vendor::{CreatePartVendor, PartVendorOffer, UpdatePartVendor};

const OFFER_SELECT: &str = "\
    SELECT pv.id, pv.part_id, pv.vendor_id, v.name AS vendor_name, pv.vendor_sku, \
           pv.cost, pv.stock_qty, pv.lead_time_days, pv.notes, \
           COALESCE(p.primary_vendor_id = pv.vendor_id, false) AS is_primary, \
           pv.created_at, pv.updated_at \
    FROM part_vendors pv \
    JOIN vendors v ON v.id = pv.vendor_id \
    JOIN parts p ON p.id = pv.part_id";

/// Provides operations on the vendors offering a part.
pub struct PartVendorRepo;

impl PartVendorRepo {
    /// Offers for a part, primary vendor first, then by cost.
    pub async fn list_for_part(
        pool: &PgPool,
        part_id: DbId,
    ) -> Result<Vec<PartVendorOffer>, sqlx::Error> {
        let query = format!(
            "{OFFER_SELECT} WHERE pv.part_id = $1 \
             ORDER BY is_primary DESC, pv.cost ASC NULLS LAST, v.name, pv.id"
        );
        sqlx::query_as::<_, PartVendorOffer>(&query)
            .bind(part_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        part_id: DbId,
        vendor_id: DbId,
    ) -> Result<Option<PartVendorOffer>, sqlx::Error> {
        let query = format!("{OFFER_SELECT} WHERE pv.part_id = $1 AND pv.vendor_id = $2");
        sqlx::query_as::<_, PartVendorOffer>(&query)
            .bind(part_id)
            .bind(vendor_id)
            .fetch_optional(pool)
            .await
    }

    /// Add a vendor offer. A second offer from the same vendor hits
    /// `uq_part_vendors_part_vendor`.
    pub async fn create(
        pool: &PgPool,
        part_id: DbId,
        input: &CreatePartVendor,
    ) -> Result<PartVendorOffer, sqlx::Error> {
        sqlx::query(
            "INSERT INTO part_vendors \
                 (part_id, vendor_id, vendor_sku, cost, stock_qty, lead_time_days, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(part_id)
        .bind(input.vendor_id)
        .bind(input.vendor_sku.as_deref())
        .bind(input.cost)
        .bind(input.stock_qty)
        .bind(input.lead_time_days)
        .bind(input.notes.as_deref())
        .execute(pool)
        .await?;

        Self::find(pool, part_id, input.vendor_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update(
        pool: &PgPool,
        part_id: DbId,
        vendor_id: DbId,
        input: &UpdatePartVendor,
    ) -> Result<Option<PartVendorOffer>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE part_vendors SET \
                 vendor_sku = COALESCE($3, vendor_sku), \
                 cost = COALESCE($4, cost), \
                 stock_qty = COALESCE($5, stock_qty), \
                 lead_time_days = COALESCE($6, lead_time_days), \
                 notes = COALESCE($7, notes) \
             WHERE part_id = $1 AND vendor_id = $2",
        )
        .bind(part_id)
        .bind(vendor_id)
        .bind(input.vendor_sku.as_deref())
        .bind(input.cost)
        .bind(input.stock_qty)
        .bind(input.lead_time_days)
        .bind(input.notes.as_deref())
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find(pool, part_id, vendor_id).await
    }

    /// Remove an offer. If it was the part's primary vendor, the part is
    /// left without one.
    pub async fn delete(
        pool: &PgPool,
        part_id: DbId,
        vendor_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query("DELETE FROM part_vendors WHERE part_id = $1 AND vendor_id = $2")
            .bind(part_id)
            .bind(vendor_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE parts SET primary_vendor_id = NULL \
             WHERE id = $1 AND primary_vendor_id = $2",
        )
        .bind(part_id)
        .bind(vendor_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark an existing offer's vendor as the part's primary vendor.
    ///
    /// Returns `false` if the part has no offer from that vendor.
    pub async fn set_primary(
        pool: &PgPool,
        part_id: DbId,
        vendor_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE parts SET primary_vendor_id = $2 \
             WHERE id = $1 \
               AND EXISTS (SELECT 1 FROM part_vendors WHERE part_id = $1 AND vendor_id = $2)",
        )
        .bind(part_id)
        .bind(vendor_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
