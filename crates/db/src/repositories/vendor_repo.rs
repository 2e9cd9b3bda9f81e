//! Repository for the `vendors` table.

use sqlx::PgPool;
use stockroom_core::listing::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use stockroom_core::types::DbId;

use crate::models::vendor::{CreateVendor, UpdateVendor, Vendor, VendorListParams};
use crate::repositories::ilike_pattern;

/// Column list for `vendors` queries.
const COLUMNS: &str = "\
    id, name, contact_name, email, phone, website, address, notes, \
    created_at, updated_at";

/// Provides CRUD operations for vendors.
pub struct VendorRepo;

impl VendorRepo {
    pub async fn create(pool: &PgPool, input: &CreateVendor) -> Result<Vendor, sqlx::Error> {
        let query = format!(
            "INSERT INTO vendors (name, contact_name, email, phone, website, address, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(&input.name)
            .bind(input.contact_name.as_deref())
            .bind(input.email.as_deref())
            .bind(input.phone.as_deref())
            .bind(input.website.as_deref())
            .bind(input.address.as_deref())
            .bind(input.notes.as_deref())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendors WHERE id = $1");
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List vendors by name, optionally filtered by a search term.
    pub async fn list(
        pool: &PgPool,
        params: &VendorListParams,
    ) -> Result<Vec<Vendor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendors \
             WHERE ($1::TEXT IS NULL \
                    OR name ILIKE $1 OR contact_name ILIKE $1 OR email ILIKE $1) \
             ORDER BY name, id \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(ilike_pattern(params.search.as_deref()))
            .bind(clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVendor,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!(
            "UPDATE vendors SET \
                 name = COALESCE($2, name), \
                 contact_name = COALESCE($3, contact_name), \
                 email = COALESCE($4, email), \
                 phone = COALESCE($5, phone), \
                 website = COALESCE($6, website), \
                 address = COALESCE($7, address), \
                 notes = COALESCE($8, notes) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.contact_name.as_deref())
            .bind(input.email.as_deref())
            .bind(input.phone.as_deref())
            .bind(input.website.as_deref())
            .bind(input.address.as_deref())
            .bind(input.notes.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a vendor. Its offers cascade and parts lose it as primary.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
